//! In-Memory Subscription Store
//!
//! Backend substitute for tests. Implements the same contract as the
//! PostgreSQL store, including write-time validation, affected-row
//! semantics on mutations, and the month-overlap aggregation.

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::shared::error::{PlatformError, Result};
use crate::subscription::entity::{month_bounds, NewSubscription, Subscription};
use crate::subscription::repository::SubscriptionStore;

pub struct InMemorySubscriptionStore {
    records: RwLock<Vec<Subscription>>,
    next_id: AtomicI64,
}

impl InMemorySubscriptionStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl Default for InMemorySubscriptionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SubscriptionStore for InMemorySubscriptionStore {
    async fn create(&self, sub: &NewSubscription) -> Result<Subscription> {
        sub.validate()?;

        let record = sub
            .clone()
            .into_record(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.records.write().push(record.clone());

        Ok(record)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Subscription>> {
        Ok(self.records.read().iter().find(|r| r.id == id).cloned())
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Subscription>> {
        let mut subs: Vec<Subscription> = self
            .records
            .read()
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        subs.sort_by_key(|r| r.id);
        Ok(subs)
    }

    async fn update(&self, id: i64, sub: &NewSubscription) -> Result<Subscription> {
        sub.validate()?;

        let mut records = self.records.write();
        let record = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| PlatformError::not_found("Subscription", id))?;

        *record = sub.clone().into_record(id);
        Ok(record.clone())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let mut records = self.records.write();
        let position = records
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| PlatformError::not_found("Subscription", id))?;

        records.remove(position);
        Ok(())
    }

    async fn total_cost(
        &self,
        user_id: Uuid,
        year: i32,
        month: u32,
        service_filter: &str,
    ) -> Result<i64> {
        let (month_start, month_end) = month_bounds(year, month)
            .ok_or_else(|| PlatformError::validation(format!("month out of range: {month}")))?;

        let total = self
            .records
            .read()
            .iter()
            .filter(|r| r.user_id == user_id)
            .filter(|r| r.matches_service(service_filter))
            .filter(|r| r.active_during(month_start, month_end))
            .map(|r| i64::from(r.price))
            .sum();

        Ok(total)
    }
}
