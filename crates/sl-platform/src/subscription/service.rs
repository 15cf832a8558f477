//! Subscription Service
//!
//! Pass-through boundary between the REST adapter and the store. It adds no
//! business logic and no error kinds of its own; it exists so callers stay
//! decoupled from the storage implementation and so cross-cutting policy
//! (caching, metrics, extra validation) has a seam to land on later.

use std::sync::Arc;

use uuid::Uuid;

use crate::shared::error::Result;
use crate::subscription::entity::{NewSubscription, Subscription};
use crate::subscription::repository::SubscriptionStore;

pub struct SubscriptionService {
    store: Arc<dyn SubscriptionStore>,
}

impl SubscriptionService {
    pub fn new(store: Arc<dyn SubscriptionStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, sub: &NewSubscription) -> Result<Subscription> {
        self.store.create(sub).await
    }

    pub async fn get(&self, id: i64) -> Result<Option<Subscription>> {
        self.store.find_by_id(id).await
    }

    pub async fn list(&self, user_id: Uuid) -> Result<Vec<Subscription>> {
        self.store.list_by_user(user_id).await
    }

    pub async fn update(&self, id: i64, sub: &NewSubscription) -> Result<Subscription> {
        self.store.update(id, sub).await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        self.store.delete(id).await
    }

    pub async fn total_cost(
        &self,
        user_id: Uuid,
        year: i32,
        month: u32,
        service_filter: &str,
    ) -> Result<i64> {
        self.store.total_cost(user_id, year, month, service_filter).await
    }
}
