//! Subscription Store
//!
//! Data-access contract for subscription records plus the PostgreSQL
//! implementation. Mutations use the affected-row count to distinguish
//! "record existed and was changed" from "no such record", so a stale id
//! (or a delete racing an update) surfaces as `NotFound` instead of a
//! silent no-op.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::shared::error::{PlatformError, Result};
use crate::subscription::entity::{month_bounds, NewSubscription, Subscription};

/// Abstract capability interface over subscription persistence.
///
/// Implementations hold no in-process mutable state beyond the storage
/// handle and are safe to call concurrently; write serialization is the
/// storage engine's job.
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// Insert a new record and return it with its generated id.
    async fn create(&self, sub: &NewSubscription) -> Result<Subscription>;

    /// Fetch a record by id.
    ///
    /// `Ok(None)` is the one and only no-match signal; an `Err` always
    /// means the store itself failed.
    async fn find_by_id(&self, id: i64) -> Result<Option<Subscription>>;

    /// All records for a user, ascending by id. Empty vec when the user
    /// has none.
    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Subscription>>;

    /// Replace all mutable fields of the record identified by `id`.
    ///
    /// Returns the updated record, or `NotFound` when no row was affected.
    async fn update(&self, id: i64, sub: &NewSubscription) -> Result<Subscription>;

    /// Remove the record. `NotFound` when no row was affected.
    async fn delete(&self, id: i64) -> Result<()>;

    /// Sum of `price` over the user's subscriptions whose active interval
    /// overlaps the calendar month `(year, month)`, optionally restricted
    /// to service names containing `service_filter` (case-insensitive;
    /// empty = no restriction). `0` when nothing matches.
    async fn total_cost(
        &self,
        user_id: Uuid,
        year: i32,
        month: u32,
        service_filter: &str,
    ) -> Result<i64>;
}

/// PostgreSQL implementation of [`SubscriptionStore`].
pub struct PostgresSubscriptionStore {
    pool: PgPool,
}

impl PostgresSubscriptionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get the pool reference
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Initialize schema (create table and index if not exists)
    pub async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS subscriptions (
                id BIGSERIAL PRIMARY KEY,
                service_name TEXT NOT NULL,
                price INTEGER NOT NULL,
                user_id UUID NOT NULL,
                start_date DATE NOT NULL,
                end_date DATE
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_subscriptions_user_id ON subscriptions(user_id)",
        )
        .execute(&self.pool)
        .await?;

        info!("Initialized subscriptions schema");
        Ok(())
    }
}

#[async_trait]
impl SubscriptionStore for PostgresSubscriptionStore {
    async fn create(&self, sub: &NewSubscription) -> Result<Subscription> {
        sub.validate()?;

        let created = sqlx::query_as::<_, Subscription>(
            "INSERT INTO subscriptions (service_name, price, user_id, start_date, end_date) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, service_name, price, user_id, start_date, end_date",
        )
        .bind(&sub.service_name)
        .bind(sub.price)
        .bind(sub.user_id)
        .bind(sub.start_date)
        .bind(sub.end_date)
        .fetch_one(&self.pool)
        .await?;

        debug!(id = created.id, user_id = %created.user_id, "Inserted subscription");

        Ok(created)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Subscription>> {
        let found = sqlx::query_as::<_, Subscription>(
            "SELECT id, service_name, price, user_id, start_date, end_date \
             FROM subscriptions WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(found)
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Subscription>> {
        let subs = sqlx::query_as::<_, Subscription>(
            "SELECT id, service_name, price, user_id, start_date, end_date \
             FROM subscriptions WHERE user_id = $1 ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(subs)
    }

    async fn update(&self, id: i64, sub: &NewSubscription) -> Result<Subscription> {
        sub.validate()?;

        let result = sqlx::query(
            "UPDATE subscriptions \
             SET service_name = $1, price = $2, user_id = $3, start_date = $4, end_date = $5 \
             WHERE id = $6",
        )
        .bind(&sub.service_name)
        .bind(sub.price)
        .bind(sub.user_id)
        .bind(sub.start_date)
        .bind(sub.end_date)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(PlatformError::not_found("Subscription", id));
        }

        debug!(id, "Updated subscription");

        Ok(sub.clone().into_record(id))
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM subscriptions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(PlatformError::not_found("Subscription", id));
        }

        debug!(id, "Deleted subscription");

        Ok(())
    }

    async fn total_cost(
        &self,
        user_id: Uuid,
        year: i32,
        month: u32,
        service_filter: &str,
    ) -> Result<i64> {
        // Month bounds are computed here rather than in SQL so the exact
        // same calendar arithmetic backs every store implementation.
        let (month_start, month_end) = month_bounds(year, month)
            .ok_or_else(|| PlatformError::validation(format!("month out of range: {month}")))?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(price), 0) FROM subscriptions \
             WHERE user_id = $1 \
               AND ($2 = '' OR service_name ILIKE '%' || $2 || '%') \
               AND start_date <= $3 \
               AND (end_date IS NULL OR end_date >= $4)",
        )
        .bind(user_id)
        .bind(service_filter)
        .bind(month_end)
        .bind(month_start)
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }
}
