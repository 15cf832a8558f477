//! Subledger Platform
//!
//! Core domain for per-user recurring subscription tracking:
//! - Subscription records with inclusive active intervals
//! - Monthly cost aggregation with service-name filtering
//! - Storage behind an abstract capability trait (PostgreSQL + in-memory)
//!
//! ## Module Organization (Aggregate-based)
//!
//! The `subscription` aggregate contains:
//! - `entity` - Domain entities and calendar arithmetic
//! - `repository` - Data-access contract and the PostgreSQL store
//! - `memory` - In-memory store for backend substitution in tests
//! - `service` - Pass-through service boundary
//! - `api` - REST endpoints

pub mod shared;
pub mod subscription;

// Re-export common types from shared
pub use shared::error::{PlatformError, Result};

// Re-export main types for convenience
pub use subscription::entity::{month_bounds, NewSubscription, Subscription};
pub use subscription::memory::InMemorySubscriptionStore;
pub use subscription::repository::{PostgresSubscriptionStore, SubscriptionStore};
pub use subscription::service::SubscriptionService;
pub use subscription::api::{subscriptions_router, SubscriptionsState};
