//! Subscription Entity
//!
//! A subscription is active over the inclusive interval
//! `[start_date, end_date]`; an absent `end_date` means the subscription has
//! no end. All cost aggregation is defined in terms of whether that interval
//! overlaps a calendar month.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::shared::error::{PlatformError, Result};

/// A stored subscription record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    /// Surrogate key assigned by the store on creation; immutable thereafter.
    pub id: i64,

    /// Free-text service name, not a catalog reference.
    pub service_name: String,

    /// Cost in minor currency units.
    pub price: i32,

    /// Owning user. Not checked against any user table.
    pub user_id: Uuid,

    /// First day of the active interval.
    pub start_date: NaiveDate,

    /// Last day of the active interval; `None` = still active, no end.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

/// A subscription draft: every field except the store-assigned id.
///
/// Input to both `create` and `update` (an update replaces all mutable
/// fields of the targeted record).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewSubscription {
    pub service_name: String,
    pub price: i32,
    pub user_id: Uuid,
    pub start_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

impl NewSubscription {
    /// Write-time validation applied by every store implementation.
    ///
    /// `end_date >= start_date` is enforced here; an interval that ends
    /// before it starts is never persisted.
    pub fn validate(&self) -> Result<()> {
        if self.service_name.trim().is_empty() {
            return Err(PlatformError::validation("serviceName must not be empty"));
        }
        if self.price < 0 {
            return Err(PlatformError::validation("price must not be negative"));
        }
        if let Some(end) = self.end_date {
            if end < self.start_date {
                return Err(PlatformError::validation(format!(
                    "endDate {} precedes startDate {}",
                    end, self.start_date
                )));
            }
        }
        Ok(())
    }

    /// Attach a store-assigned id, producing the stored record.
    pub fn into_record(self, id: i64) -> Subscription {
        Subscription {
            id,
            service_name: self.service_name,
            price: self.price,
            user_id: self.user_id,
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }
}

impl Subscription {
    /// Inclusive interval-overlap test against a calendar month given as
    /// its first and last day.
    pub fn active_during(&self, month_start: NaiveDate, month_end: NaiveDate) -> bool {
        self.start_date <= month_end && self.end_date.is_none_or(|end| end >= month_start)
    }

    /// Case-insensitive substring match on the service name. An empty
    /// filter matches everything.
    pub fn matches_service(&self, filter: &str) -> bool {
        filter.is_empty()
            || self
                .service_name
                .to_lowercase()
                .contains(&filter.to_lowercase())
    }
}

/// First and last calendar day of `(year, month)`.
///
/// Calendar-correct: variable month lengths and leap years are honored.
/// Returns `None` when `month` is outside 1-12 or the year is unrepresentable.
pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((first, next_first.pred_opt()?))
}
