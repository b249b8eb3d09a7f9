//! Teacher subscription model.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Subscription status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    Cancelled,
    Expired,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Cancelled => "cancelled",
            SubscriptionStatus::Expired => "expired",
        }
    }
}

/// Persisted subscription of a teacher for one batch.
///
/// `monthly_fee` is the last recalculated value; readers recompute rather than
/// trust it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeacherSubscription {
    #[serde(rename = "_id")]
    pub id: i64,
    pub batch_id: i64,
    pub status: SubscriptionStatus,
    pub monthly_fee: Decimal,
    pub student_count: u32,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub next_billing_date: Option<NaiveDate>,
}

impl TeacherSubscription {
    /// Whether the next billing date has been reached.
    pub fn is_due(&self, today: NaiveDate) -> bool {
        self.next_billing_date
            .map(|next| next <= today)
            .unwrap_or(false)
    }
}
