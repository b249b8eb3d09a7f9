//! Payment status classification shared by every payment listing.

use serde::{Deserialize, Serialize};

/// Canonical display state of a payment record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentDisplayStatus {
    Paid,
    Pending,
    Overdue,
    Unknown,
}

/// Badge styling for a display status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeVariant {
    Success,
    Warning,
    Destructive,
    Outline,
}

impl PaymentDisplayStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentDisplayStatus::Paid => "paid",
            PaymentDisplayStatus::Pending => "pending",
            PaymentDisplayStatus::Overdue => "overdue",
            PaymentDisplayStatus::Unknown => "unknown",
        }
    }

    pub fn badge(&self) -> BadgeVariant {
        match self {
            PaymentDisplayStatus::Paid => BadgeVariant::Success,
            PaymentDisplayStatus::Pending => BadgeVariant::Warning,
            PaymentDisplayStatus::Overdue => BadgeVariant::Destructive,
            PaymentDisplayStatus::Unknown => BadgeVariant::Outline,
        }
    }
}

impl std::fmt::Display for PaymentDisplayStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a raw backend status (`payment_status` or `status`).
///
/// Surrounding whitespace and ASCII case are ignored.
pub fn classify_payment_status(raw: Option<&str>) -> PaymentDisplayStatus {
    let Some(raw) = raw else {
        return PaymentDisplayStatus::Unknown;
    };

    match raw.trim().to_ascii_lowercase().as_str() {
        "paid" => PaymentDisplayStatus::Paid,
        "pending" => PaymentDisplayStatus::Pending,
        "due" | "overdue" => PaymentDisplayStatus::Overdue,
        _ => PaymentDisplayStatus::Unknown,
    }
}

/// List filter offered by payment tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentFilter {
    #[default]
    All,
    Paid,
    Pending,
    Overdue,
}

impl PaymentFilter {
    pub fn matches(&self, status: PaymentDisplayStatus) -> bool {
        match self {
            PaymentFilter::All => true,
            PaymentFilter::Paid => status == PaymentDisplayStatus::Paid,
            PaymentFilter::Pending => status == PaymentDisplayStatus::Pending,
            PaymentFilter::Overdue => status == PaymentDisplayStatus::Overdue,
        }
    }
}
