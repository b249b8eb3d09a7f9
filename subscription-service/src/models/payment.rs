//! Canonical payment and student shapes.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::status::{BadgeVariant, PaymentDisplayStatus};

/// A payment record after normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: Option<String>,
    pub student_id: Option<String>,
    pub batch_id: Option<String>,
    pub amount: Decimal,
    /// Backend status as received, before classification.
    pub raw_status: Option<String>,
    pub status: PaymentDisplayStatus,
    pub badge: BadgeVariant,
    pub due_date: Option<String>,
    pub paid_date: Option<String>,
    pub payment_method: Option<String>,
    pub months_paid: Decimal,
}

/// A student record after normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub payment_status: PaymentDisplayStatus,
    pub badge: BadgeVariant,
}

/// Count and amount for one display status.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusTotals {
    pub count: u64,
    pub amount: Decimal,
}

/// Per-status totals over a list of payments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentSummary {
    pub total: StatusTotals,
    pub paid: StatusTotals,
    pub pending: StatusTotals,
    pub overdue: StatusTotals,
    pub unknown: StatusTotals,
}

impl PaymentSummary {
    pub fn from_payments<'a>(payments: impl IntoIterator<Item = &'a Payment>) -> Self {
        let mut summary = PaymentSummary::default();
        for payment in payments {
            let bucket = match payment.status {
                PaymentDisplayStatus::Paid => &mut summary.paid,
                PaymentDisplayStatus::Pending => &mut summary.pending,
                PaymentDisplayStatus::Overdue => &mut summary.overdue,
                PaymentDisplayStatus::Unknown => &mut summary.unknown,
            };
            bucket.count += 1;
            bucket.amount = bucket.amount.saturating_add(payment.amount);
            summary.total.count += 1;
            summary.total.amount = summary.total.amount.saturating_add(payment.amount);
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::normalize_payment;
    use serde_json::json;

    #[test]
    fn summarizes_by_display_status() {
        let payments: Vec<Payment> = [
            json!({ "status": "paid", "amount": 1200 }),
            json!({ "payment_status": "due", "amount": 500 }),
            json!({ "status": "overdue", "amount": 300 }),
            json!({ "status": "pending", "amount": 100 }),
            json!({ "amount": 50 }),
        ]
        .iter()
        .map(normalize_payment)
        .collect();

        let summary = PaymentSummary::from_payments(&payments);
        assert_eq!(summary.total.count, 5);
        assert_eq!(summary.total.amount, Decimal::from(2150));
        assert_eq!(summary.overdue.count, 2);
        assert_eq!(summary.overdue.amount, Decimal::from(800));
        assert_eq!(summary.paid.amount, Decimal::from(1200));
        assert_eq!(summary.unknown.count, 1);
    }

    #[test]
    fn summary_saturates_on_huge_amounts() {
        let payments: Vec<Payment> = [
            json!({ "status": "paid", "amount": "79228162514264337593543950335" }),
            json!({ "status": "paid", "amount": "79228162514264337593543950335" }),
        ]
        .iter()
        .map(normalize_payment)
        .collect();

        let summary = PaymentSummary::from_payments(&payments);
        assert_eq!(summary.paid.count, 2);
        assert_eq!(summary.paid.amount, Decimal::MAX);
        assert_eq!(summary.total.amount, Decimal::MAX);
    }
}
