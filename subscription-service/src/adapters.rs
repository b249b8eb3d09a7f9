//! Normalization of backend payloads into canonical shapes.
//!
//! Sibling endpoints disagree on field names (`payment_status` vs `status`,
//! `dueDate` vs `due_date`, `fees` vs `batch_fees`). Each adapter resolves
//! those aliases once so the rest of the crate sees a single shape.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;

use crate::calculator::BatchFeeProfile;
use crate::models::{Batch, Payment, Student};
use crate::status::classify_payment_status;

/// Per-student fee assumed when deriving months paid without a batch fee.
const FALLBACK_MONTHLY_FEE: i64 = 500;

/// Normalize a payment record.
pub fn normalize_payment(value: &Value) -> Payment {
    let amount = first(value, &["amount"])
        .and_then(as_decimal)
        .unwrap_or_default()
        .max(Decimal::ZERO);
    let raw_status = first_text(value, &["payment_status", "status"]);
    let status = classify_payment_status(raw_status.as_deref());

    Payment {
        id: first_text(value, &["id", "payment_id"]),
        student_id: first_text(value, &["student_id", "studentId"]),
        batch_id: first_text(value, &["batch_id", "batchId"]),
        amount,
        raw_status,
        status,
        badge: status.badge(),
        due_date: first_text(value, &["due_date", "dueDate"]),
        paid_date: first_text(value, &["paid_date", "paidDate"]),
        payment_method: first_text(value, &["payment_method", "paymentMethod"]),
        months_paid: months_paid(value, amount),
    }
}

/// Normalize a batch record, including its fee profile.
pub fn normalize_batch(value: &Value) -> Batch {
    let batch_fees = first(value, &["batch_fees", "fees"])
        .and_then(as_decimal)
        .unwrap_or_default();
    // A present but unreadable limit counts as a configured limit of zero.
    let max_student_limit =
        first(value, &["max_student_limit", "student_limit"]).map(|v| as_count(v).unwrap_or(0));
    let current_student_count = first(
        value,
        &[
            "current_student_count",
            "approved_student_count",
            "student_count",
        ],
    )
    .and_then(as_count)
    .unwrap_or(0);

    Batch {
        id: first_text(value, &["id", "batch_id"]),
        name: first_text(value, &["name", "batch_name"]),
        teacher_id: first_text(value, &["teacher_id", "teacherId"]),
        fee_profile: BatchFeeProfile::new(batch_fees, max_student_limit, current_student_count),
    }
}

/// Normalize a student record.
pub fn normalize_student(value: &Value) -> Student {
    let payment_status = classify_payment_status(
        first_text(value, &["payment_status", "paymentStatus", "status"]).as_deref(),
    );

    Student {
        id: first_text(value, &["id", "student_id", "studentId"]),
        name: first_text(value, &["name", "full_name", "fullName"]),
        email: first_text(value, &["email"]),
        payment_status,
        badge: payment_status.badge(),
    }
}

fn months_paid(value: &Value, amount: Decimal) -> Decimal {
    if let Some(months) = first(value, &["months_paid", "monthsPaid"])
        .and_then(as_decimal)
        .filter(|m| *m > Decimal::ZERO)
    {
        return months;
    }

    let monthly_fee = first(value, &["batch_fees"])
        .and_then(as_decimal)
        .filter(|f| *f > Decimal::ZERO)
        .unwrap_or_else(|| Decimal::from(FALLBACK_MONTHLY_FEE));

    let derived = amount
        .checked_div(monthly_fee)
        .unwrap_or(Decimal::MAX)
        .round_dp(2);
    if derived > Decimal::ZERO {
        derived
    } else {
        Decimal::ONE
    }
}

/// First alias that is present and not null.
fn first<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| value.get(*key))
        .find(|v| !v.is_null())
}

/// First alias that yields non-empty text.
fn first_text(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| value.get(*key))
        .find_map(as_text)
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Read a number or numeric string.
pub(crate) fn as_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => {
            let text = n.to_string();
            Decimal::from_str(&text)
                .ok()
                .or_else(|| Decimal::from_scientific(&text).ok())
                .or_else(|| n.as_f64().and_then(Decimal::from_f64))
        }
        Value::String(s) => {
            let trimmed = s.trim();
            Decimal::from_str(trimmed)
                .ok()
                .or_else(|| Decimal::from_scientific(trimmed).ok())
        }
        _ => None,
    }
}

/// Read a whole count; fractions are truncated and negatives become zero.
pub(crate) fn as_count(value: &Value) -> Option<i64> {
    as_decimal(value).map(|d| d.trunc().max(Decimal::ZERO).to_i64().unwrap_or(i64::MAX))
}
