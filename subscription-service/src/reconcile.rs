//! Reconciliation of server-provided subscription figures with a local
//! recomputation.
//!
//! Server values are displayed when present. The local formula only fills
//! fields the payload omits. A fee that resolves to zero or below is flagged
//! because the per-student floor makes such a fee impossible.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::adapters::{as_count, as_decimal};
use crate::calculator::SubscriptionCalculation;

/// Note shown next to a fee that resolved to zero.
pub const FEE_NOT_CALCULATED: &str = "(Fee not calculated)";

/// Subscription figures as returned by the backend. Any field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerSubscriptionSnapshot {
    pub monthly_fee: Option<Decimal>,
    pub commission_per_student: Option<Decimal>,
    pub effective_student_count: Option<u32>,
    pub minimum_met: Option<bool>,
}

impl ServerSubscriptionSnapshot {
    /// Read a snapshot from a raw payload.
    ///
    /// Accepts the flat fields as well as the nested
    /// `subscription_calculation` object (`total_subscription`,
    /// `student_count`) older responses carry.
    pub fn from_value(value: &Value) -> Self {
        Self {
            monthly_fee: lookup(value, "monthly_fee", "total_subscription").and_then(as_decimal),
            commission_per_student: lookup(
                value,
                "commission_per_student",
                "commission_per_student",
            )
            .and_then(as_decimal),
            effective_student_count: lookup(value, "effective_student_count", "student_count")
                .and_then(as_count)
                .map(|c| u32::try_from(c).unwrap_or(u32::MAX)),
            minimum_met: lookup(value, "minimum_met", "minimum_met").and_then(Value::as_bool),
        }
    }

    fn is_empty(&self) -> bool {
        self.monthly_fee.is_none()
            && self.commission_per_student.is_none()
            && self.effective_student_count.is_none()
            && self.minimum_met.is_none()
    }
}

fn lookup<'a>(value: &'a Value, flat: &str, nested_key: &str) -> Option<&'a Value> {
    value.get(flat).filter(|v| !v.is_null()).or_else(|| {
        value
            .get("subscription_calculation")
            .and_then(|n| n.get(nested_key))
            .filter(|v| !v.is_null())
    })
}

/// Where the reconciled figures came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculationSource {
    Server,
    Local,
    Mixed,
}

/// Figures to display after reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciledSubscription {
    pub monthly_fee: Decimal,
    pub commission_per_student: Decimal,
    pub effective_student_count: u32,
    pub minimum_met: bool,
    pub source: CalculationSource,
    /// Server figures disagree with the local recomputation.
    pub diverges: bool,
    pub fee_not_calculated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Merge server figures over the local calculation.
pub fn reconcile(
    server: Option<&ServerSubscriptionSnapshot>,
    local: &SubscriptionCalculation,
) -> ReconciledSubscription {
    let empty = ServerSubscriptionSnapshot::default();
    let server = server.unwrap_or(&empty);

    let source = if server.is_empty() {
        CalculationSource::Local
    } else if server.monthly_fee.is_some()
        && server.commission_per_student.is_some()
        && server.effective_student_count.is_some()
        && server.minimum_met.is_some()
    {
        CalculationSource::Server
    } else {
        CalculationSource::Mixed
    };

    let diverges = server
        .monthly_fee
        .is_some_and(|fee| fee != local.monthly_fee)
        || server
            .commission_per_student
            .is_some_and(|c| c != local.commission_per_student)
        || server
            .effective_student_count
            .is_some_and(|c| c != local.effective_student_count)
        || server.minimum_met.is_some_and(|m| m != local.minimum_met);

    let monthly_fee = server.monthly_fee.unwrap_or(local.monthly_fee);
    let fee_not_calculated = monthly_fee <= Decimal::ZERO;

    ReconciledSubscription {
        monthly_fee,
        commission_per_student: server
            .commission_per_student
            .unwrap_or(local.commission_per_student),
        effective_student_count: server
            .effective_student_count
            .unwrap_or(local.effective_student_count),
        minimum_met: server.minimum_met.unwrap_or(local.minimum_met),
        source,
        diverges,
        fee_not_calculated,
        note: fee_not_calculated.then(|| FEE_NOT_CALCULATED.to_string()),
    }
}
