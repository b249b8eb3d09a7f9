use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::calculator::{BatchFeeProfile, SubscriptionCalculation};
use crate::models::{Payment, PaymentSummary};
use crate::reconcile::ReconciledSubscription;
use crate::status::PaymentFilter;

#[derive(Serialize, Deserialize, Debug)]
pub struct PreviewResponse {
    pub profile: BatchFeeProfile,
    pub calculation: SubscriptionCalculation,
    pub fee_not_calculated: bool,
}

#[derive(Deserialize, Debug)]
pub struct ReconcileRequest {
    /// Subscription payload as returned by the backend, if any.
    #[serde(default)]
    pub server: Option<Value>,
    /// Batch payload the local calculation is derived from.
    pub batch: Value,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ReconcileResponse {
    pub local: SubscriptionCalculation,
    pub reconciled: ReconciledSubscription,
}

#[derive(Deserialize, Validate, Debug)]
pub struct ClassifyPaymentsRequest {
    /// At most 1000 payments per request.
    #[validate(length(max = 1000))]
    pub payments: Vec<Value>,
    #[serde(default)]
    pub filter: PaymentFilter,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ClassifyPaymentsResponse {
    pub filter: PaymentFilter,
    /// Payments matching the filter.
    pub payments: Vec<Payment>,
    /// Totals over every submitted payment, regardless of filter.
    pub summary: PaymentSummary,
}
