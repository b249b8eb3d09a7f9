//! Payment classification endpoint.

use axum::Json;
use validator::Validate;

use crate::adapters::normalize_payment;
use crate::dtos::{ClassifyPaymentsRequest, ClassifyPaymentsResponse};
use crate::error::AppError;
use crate::models::{Payment, PaymentSummary};

/// `POST /api/payments/classify`
pub async fn classify(
    Json(request): Json<ClassifyPaymentsRequest>,
) -> Result<Json<ClassifyPaymentsResponse>, AppError> {
    request.validate()?;

    let normalized: Vec<Payment> = request.payments.iter().map(normalize_payment).collect();
    let summary = PaymentSummary::from_payments(&normalized);
    let payments = normalized
        .into_iter()
        .filter(|p| request.filter.matches(p.status))
        .collect();

    Ok(Json(ClassifyPaymentsResponse {
        filter: request.filter,
        payments,
        summary,
    }))
}
