//! Subscription fee endpoints.

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;

use crate::adapters::normalize_batch;
use crate::dtos::{PreviewResponse, ReconcileRequest, ReconcileResponse};
use crate::error::AppError;
use crate::middleware::CallerContext;
use crate::reconcile::{reconcile, ServerSubscriptionSnapshot};
use crate::services::metrics::record_zero_fee;
use crate::services::{
    BatchSubscriptionView, RecalculationOutcome, TeacherSubscriptionMetrics,
    TeacherSubscriptionStatus,
};
use crate::startup::AppState;

/// `GET /api/subscription/calculate/:batch_id`
pub async fn calculate(
    State(state): State<AppState>,
    caller: CallerContext,
    Path(batch_id): Path<i64>,
) -> Result<Json<BatchSubscriptionView>, AppError> {
    let view = state
        .subscriptions
        .calculate_for_batch(&caller, batch_id)
        .await?;
    Ok(Json(view))
}

/// `POST /api/teacher/subscription/recalculate/:batch_id`
pub async fn recalculate(
    State(state): State<AppState>,
    caller: CallerContext,
    Path(batch_id): Path<i64>,
) -> Result<Json<RecalculationOutcome>, AppError> {
    let outcome = state
        .subscriptions
        .recalculate_for_batch(&caller, batch_id)
        .await?;
    Ok(Json(outcome))
}

/// `GET /api/teacher/subscription/status`
pub async fn status(
    State(state): State<AppState>,
    caller: CallerContext,
) -> Result<Json<TeacherSubscriptionStatus>, AppError> {
    let today = chrono::Utc::now().date_naive();
    let status = state.subscriptions.teacher_status(&caller, today).await?;
    Ok(Json(status))
}

/// `GET /api/teacher/subscription/metrics`
pub async fn metrics(
    State(state): State<AppState>,
    caller: CallerContext,
) -> Result<Json<TeacherSubscriptionMetrics>, AppError> {
    let metrics = state.subscriptions.teacher_metrics(&caller).await?;
    Ok(Json(metrics))
}

/// `POST /api/subscription/preview`
///
/// Computes a fee from a raw batch payload without touching the store.
pub async fn preview(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<PreviewResponse>, AppError> {
    if !body.is_object() {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "Expected a JSON object with batch fields"
        )));
    }

    let profile = normalize_batch(&body).fee_profile;
    let calculation = state.subscriptions.policy().compute(&profile);

    Ok(Json(PreviewResponse {
        profile,
        fee_not_calculated: calculation.monthly_fee.is_zero(),
        calculation,
    }))
}

/// `POST /api/subscription/reconcile`
pub async fn reconcile_view(
    State(state): State<AppState>,
    Json(request): Json<ReconcileRequest>,
) -> Result<Json<ReconcileResponse>, AppError> {
    let profile = normalize_batch(&request.batch).fee_profile;
    let local = state.subscriptions.policy().compute(&profile);
    let server = request
        .server
        .as_ref()
        .filter(|v| !v.is_null())
        .map(ServerSubscriptionSnapshot::from_value);

    let reconciled = reconcile(server.as_ref(), &local);

    if reconciled.fee_not_calculated {
        record_zero_fee();
        tracing::warn!("Reconciled subscription fee resolved to zero");
    }
    if reconciled.diverges {
        tracing::info!(
            server_fee = %reconciled.monthly_fee,
            local_fee = %local.monthly_fee,
            "Server subscription figures differ from local calculation"
        );
    }

    Ok(Json(ReconcileResponse { local, reconciled }))
}
