use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use subscription_service::config::Config;
use subscription_service::services::{InMemoryStore, SubscriptionService};
use subscription_service::startup::{router, AppState};
use tower::util::ServiceExt;

fn test_state() -> AppState {
    let config = Config::for_tests();
    let subscriptions = SubscriptionService::new(
        Arc::new(InMemoryStore::new()),
        Duration::from_secs(30),
        config.features.beta_testing_enabled,
    );
    AppState {
        config,
        subscriptions,
    }
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    serde_json::from_slice(&bytes).expect("Failed to parse JSON")
}

#[tokio::test]
async fn preview_minimum_enrollment_scenario() {
    let app = router(test_state());

    let request = Request::builder()
        .method("POST")
        .uri("/api/subscription/preview")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({ "batch_fees": 1000, "current_student_count": 25 }).to_string(),
        ))
        .expect("Failed to build request");

    let response = app.oneshot(request).await.expect("Request failed");
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["calculation"]["effective_student_count"], 25);
    assert_eq!(body["calculation"]["monthly_fee"], json!(1750.0));
    assert_eq!(body["calculation"]["minimum_met"], true);
}

#[tokio::test]
async fn preview_explicit_zero_limit_still_billed_at_floor() {
    let app = router(test_state());

    let request = Request::builder()
        .method("POST")
        .uri("/api/subscription/preview")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({ "fees": 400, "student_limit": 0, "approved_student_count": 3 }).to_string(),
        ))
        .expect("Failed to build request");

    let body = json_body(app.oneshot(request).await.expect("Request failed")).await;
    assert_eq!(body["profile"]["max_student_limit"], 0);
    assert_eq!(body["calculation"]["effective_student_count"], 20);
    assert_eq!(body["calculation"]["monthly_fee"], json!(700.0));
}

#[tokio::test]
async fn unknown_route_is_404() {
    let app = router(test_state());

    let request = Request::builder()
        .uri("/api/does-not-exist")
        .body(Body::empty())
        .expect("Failed to build request");

    let response = app.oneshot(request).await.expect("Request failed");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_identity_header_is_unauthorized() {
    let app = router(test_state());

    let request = Request::builder()
        .uri("/api/teacher/subscription/status")
        .header("X-User-ID", "not-a-number")
        .header("X-User-Type", "teacher")
        .body(Body::empty())
        .expect("Failed to build request");

    let response = app.oneshot(request).await.expect("Request failed");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

const DECIMAL_MAX: &str = "79228162514264337593543950335";

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("Failed to build request")
}

#[tokio::test]
async fn preview_saturates_huge_fee_and_limit() {
    let app = router(test_state());
    let request = post_json(
        "/api/subscription/preview",
        json!({ "batch_fees": DECIMAL_MAX, "max_student_limit": 1_000_000 }),
    );

    let response = app.oneshot(request).await.expect("Request failed");
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["calculation"]["effective_student_count"], 1_000_000);
    assert!(body["calculation"]["monthly_fee"].as_f64().unwrap_or_default() > 7.0e28);
}

#[tokio::test]
async fn classify_survives_huge_amount_with_tiny_fee() {
    let app = router(test_state());
    let request = post_json(
        "/api/payments/classify",
        json!({ "payments": [{ "amount": DECIMAL_MAX, "batch_fees": "0.001", "status": "paid" }] }),
    );

    let response = app.oneshot(request).await.expect("Request failed");
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["payments"][0]["status"], "paid");
}

#[tokio::test]
async fn classify_summary_saturates_on_huge_amounts() {
    let app = router(test_state());
    let request = post_json(
        "/api/payments/classify",
        json!({ "payments": [
            { "amount": DECIMAL_MAX, "status": "paid" },
            { "amount": DECIMAL_MAX, "status": "paid" }
        ] }),
    );

    let response = app.oneshot(request).await.expect("Request failed");
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["summary"]["paid"]["count"], 2);
}

#[tokio::test]
async fn reconcile_flags_negative_server_fee() {
    let app = router(test_state());
    let request = post_json(
        "/api/subscription/reconcile",
        json!({
            "server": { "monthly_fee": -100 },
            "batch": { "batch_fees": 100, "current_student_count": 25 }
        }),
    );

    let body = json_body(app.oneshot(request).await.expect("Request failed")).await;
    assert_eq!(body["reconciled"]["fee_not_calculated"], true);
    assert_eq!(body["reconciled"]["note"], "(Fee not calculated)");
}

#[tokio::test]
async fn health_reports_configured_service_name() {
    let app = router(test_state());
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .expect("Failed to build request");

    let body = json_body(app.oneshot(request).await.expect("Request failed")).await;
    assert_eq!(body["service"], "subscription-service-test");
}
