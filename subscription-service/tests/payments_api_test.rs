mod common;

use common::TestApp;
use reqwest::StatusCode;
use serde_json::{json, Value};

fn sample_payments() -> Value {
    json!([
        { "id": "P001", "studentId": "S001", "amount": 1200, "status": "paid" },
        { "id": 2, "student_id": 7, "amount": 1700, "payment_status": "pending" },
        { "id": "P012", "amount": 1800, "status": "overdue", "dueDate": "2025-08-01" },
        { "id": 4, "amount": 600, "payment_status": "due", "due_date": "2025-09-01" },
        { "id": 5, "amount": 50 }
    ])
}

#[tokio::test]
async fn classify_normalizes_every_payment() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .post(app.url("/api/payments/classify"))
        .json(&json!({ "payments": sample_payments() }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["filter"], "all");

    let payments = body["payments"].as_array().expect("payments array");
    assert_eq!(payments.len(), 5);
    assert_eq!(payments[0]["status"], "paid");
    assert_eq!(payments[0]["badge"], "success");
    assert_eq!(payments[0]["student_id"], "S001");
    assert_eq!(payments[1]["badge"], "warning");
    assert_eq!(payments[2]["due_date"], "2025-08-01");
    assert_eq!(payments[3]["status"], "overdue");
    assert_eq!(payments[3]["raw_status"], "due");
    assert_eq!(payments[4]["status"], "unknown");
    assert_eq!(payments[4]["badge"], "outline");

    assert_eq!(body["summary"]["total"]["count"], 5);
    assert_eq!(body["summary"]["overdue"]["count"], 2);
    assert_eq!(body["summary"]["overdue"]["amount"], json!(2400.0));
}

#[tokio::test]
async fn classify_applies_filter_but_summarizes_everything() {
    let app = TestApp::spawn().await;

    let body: Value = app
        .client
        .post(app.url("/api/payments/classify"))
        .json(&json!({ "payments": sample_payments(), "filter": "overdue" }))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse JSON");

    let payments = body["payments"].as_array().expect("payments array");
    assert_eq!(payments.len(), 2);
    assert!(payments.iter().all(|p| p["status"] == "overdue"));
    assert_eq!(body["summary"]["total"]["count"], 5);
}

#[tokio::test]
async fn classify_rejects_oversized_batches() {
    let app = TestApp::spawn().await;
    let payments: Vec<Value> = (0..1001)
        .map(|i| json!({ "id": i, "status": "paid", "amount": 1 }))
        .collect();

    let response = app
        .client
        .post(app.url("/api/payments/classify"))
        .json(&json!({ "payments": payments }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
