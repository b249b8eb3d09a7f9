//! Test helper module for subscription-service integration tests.

#![allow(dead_code)]

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::sync::Arc;
use subscription_service::config::Config;
use subscription_service::models::{BatchRecord, SubscriptionStatus, TeacherSubscription};
use subscription_service::services::{init_metrics, InMemoryStore};
use subscription_service::startup::Application;

pub const TEST_TEACHER_ID: i64 = 10;
pub const OTHER_TEACHER_ID: i64 = 20;
pub const TEST_STUDENT_ID: i64 = 500;

/// Test application wrapper for integration tests.
pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub store: InMemoryStore,
    pub client: reqwest::Client,
}

impl TestApp {
    /// Spawn a new test application on a random port with an empty store.
    pub async fn spawn() -> Self {
        Self::spawn_with(Config::for_tests()).await
    }

    pub async fn spawn_with(config: Config) -> Self {
        init_metrics();

        let store = InMemoryStore::new();
        let app = Application::build_with_store(config, Arc::new(store.clone()))
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            store,
            client,
        }
    }

    pub fn seed_batch(
        &self,
        id: i64,
        teacher_id: i64,
        fees: Option<i64>,
        student_limit: Option<i64>,
        approved_students: u32,
    ) {
        self.store.upsert_batch(BatchRecord {
            id,
            teacher_id,
            name: format!("Batch {}", id),
            fees: fees.map(Decimal::from),
            student_limit,
        });
        self.store.enroll_approved(id, id * 1000, approved_students);
    }

    pub fn seed_active_subscription(
        &self,
        id: i64,
        batch_id: i64,
        next_billing_date: Option<NaiveDate>,
    ) {
        self.store.upsert_subscription(TeacherSubscription {
            id,
            batch_id,
            status: SubscriptionStatus::Active,
            monthly_fee: Decimal::ZERO,
            student_count: 0,
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).expect("valid date"),
            end_date: None,
            next_billing_date,
        });
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub fn get_as(&self, path: &str, user_id: i64, user_type: &str) -> reqwest::RequestBuilder {
        self.client
            .get(self.url(path))
            .header("X-User-ID", user_id.to_string())
            .header("X-User-Type", user_type)
    }

    pub fn post_as(&self, path: &str, user_id: i64, user_type: &str) -> reqwest::RequestBuilder {
        self.client
            .post(self.url(path))
            .header("X-User-ID", user_id.to_string())
            .header("X-User-Type", user_type)
    }
}
