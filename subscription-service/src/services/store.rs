//! Batch and subscription data source.

use anyhow::Result;
use async_trait::async_trait;
use dashmap::DashMap;
use rust_decimal::Decimal;
use std::sync::Arc;

use crate::models::{
    BatchRecord, EnrollmentRecord, EnrollmentStatus, SubscriptionStatus, TeacherSubscription,
};

/// Read access to batches and enrollment plus the one write recalculation
/// performs.
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    async fn get_batch(&self, batch_id: i64) -> Result<Option<BatchRecord>>;

    async fn list_teacher_batches(&self, teacher_id: i64) -> Result<Vec<BatchRecord>>;

    /// Number of approved students in a batch.
    async fn count_approved_students(&self, batch_id: i64) -> Result<u64>;

    async fn active_subscription_for_batch(
        &self,
        batch_id: i64,
    ) -> Result<Option<TeacherSubscription>>;

    async fn list_active_subscriptions_for_teacher(
        &self,
        teacher_id: i64,
    ) -> Result<Vec<TeacherSubscription>>;

    /// Persist a recalculated fee on a subscription.
    async fn update_subscription_fee(
        &self,
        subscription_id: i64,
        monthly_fee: Decimal,
        student_count: u32,
    ) -> Result<()>;
}

/// Process-local store. Default backend and test fixture.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    batches: Arc<DashMap<i64, BatchRecord>>,
    enrollments: Arc<DashMap<(i64, i64), EnrollmentRecord>>,
    subscriptions: Arc<DashMap<i64, TeacherSubscription>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert_batch(&self, batch: BatchRecord) {
        self.batches.insert(batch.id, batch);
    }

    pub fn upsert_enrollment(&self, enrollment: EnrollmentRecord) {
        self.enrollments
            .insert((enrollment.batch_id, enrollment.student_id), enrollment);
    }

    /// Approve `count` students in a batch, numbered from `first_student_id`.
    pub fn enroll_approved(&self, batch_id: i64, first_student_id: i64, count: u32) {
        for offset in 0..i64::from(count) {
            self.upsert_enrollment(EnrollmentRecord {
                batch_id,
                student_id: first_student_id + offset,
                status: EnrollmentStatus::Approved,
            });
        }
    }

    pub fn upsert_subscription(&self, subscription: TeacherSubscription) {
        self.subscriptions.insert(subscription.id, subscription);
    }

    pub fn subscription(&self, subscription_id: i64) -> Option<TeacherSubscription> {
        self.subscriptions
            .get(&subscription_id)
            .map(|s| s.value().clone())
    }
}

#[async_trait]
impl SubscriptionStore for InMemoryStore {
    async fn get_batch(&self, batch_id: i64) -> Result<Option<BatchRecord>> {
        Ok(self.batches.get(&batch_id).map(|b| b.value().clone()))
    }

    async fn list_teacher_batches(&self, teacher_id: i64) -> Result<Vec<BatchRecord>> {
        let mut batches: Vec<BatchRecord> = self
            .batches
            .iter()
            .filter(|b| b.teacher_id == teacher_id)
            .map(|b| b.value().clone())
            .collect();
        batches.sort_by_key(|b| b.id);
        Ok(batches)
    }

    async fn count_approved_students(&self, batch_id: i64) -> Result<u64> {
        Ok(self
            .enrollments
            .iter()
            .filter(|e| e.batch_id == batch_id && e.status == EnrollmentStatus::Approved)
            .count() as u64)
    }

    async fn active_subscription_for_batch(
        &self,
        batch_id: i64,
    ) -> Result<Option<TeacherSubscription>> {
        Ok(self
            .subscriptions
            .iter()
            .filter(|s| s.batch_id == batch_id && s.status == SubscriptionStatus::Active)
            .min_by_key(|s| s.id)
            .map(|s| s.value().clone()))
    }

    async fn list_active_subscriptions_for_teacher(
        &self,
        teacher_id: i64,
    ) -> Result<Vec<TeacherSubscription>> {
        let mut subscriptions: Vec<TeacherSubscription> = self
            .subscriptions
            .iter()
            .filter(|s| s.status == SubscriptionStatus::Active)
            .filter(|s| {
                self.batches
                    .get(&s.batch_id)
                    .is_some_and(|b| b.teacher_id == teacher_id)
            })
            .map(|s| s.value().clone())
            .collect();
        subscriptions.sort_by_key(|s| s.id);
        Ok(subscriptions)
    }

    async fn update_subscription_fee(
        &self,
        subscription_id: i64,
        monthly_fee: Decimal,
        student_count: u32,
    ) -> Result<()> {
        let mut subscription = self
            .subscriptions
            .get_mut(&subscription_id)
            .ok_or_else(|| anyhow::anyhow!("Subscription {} not found", subscription_id))?;
        subscription.monthly_fee = monthly_fee;
        subscription.student_count = student_count;
        Ok(())
    }
}
