//! Subscription fee orchestration: loads batch data, applies the fee policy
//! and persists recalculated fees.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use super::metrics::{record_calculation, record_recalculation, record_zero_fee};
use super::store::SubscriptionStore;
use crate::cache::TtlCache;
use crate::calculator::{FeePolicy, SubscriptionCalculation};
use crate::error::AppError;
use crate::middleware::CallerContext;
use crate::models::{BatchRecord, TeacherSubscription};
use crate::status::{classify_payment_status, BadgeVariant, PaymentDisplayStatus};

/// Subscription figures of one batch together with its identification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSubscriptionView {
    pub batch_id: i64,
    pub batch_name: String,
    pub batch_fees: Decimal,
    pub max_student_limit: Option<u32>,
    /// Seat limit with "not configured" shown as 0.
    pub student_limit: u32,
    pub current_student_count: u32,
    pub subscription_calculation: SubscriptionCalculation,
    pub monthly_fee: Decimal,
    pub commission_per_student: Decimal,
    pub effective_student_count: u32,
    pub minimum_met: bool,
    pub beta_testing_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecalculationOutcome {
    #[serde(flatten)]
    pub view: BatchSubscriptionView,
    /// An active subscription existed and was updated.
    pub subscription_updated: bool,
}

/// One active subscription, recomputed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionStatusEntry {
    pub subscription_id: i64,
    pub batch_id: i64,
    pub batch_name: String,
    pub monthly_fee: Decimal,
    /// Fee persisted at the last recalculation.
    pub stored_monthly_fee: Decimal,
    /// The persisted fee no longer matches the current formula.
    pub stored_fee_stale: bool,
    pub student_count: u32,
    pub student_limit: u32,
    pub batch_fees: Decimal,
    pub commission_per_student: Decimal,
    pub effective_student_count: u32,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub next_billing_date: Option<NaiveDate>,
    pub is_due: bool,
    pub payment_status: String,
    pub display_status: PaymentDisplayStatus,
    pub badge: BadgeVariant,
    pub minimum_met: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeacherSubscriptionStatus {
    pub has_subscription: bool,
    pub subscription_active: bool,
    pub subscriptions: Vec<SubscriptionStatusEntry>,
    pub subscription_count: usize,
    pub due_count: usize,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeacherSubscriptionMetrics {
    pub total_students: u64,
    pub total_batches: usize,
    /// Whole rupees, truncated.
    pub average_fee_per_student: Decimal,
    pub total_fees: Decimal,
    pub total_subscription_fees: Decimal,
    /// Whole rupees, truncated.
    pub average_subscription_fee: Decimal,
}

#[derive(Clone)]
pub struct SubscriptionService {
    store: Arc<dyn SubscriptionStore>,
    policy: FeePolicy,
    cache: Arc<TtlCache<i64, BatchSubscriptionView>>,
    beta_testing_enabled: bool,
}

impl SubscriptionService {
    pub fn new(
        store: Arc<dyn SubscriptionStore>,
        cache_ttl: Duration,
        beta_testing_enabled: bool,
    ) -> Self {
        Self {
            store,
            policy: FeePolicy::standard(),
            cache: Arc::new(TtlCache::new(cache_ttl)),
            beta_testing_enabled,
        }
    }

    pub fn policy(&self) -> &FeePolicy {
        &self.policy
    }

    /// Subscription for a batch, served from the cache when fresh.
    pub async fn calculate_for_batch(
        &self,
        caller: &CallerContext,
        batch_id: i64,
    ) -> Result<BatchSubscriptionView, AppError> {
        caller.require_teacher()?;

        if let Some(view) = self.cache.get(&batch_id) {
            tracing::debug!(batch_id, "Subscription calculation served from cache");
            record_calculation("cache");
            return Ok(view);
        }

        let batch = self.load_batch(batch_id).await?;
        let view = self.compute_view(&batch).await?;
        self.cache.insert(batch_id, view.clone());
        record_calculation("fresh");

        tracing::info!(
            batch_id,
            user_id = caller.user_id,
            monthly_fee = %view.monthly_fee,
            effective_student_count = view.effective_student_count,
            "Calculated subscription fee"
        );

        Ok(view)
    }

    /// Recompute a batch's fee and persist it on the active subscription.
    pub async fn recalculate_for_batch(
        &self,
        caller: &CallerContext,
        batch_id: i64,
    ) -> Result<RecalculationOutcome, AppError> {
        caller.require_teacher()?;

        let batch = self
            .store
            .get_batch(batch_id)
            .await
            .map_err(AppError::DatabaseError)?
            .filter(|b| b.teacher_id == caller.user_id)
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Batch not found")))?;

        self.cache.invalidate(&batch_id);
        self.cache.purge_expired();
        let view = self.compute_view(&batch).await?;

        let existing = self
            .store
            .active_subscription_for_batch(batch_id)
            .await
            .map_err(AppError::DatabaseError)?;

        let subscription_updated = match existing {
            Some(subscription) => {
                self.store
                    .update_subscription_fee(
                        subscription.id,
                        view.monthly_fee,
                        view.current_student_count,
                    )
                    .await
                    .map_err(AppError::DatabaseError)?;
                true
            }
            None => false,
        };

        self.cache.insert(batch_id, view.clone());
        record_recalculation();

        tracing::info!(
            batch_id,
            teacher_id = caller.user_id,
            monthly_fee = %view.monthly_fee,
            subscription_updated,
            "Recalculated subscription fee"
        );

        Ok(RecalculationOutcome {
            view,
            subscription_updated,
        })
    }

    /// Active subscriptions of the calling teacher, each recomputed.
    pub async fn teacher_status(
        &self,
        caller: &CallerContext,
        today: NaiveDate,
    ) -> Result<TeacherSubscriptionStatus, AppError> {
        caller.require_teacher()?;

        let subscriptions = self
            .store
            .list_active_subscriptions_for_teacher(caller.user_id)
            .await
            .map_err(AppError::DatabaseError)?;

        if subscriptions.is_empty() {
            return Ok(TeacherSubscriptionStatus {
                has_subscription: false,
                subscription_active: false,
                subscriptions: Vec::new(),
                subscription_count: 0,
                due_count: 0,
                message: "No active subscriptions found".to_string(),
            });
        }

        let mut entries = Vec::with_capacity(subscriptions.len());
        for subscription in subscriptions {
            let Some(batch) = self
                .store
                .get_batch(subscription.batch_id)
                .await
                .map_err(AppError::DatabaseError)?
            else {
                tracing::warn!(
                    subscription_id = subscription.id,
                    batch_id = subscription.batch_id,
                    "Active subscription references a missing batch"
                );
                continue;
            };

            let view = self.compute_view(&batch).await?;
            entries.push(self.status_entry(&subscription, &view, today));
        }

        let due_count = entries.iter().filter(|e| e.is_due).count();
        let subscription_count = entries.len();

        Ok(TeacherSubscriptionStatus {
            has_subscription: true,
            subscription_active: true,
            subscriptions: entries,
            subscription_count,
            due_count,
            message: format!(
                "Teacher has {} active subscription(s)",
                subscription_count
            ),
        })
    }

    /// Totals across every batch of the calling teacher.
    pub async fn teacher_metrics(
        &self,
        caller: &CallerContext,
    ) -> Result<TeacherSubscriptionMetrics, AppError> {
        caller.require_teacher()?;

        let batches = self
            .store
            .list_teacher_batches(caller.user_id)
            .await
            .map_err(AppError::DatabaseError)?;

        let mut total_students: u64 = 0;
        let mut total_fees = Decimal::ZERO;
        let mut total_subscription_fees = Decimal::ZERO;

        for batch in &batches {
            let view = self.compute_view(batch).await?;
            total_students += u64::from(view.current_student_count);
            total_fees = total_fees.saturating_add(view.batch_fees);
            total_subscription_fees = total_subscription_fees.saturating_add(view.monthly_fee);
        }

        let average_fee_per_student = if total_students > 0 {
            (total_fees / Decimal::from(total_students)).trunc()
        } else {
            Decimal::ZERO
        };
        let average_subscription_fee = if batches.is_empty() {
            Decimal::ZERO
        } else {
            (total_subscription_fees / Decimal::from(batches.len() as u64)).trunc()
        };

        Ok(TeacherSubscriptionMetrics {
            total_students,
            total_batches: batches.len(),
            average_fee_per_student,
            total_fees,
            total_subscription_fees,
            average_subscription_fee,
        })
    }

    async fn load_batch(&self, batch_id: i64) -> Result<BatchRecord, AppError> {
        self.store
            .get_batch(batch_id)
            .await
            .map_err(AppError::DatabaseError)?
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Batch not found")))
    }

    async fn compute_view(&self, batch: &BatchRecord) -> Result<BatchSubscriptionView, AppError> {
        let current = self
            .store
            .count_approved_students(batch.id)
            .await
            .map_err(AppError::DatabaseError)?;

        let profile = batch.fee_profile(current);
        let calculation = self.policy.compute(&profile);

        if calculation.monthly_fee.is_zero() {
            record_zero_fee();
            tracing::warn!(batch_id = batch.id, "Subscription fee resolved to zero");
        }

        Ok(BatchSubscriptionView {
            batch_id: batch.id,
            batch_name: batch.name.clone(),
            batch_fees: profile.batch_fees,
            max_student_limit: profile.max_student_limit,
            student_limit: profile.max_student_limit.unwrap_or(0),
            current_student_count: profile.current_student_count,
            subscription_calculation: calculation,
            monthly_fee: calculation.monthly_fee,
            commission_per_student: calculation.commission_per_student,
            effective_student_count: calculation.effective_student_count,
            minimum_met: calculation.minimum_met,
            beta_testing_enabled: self.beta_testing_enabled,
        })
    }

    fn status_entry(
        &self,
        subscription: &TeacherSubscription,
        view: &BatchSubscriptionView,
        today: NaiveDate,
    ) -> SubscriptionStatusEntry {
        let is_due = subscription.is_due(today);
        let payment_status = if is_due { "due" } else { "paid" };
        let display_status = classify_payment_status(Some(payment_status));

        SubscriptionStatusEntry {
            subscription_id: subscription.id,
            batch_id: view.batch_id,
            batch_name: view.batch_name.clone(),
            monthly_fee: view.monthly_fee,
            stored_monthly_fee: subscription.monthly_fee,
            stored_fee_stale: subscription.monthly_fee != view.monthly_fee,
            student_count: view.current_student_count,
            student_limit: view.student_limit,
            batch_fees: view.batch_fees,
            commission_per_student: view.commission_per_student,
            effective_student_count: view.effective_student_count,
            start_date: subscription.start_date,
            end_date: subscription.end_date,
            next_billing_date: subscription.next_billing_date,
            is_due,
            payment_status: payment_status.to_string(),
            display_status,
            badge: display_status.badge(),
            minimum_met: view.minimum_met,
        }
    }
}
