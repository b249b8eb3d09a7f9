//! MongoDB-backed store.

use anyhow::Result;
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::options::{FindOptions, IndexOptions};
use mongodb::{bson::doc, Collection, Database, IndexModel};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use super::store::SubscriptionStore;
use crate::models::{
    BatchRecord, EnrollmentRecord, EnrollmentStatus, SubscriptionStatus, TeacherSubscription,
};

#[derive(Clone)]
pub struct MongoStore {
    batch_collection: Collection<BatchRecord>,
    enrollment_collection: Collection<EnrollmentRecord>,
    subscription_collection: Collection<TeacherSubscription>,
}

impl MongoStore {
    pub fn new(db: &Database) -> Self {
        Self {
            batch_collection: db.collection("batches"),
            enrollment_collection: db.collection("batch_students"),
            subscription_collection: db.collection("teacher_subscriptions"),
        }
    }

    /// Initialize indexes used by the subscription queries.
    pub async fn init_indexes(&self) -> Result<()> {
        let teacher_batch_index = IndexModel::builder()
            .keys(doc! { "teacher_id": 1 })
            .options(
                IndexOptions::builder()
                    .name("teacher_batch_idx".to_string())
                    .build(),
            )
            .build();

        self.batch_collection
            .create_indexes([teacher_batch_index], None)
            .await?;

        let enrollment_index = IndexModel::builder()
            .keys(doc! { "batch_id": 1, "status": 1 })
            .options(
                IndexOptions::builder()
                    .name("batch_enrollment_status_idx".to_string())
                    .build(),
            )
            .build();

        self.enrollment_collection
            .create_indexes([enrollment_index], None)
            .await?;

        let subscription_index = IndexModel::builder()
            .keys(doc! { "batch_id": 1, "status": 1 })
            .options(
                IndexOptions::builder()
                    .name("batch_subscription_status_idx".to_string())
                    .build(),
            )
            .build();

        self.subscription_collection
            .create_indexes([subscription_index], None)
            .await?;

        tracing::info!("Subscription service indexes initialized");
        Ok(())
    }
}

#[async_trait]
impl SubscriptionStore for MongoStore {
    async fn get_batch(&self, batch_id: i64) -> Result<Option<BatchRecord>> {
        let batch = self
            .batch_collection
            .find_one(doc! { "_id": batch_id }, None)
            .await?;
        Ok(batch)
    }

    async fn list_teacher_batches(&self, teacher_id: i64) -> Result<Vec<BatchRecord>> {
        let options = FindOptions::builder().sort(doc! { "_id": 1 }).build();
        let cursor = self
            .batch_collection
            .find(doc! { "teacher_id": teacher_id }, Some(options))
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn count_approved_students(&self, batch_id: i64) -> Result<u64> {
        let count = self
            .enrollment_collection
            .count_documents(
                doc! {
                    "batch_id": batch_id,
                    "status": EnrollmentStatus::Approved.as_str()
                },
                None,
            )
            .await?;
        Ok(count)
    }

    async fn active_subscription_for_batch(
        &self,
        batch_id: i64,
    ) -> Result<Option<TeacherSubscription>> {
        let subscription = self
            .subscription_collection
            .find_one(
                doc! {
                    "batch_id": batch_id,
                    "status": SubscriptionStatus::Active.as_str()
                },
                None,
            )
            .await?;
        Ok(subscription)
    }

    async fn list_active_subscriptions_for_teacher(
        &self,
        teacher_id: i64,
    ) -> Result<Vec<TeacherSubscription>> {
        let batch_ids: Vec<i64> = self
            .list_teacher_batches(teacher_id)
            .await?
            .into_iter()
            .map(|b| b.id)
            .collect();

        if batch_ids.is_empty() {
            return Ok(Vec::new());
        }

        let options = FindOptions::builder().sort(doc! { "_id": 1 }).build();
        let cursor = self
            .subscription_collection
            .find(
                doc! {
                    "batch_id": { "$in": batch_ids },
                    "status": SubscriptionStatus::Active.as_str()
                },
                Some(options),
            )
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn update_subscription_fee(
        &self,
        subscription_id: i64,
        monthly_fee: Decimal,
        student_count: u32,
    ) -> Result<()> {
        let fee = monthly_fee
            .to_f64()
            .ok_or_else(|| anyhow::anyhow!("Monthly fee {} out of range", monthly_fee))?;
        let update = doc! {
            "$set": {
                "monthly_fee": fee,
                "student_count": i64::from(student_count)
            }
        };
        let result = self
            .subscription_collection
            .update_one(doc! { "_id": subscription_id }, update, None)
            .await?;
        if result.matched_count == 0 {
            anyhow::bail!("Subscription {} not found", subscription_id);
        }
        Ok(())
    }
}
