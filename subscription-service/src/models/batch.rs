//! Batch models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculator::BatchFeeProfile;

/// Batch as persisted by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRecord {
    #[serde(rename = "_id")]
    pub id: i64,
    pub teacher_id: i64,
    pub name: String,
    pub fees: Option<Decimal>,
    pub student_limit: Option<i64>,
}

impl BatchRecord {
    /// Fee profile of this batch given its approved enrollment.
    pub fn fee_profile(&self, current_student_count: u64) -> BatchFeeProfile {
        BatchFeeProfile::new(
            self.fees.unwrap_or_default(),
            self.student_limit,
            i64::try_from(current_student_count).unwrap_or(i64::MAX),
        )
    }
}

/// Join request status of a student in a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentStatus {
    Pending,
    Approved,
    Rejected,
}

impl EnrollmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnrollmentStatus::Pending => "pending",
            EnrollmentStatus::Approved => "approved",
            EnrollmentStatus::Rejected => "rejected",
        }
    }
}

/// Student membership in a batch. Only approved members count as enrolled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrollmentRecord {
    pub batch_id: i64,
    pub student_id: i64,
    pub status: EnrollmentStatus,
}

/// Canonical batch shape produced by [`crate::adapters::normalize_batch`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    pub id: Option<String>,
    pub name: Option<String>,
    pub teacher_id: Option<String>,
    pub fee_profile: BatchFeeProfile,
}
