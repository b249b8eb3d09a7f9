//! Domain models for subscription-service.

mod batch;
mod payment;
mod subscription;

pub use batch::{Batch, BatchRecord, EnrollmentRecord, EnrollmentStatus};
pub use payment::{Payment, PaymentSummary, StatusTotals, Student};
pub use subscription::{SubscriptionStatus, TeacherSubscription};
