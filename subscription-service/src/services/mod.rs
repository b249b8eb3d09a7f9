//! Services module for subscription-service.

pub mod metrics;
pub mod mongo;
pub mod store;
pub mod subscription;

pub use metrics::{get_metrics, init_metrics};
pub use mongo::MongoStore;
pub use store::{InMemoryStore, SubscriptionStore};
pub use subscription::{
    BatchSubscriptionView, RecalculationOutcome, SubscriptionService, SubscriptionStatusEntry,
    TeacherSubscriptionMetrics, TeacherSubscriptionStatus,
};
