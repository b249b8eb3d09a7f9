//! HTTP handlers for subscription-service.

pub mod health;
pub mod payments;
pub mod subscription;

pub use health::{health_check, metrics_endpoint, readiness_check};
