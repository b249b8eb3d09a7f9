//! Teacher subscription fees for batch-based classes.
//!
//! The fee rules live in [`calculator`]; [`status`] and [`adapters`] give
//! every payment and batch listing one canonical shape; [`reconcile`] decides
//! which figures to show when the backend and the local formula disagree.
//! The remaining modules serve all of it over HTTP.

pub mod adapters;
pub mod cache;
pub mod calculator;
pub mod config;
pub mod dtos;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod reconcile;
pub mod services;
pub mod startup;
pub mod status;

pub use calculator::{compute_subscription, BatchFeeProfile, FeePolicy, SubscriptionCalculation};
pub use startup::{AppState, Application};
pub use status::{classify_payment_status, BadgeVariant, PaymentDisplayStatus};
