//! Limiter Module
//!
//! Admission control: per-client and global request-rate and concurrency limits.

mod controller;
mod decision;
mod permit;
mod window;

pub use controller::{
    AdmissionController, LimiterConfig, LimiterStatus, CONCURRENCY_RETRY_AFTER_SECS,
    DEFAULT_GLOBAL_MULTIPLIER,
};
pub use decision::{Decision, RejectReason, Rejection};
pub use permit::AdmissionPermit;
