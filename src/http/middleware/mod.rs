//! Middleware wrapped around every route.

pub mod metrics;
pub mod request_log;

pub use metrics::{track_metrics, MetricsState};
pub use request_log::log_requests;
