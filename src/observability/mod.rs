//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Request handling produces:
//!     → logging.rs (structured log events, stdout + file)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout, file)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Request ID flows through every record of a request via its span
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;

pub use logging::LoggingError;
pub use metrics::{MetricsError, MetricsRegistry};
