//! Greeting HTTP service.
//!
//! Serves `Hello World!` on `/` and a Prometheus exposition on `/metrics`.
//! Every request is logged at start and completion with its request ID,
//! counted, and timed. SIGINT, SIGTERM and SIGHUP drain the server within a
//! bounded grace period.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use observability::MetricsRegistry;
