//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → middleware/metrics.rs (timer, count on the way out)
//!     → middleware/request_log.rs (request span, start/end records)
//!     → handlers.rs (greeting, metrics exposition)
//!     → Send to client
//! ```

pub mod handlers;
pub mod middleware;
pub mod request;
pub mod server;

pub use request::{RequestContext, X_REQUEST_ID};
pub use server::{build_router, HttpServer};
