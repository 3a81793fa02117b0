//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Init logging → Build metrics → Install signal handlers → Bind → Serve
//!
//! Shutdown (shutdown.rs):
//!     Stop condition → Stop accepting → Drain (bounded) → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT/SIGHUP → Stop condition
//! ```
//!
//! # Design Decisions
//! - Ordered startup: logging first, listener last
//! - The drain only sees a stop future, never a signal, so tests stop the
//!   server directly
//! - Shutdown has timeout: in-flight work is abandoned after the grace period

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::{DrainOutcome, Phase, Shutdown};
pub use signals::{StopSignal, StopSignals};
pub use startup::StartupError;
