//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → command line overrides (re-validated)
//!     → ServiceConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no live reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, resolve_config, ConfigError, ConfigOverrides};
pub use schema::{
    ListenerConfig, LogFormat, LoggingConfig, MetricsConfig, ServiceConfig, ShutdownConfig,
};
pub use validation::{validate_config, ValidationError};
