//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (grace period > 0, buckets ordered)
//! - Check that the bind address and log filter actually parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::config::schema::ServiceConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address `{0}` is not a socket address")]
    BindAddress(String),

    #[error("logging.level `{0}` is not a valid filter directive")]
    LogLevel(String),

    #[error("metrics.path `{0}` must start with `/` and must not be `/`")]
    MetricsPath(String),

    #[error("metrics.path `{0}` must be a literal path, without `{{`, `}}` or segments starting with `:` or `*`")]
    MetricsPathSyntax(String),

    #[error("metrics.duration_buckets must not be empty")]
    EmptyBuckets,

    #[error("metrics.duration_buckets must be finite and strictly increasing")]
    UnorderedBuckets,

    #[error("shutdown.grace_period_secs must be greater than zero")]
    GracePeriod,
}

/// Check a parsed configuration, collecting every problem found.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if EnvFilter::try_new(&config.logging.level).is_err() {
        errors.push(ValidationError::LogLevel(config.logging.level.clone()));
    }

    let path = &config.metrics.path;
    if !path.starts_with('/') || path == "/" {
        errors.push(ValidationError::MetricsPath(path.clone()));
    } else if !is_literal_route(path) {
        errors.push(ValidationError::MetricsPathSyntax(path.clone()));
    }

    let buckets = &config.metrics.duration_buckets;
    if buckets.is_empty() {
        errors.push(ValidationError::EmptyBuckets);
    } else if buckets.iter().any(|b| !b.is_finite())
        || buckets.windows(2).any(|pair| pair[0] >= pair[1])
    {
        errors.push(ValidationError::UnorderedBuckets);
    }

    if config.shutdown.grace_period_secs == 0 {
        errors.push(ValidationError::GracePeriod);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// True when the router would match `path` verbatim, with no captures or
/// wildcards. The metrics exemption compares request paths literally.
fn is_literal_route(path: &str) -> bool {
    !path.contains(['{', '}'])
        && path
            .split('/')
            .all(|segment| !segment.starts_with([':', '*']))
}
