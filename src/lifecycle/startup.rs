//! Startup orchestration.
//!
//! # Responsibilities
//! - Initialize subsystems in dependency order
//! - Bind the listener and begin accepting traffic
//! - Block until a stop signal, then drain
//!
//! # Design Decisions
//! - Fail fast: logging, metrics and signal setup errors are fatal and happen
//!   before the port is bound
//! - A listener that fails to bind is logged, not fatal; the process still
//!   waits for a stop signal

use std::io;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::ServiceConfig;
use crate::http::HttpServer;
use crate::lifecycle::shutdown::DrainOutcome;
use crate::lifecycle::signals::StopSignals;
use crate::observability::{logging, LoggingError, MetricsError, MetricsRegistry};

/// Errors that abort startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Logging(#[from] LoggingError),

    #[error(transparent)]
    Metrics(#[from] MetricsError),

    #[error("failed to install signal handlers: {0}")]
    Signals(#[source] io::Error),
}

/// Run the service until a stop signal has been handled.
pub async fn run(config: ServiceConfig) -> Result<DrainOutcome, StartupError> {
    logging::init(&config.logging)?;

    tracing::info!(
        bind_address = %config.listener.bind_address,
        log_file = %config.logging.file.display(),
        metrics_path = %config.metrics.path,
        grace_period_secs = config.shutdown.grace_period_secs,
        "Configuration loaded"
    );

    let metrics = MetricsRegistry::new(&config.metrics.duration_buckets)?;
    let mut signals = StopSignals::install().map_err(StartupError::Signals)?;
    let stop = async move { signals.recv().await.log() };

    let server = HttpServer::new(&config, metrics);

    let outcome = match TcpListener::bind(&config.listener.bind_address).await {
        Ok(listener) => server.run(listener, stop).await,
        Err(e) => {
            tracing::error!(
                address = %config.listener.bind_address,
                error = %e,
                "Failed to bind listener"
            );
            stop.await;
            DrainOutcome::Clean
        }
    };

    tracing::info!(outcome = ?outcome, "Server exiting");
    Ok(outcome)
}
