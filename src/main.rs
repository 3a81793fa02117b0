//! hello-service
//!
//! A greeting HTTP service built with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────▶ catch panic ─▶ request id ─▶ metrics ─▶ request log ─▶ router ─┐
//!                                                                              │
//!     Client Response                                                          ▼
//!     ◀────────── (x-request-id echoed) ◀──── count + time ◀── completed ◀── handler
//!
//!     Cross-cutting: config (TOML + CLI) · logging (stdout + file) · lifecycle (signals, drain)
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use hello_service::config::{resolve_config, ConfigOverrides};
use hello_service::lifecycle::startup;
use hello_service::observability::logging;

#[derive(Parser)]
#[command(name = "hello-service")]
#[command(about = "Greeting HTTP service with request logging and Prometheus metrics", long_about = None)]
struct Cli {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address, overriding the configuration.
    #[arg(long)]
    bind: Option<String>,

    /// Log file, overriding the configuration.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let overrides = ConfigOverrides {
        bind_address: cli.bind,
        log_file: cli.log_file,
    };
    let config = match resolve_config(cli.config.as_deref(), overrides) {
        Ok(config) => config,
        Err(e) => {
            logging::init_stderr();
            tracing::error!(error = %e, "Failed to load configuration");
            return ExitCode::FAILURE;
        }
    };

    match startup::run(config).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            logging::init_stderr();
            tracing::error!(error = %e, "Startup failed");
            ExitCode::FAILURE
        }
    }
}
