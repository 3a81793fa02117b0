//! OS signal handling.
//!
//! # Responsibilities
//! - Register signal handlers (SIGTERM, SIGINT, SIGHUP)
//! - Translate signals to a [`StopSignal`]
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - Handlers are installed at startup, before the listener is bound, so a
//!   signal never hits the default disposition once the server is up
//! - SIGHUP requests a reload, which is not supported; it stops the server
//!   like the other two

use std::io;

/// A signal that stops the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopSignal {
    Hangup,
    Interrupt,
    Terminate,
}

impl StopSignal {
    pub fn name(self) -> &'static str {
        match self {
            StopSignal::Hangup => "SIGHUP",
            StopSignal::Interrupt => "SIGINT",
            StopSignal::Terminate => "SIGTERM",
        }
    }

    /// Record why the server is stopping.
    pub fn log(self) {
        tracing::info!(signal = self.name(), "Signal received");
        match self {
            StopSignal::Hangup => {
                tracing::warn!("Reload requested but not supported, shutting down")
            }
            StopSignal::Interrupt => tracing::info!("Interrupt by Ctrl+C"),
            StopSignal::Terminate => tracing::info!("Process is killed"),
        }
    }
}

/// Installed handlers for every stop signal.
#[cfg(unix)]
pub struct StopSignals {
    hangup: tokio::signal::unix::Signal,
    interrupt: tokio::signal::unix::Signal,
    terminate: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl StopSignals {
    /// Register the handlers. Must be called from within a Tokio runtime.
    pub fn install() -> io::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};

        Ok(Self {
            hangup: signal(SignalKind::hangup())?,
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
        })
    }

    /// Wait for the next stop signal.
    pub async fn recv(&mut self) -> StopSignal {
        tokio::select! {
            _ = self.hangup.recv() => StopSignal::Hangup,
            _ = self.interrupt.recv() => StopSignal::Interrupt,
            _ = self.terminate.recv() => StopSignal::Terminate,
        }
    }
}

/// Installed handlers for every stop signal. Only Ctrl+C exists here.
#[cfg(not(unix))]
pub struct StopSignals {
    _private: (),
}

#[cfg(not(unix))]
impl StopSignals {
    pub fn install() -> io::Result<Self> {
        Ok(Self { _private: () })
    }

    pub async fn recv(&mut self) -> StopSignal {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C, stopping");
        }
        StopSignal::Interrupt
    }
}
