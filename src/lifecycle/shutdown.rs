//! Shutdown coordination for the service.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Lifecycle phase of a server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Accepting and serving connections.
    Running,
    /// No longer accepting; in-flight requests are finishing.
    ShuttingDown,
    /// Terminal.
    Stopped,
}

/// How the drain ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainOutcome {
    /// Every in-flight request finished within the grace period.
    Clean,
    /// The grace period elapsed and the remaining work was abandoned.
    TimedOut,
}

/// Coordinator for graceful shutdown.
///
/// Holds the current [`Phase`] in a watch channel that any task can observe.
/// Phases only move forward: `Running → ShuttingDown → Stopped`.
#[derive(Debug, Clone)]
pub struct Shutdown {
    phase: Arc<watch::Sender<Phase>>,
    grace_period: Duration,
}

impl Shutdown {
    /// Create a new shutdown coordinator in the `Running` phase.
    pub fn new(grace_period: Duration) -> Self {
        let (tx, _) = watch::channel(Phase::Running);
        Self {
            phase: Arc::new(tx),
            grace_period,
        }
    }

    pub fn grace_period(&self) -> Duration {
        self.grace_period
    }

    pub fn phase(&self) -> Phase {
        *self.phase.borrow()
    }

    /// Subscribe to phase changes.
    pub fn subscribe(&self) -> watch::Receiver<Phase> {
        self.phase.subscribe()
    }

    /// Move from `Running` to `ShuttingDown`.
    ///
    /// Returns `false` if shutdown had already begun.
    pub fn begin(&self) -> bool {
        self.phase.send_if_modified(|phase| {
            if *phase == Phase::Running {
                *phase = Phase::ShuttingDown;
                true
            } else {
                false
            }
        })
    }

    /// Resolves once shutdown has begun.
    pub async fn draining(&self) {
        let mut rx = self.phase.subscribe();
        let _ = rx.wait_for(|phase| *phase != Phase::Running).await;
    }

    /// Begin shutdown and wait up to the grace period for `server` to finish.
    ///
    /// On timeout the task is aborted. Either way the phase ends `Stopped`.
    pub async fn drain<T>(&self, mut server: JoinHandle<T>) -> DrainOutcome {
        self.begin();

        let outcome = match tokio::time::timeout(self.grace_period, &mut server).await {
            Ok(_) => DrainOutcome::Clean,
            Err(_) => {
                server.abort();
                tracing::error!(
                    grace_period_ms = self.grace_period.as_millis() as u64,
                    "Server forced to shutdown"
                );
                DrainOutcome::TimedOut
            }
        };

        self.phase.send_replace(Phase::Stopped);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_is_idempotent() {
        let shutdown = Shutdown::new(Duration::from_secs(1));
        assert_eq!(shutdown.phase(), Phase::Running);

        assert!(shutdown.begin());
        assert!(!shutdown.begin());
        assert_eq!(shutdown.phase(), Phase::ShuttingDown);
    }

    #[tokio::test]
    async fn draining_resolves_after_begin() {
        let shutdown = Shutdown::new(Duration::from_secs(1));
        let waiter = {
            let shutdown = shutdown.clone();
            tokio::spawn(async move { shutdown.draining().await })
        };

        tokio::task::yield_now().await;
        assert!(!waiter.is_finished());

        shutdown.begin();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("draining should resolve")
            .unwrap();
    }

    #[tokio::test]
    async fn finished_task_drains_clean() {
        let shutdown = Shutdown::new(Duration::from_secs(1));
        let mut phases = shutdown.subscribe();
        let task = tokio::spawn(async {});

        assert_eq!(shutdown.drain(task).await, DrainOutcome::Clean);
        assert_eq!(shutdown.phase(), Phase::Stopped);
        assert!(phases.has_changed().unwrap());
        assert_eq!(*phases.borrow_and_update(), Phase::Stopped);
    }

    #[tokio::test]
    async fn stuck_task_is_abandoned_after_grace_period() {
        let shutdown = Shutdown::new(Duration::from_millis(50));
        let task = tokio::spawn(std::future::pending::<()>());

        assert_eq!(shutdown.drain(task).await, DrainOutcome::TimedOut);
        assert_eq!(shutdown.phase(), Phase::Stopped);
        assert!(!shutdown.begin());
    }
}
