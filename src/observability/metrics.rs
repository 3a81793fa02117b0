//! Metrics collection and exposition.
//!
//! # Metrics
//! - `http_requests_total` (counter): total requests by path, status
//! - `http_request_duration_seconds` (histogram): latency distribution by
//!   path, status
//!
//! # Design Decisions
//! - Low-overhead metric updates (atomic operations inside the recorder)
//! - The recorder is owned by a [`MetricsRegistry`] value instead of being
//!   installed globally, so every server (and every test) gets its own
//! - Status labels use the reason phrase (`OK`, `Not Found`)

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle, PrometheusRecorder};
use thiserror::Error;

/// Counter of handled requests.
pub const REQUESTS_TOTAL: &str = "http_requests_total";
/// Histogram of request latency in seconds.
pub const REQUEST_DURATION_SECONDS: &str = "http_request_duration_seconds";

/// Errors raised while building the registry.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("invalid histogram buckets: {0}")]
    Buckets(#[from] BuildError),
}

/// Request metrics shared by every request handling task.
///
/// Cloning is cheap; clones record into the same aggregates.
#[derive(Clone)]
pub struct MetricsRegistry {
    recorder: Arc<PrometheusRecorder>,
    handle: PrometheusHandle,
}

impl MetricsRegistry {
    /// Build a registry whose duration histogram uses `buckets` (seconds).
    pub fn new(buckets: &[f64]) -> Result<Self, MetricsError> {
        let recorder = PrometheusBuilder::new().set_buckets(buckets)?.build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            describe_counter!(REQUESTS_TOTAL, "Total Number of HTTP Requests");
            describe_histogram!(
                REQUEST_DURATION_SECONDS,
                Unit::Seconds,
                "Histogram of response latency (seconds) of HTTP requests."
            );
        });

        Ok(Self {
            recorder: Arc::new(recorder),
            handle,
        })
    }

    /// Count one request and observe its latency.
    pub fn record_request(&self, path: &str, status: StatusCode, elapsed: Duration) {
        let status = status_label(status);

        metrics::with_local_recorder(self.recorder.as_ref(), || {
            counter!(
                REQUESTS_TOTAL,
                "path" => path.to_owned(),
                "status" => status.clone()
            )
            .increment(1);
            histogram!(
                REQUEST_DURATION_SECONDS,
                "path" => path.to_owned(),
                "status" => status.clone()
            )
            .record(elapsed.as_secs_f64());
        });
    }

    /// Render every metric in the Prometheus text format.
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

impl std::fmt::Debug for MetricsRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricsRegistry").finish_non_exhaustive()
    }
}

/// Textual name of a status code, falling back to the numeric code for
/// statuses without a registered reason phrase.
pub fn status_label(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map(str::to_owned)
        .unwrap_or_else(|| status.as_str().to_owned())
}
