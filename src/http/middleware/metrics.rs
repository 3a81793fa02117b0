//! Request count and latency recording.

use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::observability::MetricsRegistry;

/// State for [`track_metrics`].
#[derive(Clone, Debug)]
pub struct MetricsState {
    pub registry: MetricsRegistry,
    /// Path of the exposition endpoint; never measured.
    pub exempt_path: String,
}

/// Middleware function recording one counter increment and one latency
/// observation per request, labeled by path and status reason.
pub async fn track_metrics(
    State(state): State<MetricsState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let start = Instant::now();
    let path = request.uri().path().to_owned();

    let response = next.run(request).await;
    if path == state.exempt_path {
        return response;
    }

    state
        .registry
        .record_request(&path, response.status(), start.elapsed());
    response
}
