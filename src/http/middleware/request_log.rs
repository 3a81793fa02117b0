//! Request start/end logging, correlated by request ID.

use std::time::Instant;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode, Uri},
    middleware::Next,
    response::Response,
};
use tracing::{Instrument, Span};

use crate::http::request::{assigned_request_id, RequestContext, UNKNOWN_REQUEST_ID};

/// Middleware function logging the start and completion of every request.
///
/// Must run inside `SetRequestIdLayer` so the assigned ID is available.
pub async fn log_requests(mut request: Request<Body>, next: Next) -> Response {
    let request_id = assigned_request_id(request.extensions())
        .unwrap_or(UNKNOWN_REQUEST_ID)
        .to_owned();
    let ctx = RequestContext::new(&request_id);
    let span = ctx.span().clone();
    let completion_span = span.clone();
    request.extensions_mut().insert(ctx);

    let method = request.method().clone();
    let uri = request.uri().clone();

    async move {
        tracing::info!(method = %method, url = %uri, "Request started");
        let mut completion = Completion {
            span: completion_span,
            method,
            uri,
            started: Instant::now(),
            status: None,
        };

        let response = next.run(request).await;
        completion.status = Some(response.status());
        response
    }
    .instrument(span)
    .await
}

/// Emits the completion record when dropped, so it is written on every exit
/// path: normal return, a panic unwinding out of the handler, or the
/// connection going away mid-request.
struct Completion {
    span: Span,
    method: Method,
    uri: Uri,
    started: Instant,
    status: Option<StatusCode>,
}

impl Drop for Completion {
    fn drop(&mut self) {
        let _entered = self.span.enter();
        let elapsed_ms = self.started.elapsed().as_secs_f64() * 1000.0;
        match self.status {
            Some(status) => tracing::info!(
                method = %self.method,
                url = %self.uri,
                status = status.as_u16(),
                elapsed_ms,
                "Request completed"
            ),
            None => tracing::warn!(
                method = %self.method,
                url = %self.uri,
                elapsed_ms,
                "Request completed without a response"
            ),
        }
    }
}
