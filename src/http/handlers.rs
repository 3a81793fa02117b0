//! Route handlers.

use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
};

use crate::http::request::RequestContext;
use crate::http::server::AppState;

/// Body served on `/`.
pub const GREETING: &str = "Hello World!";

/// Prometheus text exposition content type.
pub const EXPOSITION_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

pub async fn greet(ctx: RequestContext) -> &'static str {
    ctx.in_scope(|| tracing::info!("Received the request"));
    GREETING
}

/// Serve the current metric values for scraping.
pub async fn render_metrics(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, EXPOSITION_CONTENT_TYPE)],
        state.metrics.render(),
    )
}
