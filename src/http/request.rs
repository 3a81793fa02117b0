//! Per-request context.
//!
//! The request logging middleware creates one [`RequestContext`] for every
//! inbound request and stores it in the request extensions. Handlers take it
//! as an extractor and log inside its span, which is how the correlation ID
//! reaches every record of the request.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderName;
use tower_http::request_id::RequestId;
use tracing::Span;

/// Header carrying the correlation ID, both inbound and outbound.
pub static X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Placeholder used when no upstream layer assigned an ID.
pub const UNKNOWN_REQUEST_ID: &str = "unknown";

/// Correlation data for a single request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: Arc<str>,
    span: Span,
}

impl RequestContext {
    /// Open the `request` span for `request_id`.
    pub fn new(request_id: &str) -> Self {
        let span = tracing::info_span!("request", request_id = %request_id);
        Self {
            request_id: Arc::from(request_id),
            span,
        }
    }

    /// Context for code running outside the request logging middleware.
    /// Records logged through it correlate to nothing.
    pub fn detached() -> Self {
        Self {
            request_id: Arc::from(UNKNOWN_REQUEST_ID),
            span: Span::none(),
        }
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// The span every record of this request is emitted in.
    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Run `f` with the request span entered.
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        self.span.in_scope(f)
    }
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .unwrap_or_else(RequestContext::detached))
    }
}

/// Read the ID assigned by `SetRequestIdLayer`, if any.
pub fn assigned_request_id(extensions: &axum::http::Extensions) -> Option<&str> {
    extensions
        .get::<RequestId>()
        .and_then(|id| id.header_value().to_str().ok())
}
