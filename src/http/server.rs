//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (panic recovery, request ID, metrics, request logs)
//! - Bind server to listener
//! - Hand the running server to the shutdown coordinator

use std::future::Future;
use std::time::Duration;

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
};

use crate::config::ServiceConfig;
use crate::http::handlers;
use crate::http::middleware::{log_requests, track_metrics, MetricsState};
use crate::http::request::X_REQUEST_ID;
use crate::lifecycle::{DrainOutcome, Shutdown};
use crate::observability::MetricsRegistry;

/// Application state injected into handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    pub metrics: MetricsRegistry,
}

/// The service's routes, without middleware.
pub fn routes(metrics_path: &str, state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::greet))
        .route(metrics_path, get(handlers::render_metrics))
        .with_state(state)
}

/// Wrap `router` (including its 404 fallback) in the middleware stack.
///
/// Outermost first: panic recovery, request ID assignment and propagation,
/// metrics, request logging.
pub fn with_middleware(router: Router, metrics: MetricsState) -> Router {
    router.layer(
        ServiceBuilder::new()
            .layer(CatchPanicLayer::new())
            .layer(SetRequestIdLayer::new(X_REQUEST_ID.clone(), MakeRequestUuid))
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID.clone()))
            .layer(from_fn_with_state(metrics, track_metrics))
            .layer(from_fn(log_requests)),
    )
}

/// Build the complete application router.
pub fn build_router(config: &ServiceConfig, metrics: MetricsRegistry) -> Router {
    let state = AppState {
        metrics: metrics.clone(),
    };
    let metrics_state = MetricsState {
        registry: metrics,
        exempt_path: config.metrics.path.clone(),
    };

    with_middleware(routes(&config.metrics.path, state), metrics_state)
}

/// HTTP server for the greeting service.
pub struct HttpServer {
    router: Router,
    shutdown: Shutdown,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: &ServiceConfig, metrics: MetricsRegistry) -> Self {
        Self::from_router(
            build_router(config, metrics),
            config.shutdown.grace_period(),
        )
    }

    /// Serve an already assembled router.
    pub fn from_router(router: Router, grace_period: Duration) -> Self {
        Self {
            router,
            shutdown: Shutdown::new(grace_period),
        }
    }

    /// Handle on the shutdown coordinator, for observing phase changes.
    pub fn shutdown(&self) -> Shutdown {
        self.shutdown.clone()
    }

    /// Serve on `listener` until `stop` resolves, then drain.
    ///
    /// Serve errors are logged and leave the server down; the stop future is
    /// still awaited before draining.
    pub async fn run<F>(self, listener: TcpListener, stop: F) -> DrainOutcome
    where
        F: Future<Output = ()> + Send,
    {
        let Self { router, shutdown } = self;

        match listener.local_addr() {
            Ok(address) => tracing::info!(address = %address, "Server started"),
            Err(e) => tracing::warn!(error = %e, "Server started on unknown address"),
        }

        let draining = shutdown.clone();
        let server = tokio::spawn(async move {
            let serve = axum::serve(listener, router)
                .with_graceful_shutdown(async move { draining.draining().await });
            if let Err(e) = serve.await {
                tracing::error!(error = %e, "Server error");
            }
        });

        stop.await;
        tracing::info!("Shutting down server...");
        shutdown.drain(server).await
    }
}
