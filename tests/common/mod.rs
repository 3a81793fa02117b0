//! Shared utilities for integration testing.
#![allow(dead_code)]

use std::io::{self, Write};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use axum::body::Body;
use axum::http::Request;
use axum::Router;
use hello_service::config::ServiceConfig;
use hello_service::http::middleware::MetricsState;
use hello_service::http::server::{routes, with_middleware, AppState};
use hello_service::lifecycle::DrainOutcome;
use hello_service::{HttpServer, MetricsRegistry, Shutdown};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing_subscriber::fmt::MakeWriter;

/// A fresh registry with the default buckets.
pub fn registry() -> MetricsRegistry {
    MetricsRegistry::new(&ServiceConfig::default().metrics.duration_buckets).unwrap()
}

/// The production router plus whatever `extra` adds, all behind the
/// production middleware stack.
pub fn app_with(registry: &MetricsRegistry, extra: impl FnOnce(Router) -> Router) -> Router {
    let config = ServiceConfig::default();
    let state = AppState {
        metrics: registry.clone(),
    };
    let metrics = MetricsState {
        registry: registry.clone(),
        exempt_path: config.metrics.path.clone(),
    };
    with_middleware(extra(routes(&config.metrics.path, state)), metrics)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn get_with_id(uri: &str, request_id: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("x-request-id", request_id)
        .body(Body::empty())
        .unwrap()
}

pub async fn body_text(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Value of the `name{path=..,status=..}` sample in a Prometheus exposition.
pub fn sample(exposition: &str, name: &str, path: &str, status: &str) -> Option<f64> {
    let path_label = format!("path=\"{path}\"");
    let status_label = format!("status=\"{status}\"");

    exposition.lines().find_map(|line| {
        let rest = line.strip_prefix(name)?.strip_prefix('{')?;
        let (labels, value) = rest.split_once("} ")?;
        let labels: Vec<&str> = labels.split(',').collect();
        if labels.contains(&path_label.as_str()) && labels.contains(&status_label.as_str()) {
            value.trim().parse().ok()
        } else {
            None
        }
    })
}

/// Log sink collecting formatted records in memory.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    /// Every captured line, parsed as JSON.
    pub fn records(&self) -> Vec<serde_json::Value> {
        let buf = self.0.lock().unwrap();
        String::from_utf8_lossy(&buf)
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }
}

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// A server listening on an ephemeral loopback port, stopped on demand.
pub struct RunningServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    stop: Option<oneshot::Sender<()>>,
    handle: JoinHandle<DrainOutcome>,
}

impl RunningServer {
    pub async fn start(router: Router, grace_period: Duration) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = HttpServer::from_router(router, grace_period);
        let shutdown = server.shutdown();
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(server.run(listener, async move {
            let _ = stop_rx.await;
        }));

        Self {
            addr,
            shutdown,
            stop: Some(stop_tx),
            handle,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Fire the stop condition.
    pub fn stop(&mut self) {
        if let Some(tx) = self.stop.take() {
            let _ = tx.send(());
        }
    }

    /// Wait for the drain to finish.
    pub async fn join(self) -> DrainOutcome {
        self.handle.await.unwrap()
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// A unique, not yet created directory under the system temp dir.
pub fn scratch_dir(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    std::env::temp_dir().join(format!(
        "hello-service-{name}-{}-{nanos}",
        std::process::id()
    ))
}
