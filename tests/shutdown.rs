//! Graceful shutdown against a real listener.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::routing::get;
use hello_service::lifecycle::{DrainOutcome, Phase};
use tokio::net::TcpStream;
use tokio::sync::Notify;

mod common;

use common::RunningServer;

const GRACE: Duration = Duration::from_secs(5);

/// Router with a `/slow` route that signals `entered` and then sleeps.
fn slow_app(entered: Arc<Notify>, delay: Duration) -> axum::Router {
    let registry = common::registry();
    common::app_with(&registry, move |r| {
        r.route(
            "/slow",
            get(move || {
                let entered = entered.clone();
                async move {
                    entered.notify_one();
                    tokio::time::sleep(delay).await;
                    "done"
                }
            }),
        )
    })
}

#[tokio::test]
async fn idle_server_stops_well_within_grace_period() {
    let registry = common::registry();
    let mut server = RunningServer::start(common::app_with(&registry, |r| r), GRACE).await;
    let shutdown = server.shutdown.clone();
    let addr = server.addr;
    assert_eq!(shutdown.phase(), Phase::Running);

    let response = common::client().get(server.url("/")).send().await.unwrap();
    assert_eq!(response.text().await.unwrap(), "Hello World!");

    let started = Instant::now();
    server.stop();
    let outcome = server.join().await;

    assert_eq!(outcome, DrainOutcome::Clean);
    assert!(started.elapsed() < Duration::from_secs(1));
    assert_eq!(shutdown.phase(), Phase::Stopped);
    assert!(TcpStream::connect(addr).await.is_err(), "listener should be closed");
}

#[tokio::test]
async fn in_flight_request_completes_before_exit() {
    let entered = Arc::new(Notify::new());
    let mut server =
        RunningServer::start(slow_app(entered.clone(), Duration::from_millis(300)), GRACE).await;

    let request = tokio::spawn(common::client().get(server.url("/slow")).send());
    entered.notified().await;

    server.stop();
    let outcome = server.join().await;
    assert_eq!(outcome, DrainOutcome::Clean);

    let response = request.await.unwrap().unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "done");
}

#[tokio::test]
async fn slow_request_is_abandoned_after_grace_period() {
    let entered = Arc::new(Notify::new());
    let mut server = RunningServer::start(
        slow_app(entered.clone(), Duration::from_secs(30)),
        Duration::from_millis(100),
    )
    .await;
    let shutdown = server.shutdown.clone();

    let request = tokio::spawn(common::client().get(server.url("/slow")).send());
    entered.notified().await;

    let started = Instant::now();
    server.stop();
    let outcome = server.join().await;

    assert_eq!(outcome, DrainOutcome::TimedOut);
    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(shutdown.phase(), Phase::Stopped);
    request.abort();
}

#[tokio::test]
async fn phases_are_observable_in_order() {
    let registry = common::registry();
    let mut server = RunningServer::start(common::app_with(&registry, |r| r), GRACE).await;
    let mut phases = server.shutdown.subscribe();

    server.stop();
    phases
        .wait_for(|phase| *phase != Phase::Running)
        .await
        .unwrap();
    server.join().await;

    assert_eq!(*phases.borrow_and_update(), Phase::Stopped);
}
