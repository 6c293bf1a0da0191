//! End-to-end tests against a live axum server.

use std::net::SocketAddr;

use axum::routing::get;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use correlation::{Correlation, CorrelationId, Options, DEFAULT_HEADER};

async fn start_test_server(correlation: Correlation) -> (SocketAddr, tokio::sync::oneshot::Sender<()>) {
    let router = Router::new()
        .route("/foo", get(|| async { "bar" }))
        .route("/whoami", get(|id: CorrelationId| async move { id.to_string() }))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(correlation.layer()),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
            .unwrap();
    });

    (addr, shutdown_tx)
}

#[tokio::test]
async fn get_foo_gets_a_correlation_id() {
    let (addr, shutdown) = start_test_server(Correlation::default()).await;

    let resp = reqwest::get(format!("http://{addr}/foo")).await.unwrap();
    assert_eq!(resp.status(), 200);
    let id = resp
        .headers()
        .get(DEFAULT_HEADER)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(uuid::Uuid::parse_str(&id).is_ok());
    assert_eq!(resp.text().await.unwrap(), "bar");

    let _ = shutdown.send(());
}

#[tokio::test]
async fn preset_id_survives_the_round_trip() {
    let (addr, shutdown) = start_test_server(Correlation::default()).await;
    let existing = uuid::Uuid::new_v4().to_string();

    let resp = reqwest::Client::new()
        .get(format!("http://{addr}/whoami"))
        .header(DEFAULT_HEADER, &existing)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.headers().get(DEFAULT_HEADER).unwrap(), existing.as_str());
    assert_eq!(resp.text().await.unwrap(), existing);

    let _ = shutdown.send(());
}

#[tokio::test]
async fn handler_sees_the_same_id_as_the_client() {
    let (addr, shutdown) = start_test_server(Correlation::new(Options::default())).await;

    let resp = reqwest::get(format!("http://{addr}/whoami")).await.unwrap();
    let header = resp.headers().get(DEFAULT_HEADER).unwrap().to_str().unwrap().to_string();
    assert_eq!(resp.text().await.unwrap(), header);

    let _ = shutdown.send(());
}
