//! Demo HTTP server with the correlation middleware installed.
//!
//! ```text
//! cargo run --example server
//! curl -i localhost:3000/foo
//! curl -i -H 'X-Correlation-ID: abc' localhost:3000/whoami
//! ```
//!
//! Options come from `CORRELATION_CONFIG`, an auto-detected
//! `correlation.{yaml,yml,json,toml}` file, or the defaults, followed by the
//! `CORRELATION_*` environment overrides. `LOG_LEVEL`, `PORT` and `--pretty`
//! / `--json` control the rest.

use std::net::SocketAddr;
use std::path::PathBuf;

use axum::routing::get;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use correlation::{config, logging, Correlation, CorrelationError, CorrelationId};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CorrelationError> {
    let args: Vec<String> = std::env::args().collect();
    let format = logging::resolve_format(
        args.iter().any(|a| a == "--pretty"),
        args.iter().any(|a| a == "--json"),
    );
    let level = std::env::var("LOG_LEVEL")
        .ok()
        .and_then(|l| l.parse().ok())
        .unwrap_or(tracing::Level::INFO);
    logging::init(level, format);

    let explicit = std::env::var_os("CORRELATION_CONFIG").map(PathBuf::from);
    let options = config::discover(explicit.as_deref()).await?;
    let correlation = Correlation::new(options);

    let router = Router::new()
        .route("/foo", get(|| async { "bar" }))
        .route("/whoami", get(|id: CorrelationId| async move { id.to_string() }))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(correlation.layer()),
        );

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000u16);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(
        addr = %addr,
        header = %correlation.header_name(),
        "demo server started"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("demo server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received Ctrl+C"),
        () = terminate => tracing::info!("received SIGTERM"),
    }
}
