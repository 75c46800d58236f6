use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use axum::{Router, routing::get_service};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::{
    AggregatorConfig, WeatherAggregator,
    api::{self, AppState},
    provider,
};

/// Home page, its assets and the weather endpoint.
pub fn app(state: AppState, static_dir: impl AsRef<Path>) -> Router {
    let static_dir = static_dir.as_ref();
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get_service(ServeFile::new(static_dir.join("index.html"))))
        .nest_service("/static", ServeDir::new(static_dir))
        .merge(api::router())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

pub async fn run(config: &AggregatorConfig) -> Result<()> {
    let http = provider::build_http_client(&config.http)?;
    let aggregator = WeatherAggregator::from_config(config, http)?;
    let app = app(AppState::new(aggregator), &config.server.static_dir);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Web server running at http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Web server stopped unexpectedly")?;

    tracing::info!("Web server stopped");
    Ok(())
}

/// Resolve when `signal` fires. A listener that fails never resolves, so
/// the server keeps running instead of shutting down.
async fn wait_for(signal: impl Future<Output = io::Result<()>>, name: &str) {
    if let Err(e) = signal.await {
        tracing::error!("Failed to listen for {}: {}", name, e);
        std::future::pending::<()>().await;
    }
}

async fn shutdown_signal() {
    let ctrl_c = wait_for(tokio::signal::ctrl_c(), "Ctrl-C");

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl-C, shutting down...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        },
    }
}
