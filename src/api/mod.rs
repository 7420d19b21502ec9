//! Tempbox REST API
//!
//! HTTP surface over the feed state, built with Axum. Every handler reads
//! the [`FeedStore`](crate::poller::FeedStore); none of them fetch.
//!
//! # Endpoints
//!
//! ## Dashboard
//! - `GET /api/v1/dashboard` - Loading, error or ready view
//! - `GET /api/v1/gauge` - Latest reading
//! - `GET /api/v1/chart` - History series
//!
//! ## Export
//! - `GET /api/v1/export?start=&end=` - CSV download
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health` - Poller status

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

use axum::{routing::get, Router};
use std::future::Future;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/dashboard", get(routes::dashboard::dashboard))
        .route("/gauge", get(routes::dashboard::gauge))
        .route("/chart", get(routes::dashboard::chart))
        .route("/export", get(routes::export::export_data));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/", get(routes::health::full_health));

    let shared_state = Arc::new(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .nest("/health", health_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(shared_state)
}

/// Start the API server and run until Ctrl-C or SIGTERM
pub async fn serve(state: AppState, addr: &str) -> Result<(), ApiError> {
    serve_until(state, addr, shutdown_signal()).await
}

/// Start the API server and run until `shutdown` resolves
pub async fn serve_until<F>(state: AppState, addr: &str, shutdown: F) -> Result<(), ApiError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Tempbox API listening on {}", listener.local_addr()?);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Tempbox API shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
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
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
