//! Health Routes
//!
//! - GET /health/live - Liveness probe (process is alive)
//! - GET /health - Poller status and uptime

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::api::dto::HealthResponse;
use crate::api::state::AppState;
use crate::poller::FeedState;

/// GET /health/live
///
/// Returns 200 if the process is alive, no dependency checks.
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// GET /health
pub async fn full_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let status = state.store.status();

    let (overall, last_error, readings) = match &status.state {
        FeedState::Loading => ("starting", None, 0),
        FeedState::Ready(snapshot) => ("healthy", None, snapshot.len()),
        FeedState::Error(failure) => ("degraded", Some(failure.detail.clone()), 0),
    };

    Json(HealthResponse {
        status: overall.to_string(),
        feed: status.state.label().to_string(),
        last_error,
        readings,
        updated_at: status.updated_at,
        polls_succeeded: status.successes,
        polls_failed: status.failures,
        polls_discarded: status.discarded,
        uptime_seconds: state.uptime_seconds(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
