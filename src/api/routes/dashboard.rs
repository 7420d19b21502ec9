//! Dashboard Routes
//!
//! - GET /api/v1/dashboard - Whole dashboard for the current state
//! - GET /api/v1/gauge - Latest reading on the dial
//! - GET /api/v1/chart - History as a line series

use axum::{extract::State, Json};
use std::sync::Arc;

use super::ready_snapshot;
use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::views::{ChartView, DashboardView, GaugeView};

/// GET /api/v1/dashboard
///
/// Always 200; loading and error states are part of the body.
pub async fn dashboard(State(state): State<Arc<AppState>>) -> Json<DashboardView> {
    let current = state.store.current();
    Json(DashboardView::from_state(&current, &state.policy, &state.gauge))
}

/// GET /api/v1/gauge
pub async fn gauge(State(state): State<Arc<AppState>>) -> ApiResult<Json<GaugeView>> {
    let snapshot = ready_snapshot(&state)?;
    Ok(Json(GaugeView::from_snapshot(
        &snapshot,
        &state.policy,
        &state.gauge,
    )))
}

/// GET /api/v1/chart
pub async fn chart(State(state): State<Arc<AppState>>) -> ApiResult<Json<ChartView>> {
    let snapshot = ready_snapshot(&state)?;
    Ok(Json(ChartView::from_snapshot(&snapshot, &state.policy)))
}
