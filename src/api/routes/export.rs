//! Export Routes
//!
//! - GET /api/v1/export - Download the history as `temperature_data.csv`

use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::api::dto::ExportParams;
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::export::{export_csv, parse_range, ExportError, EXPORT_CONTENT_TYPE, EXPORT_FILENAME};

/// GET /api/v1/export?start=&end=
///
/// Exports the history of the latest successful poll. A failed poll after
/// a successful one leaves nothing to export until the feed recovers.
pub async fn export_data(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ExportParams>,
) -> ApiResult<Response> {
    let labels = state.policy.labels();

    let snapshot = state
        .store
        .current()
        .snapshot()
        .cloned()
        .ok_or_else(|| ApiError::NotReady(labels.nothing_to_export.to_string()))?;

    let range = parse_range(
        params.start.as_deref(),
        params.end.as_deref(),
        state.policy.zone,
    )?;

    let body = export_csv(&snapshot.history, &range, state.policy.zone).map_err(|e| match e {
        ExportError::EmptyExport => ApiError::EmptyExport(labels.empty_export.to_string()),
        other => other.into(),
    })?;

    tracing::info!(
        start = ?range.start,
        end = ?range.end,
        bytes = body.len(),
        "CSV export served"
    );

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, EXPORT_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", EXPORT_FILENAME),
            ),
        ],
        Body::from(body),
    )
        .into_response())
}
