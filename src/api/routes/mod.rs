//! API Routes
//!
//! Route handlers organized by functionality.

pub mod dashboard;
pub mod export;
pub mod health;

use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::history::Snapshot;
use crate::poller::FeedState;

/// Snapshot of the latest successful poll, or the error the client should see
pub(crate) fn ready_snapshot(state: &AppState) -> ApiResult<Arc<Snapshot>> {
    match state.store.current() {
        FeedState::Ready(snapshot) => Ok(snapshot),
        FeedState::Loading => Err(ApiError::NotReady(
            state.policy.labels().loading.to_string(),
        )),
        FeedState::Error(failure) => Err(ApiError::Feed {
            kind: failure.kind,
            message: failure.message,
        }),
    }
}
