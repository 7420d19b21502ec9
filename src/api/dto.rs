//! Data Transfer Objects
//!
//! Request and response types for the HTTP surface.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall status: healthy, starting, degraded
    pub status: String,
    /// Feed state: loading, ready, error
    pub feed: String,
    /// Underlying error of the latest failed poll
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    /// Readings in the current snapshot
    pub readings: usize,
    /// When the feed state last changed
    pub updated_at: Option<DateTime<Utc>>,
    pub polls_succeeded: u64,
    pub polls_failed: u64,
    /// Outcomes dropped because a newer poll had started
    pub polls_discarded: u64,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    /// Application version
    pub version: String,
}

/// Export query parameters
///
/// Both bounds are optional; empty strings count as missing.
#[derive(Debug, Default, Deserialize)]
pub struct ExportParams {
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
}
