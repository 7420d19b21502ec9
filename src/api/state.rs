//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use std::sync::Arc;
use std::time::Instant;

use crate::poller::FeedStore;
use crate::views::{FormatPolicy, GaugeSpec};

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Feed state written by the poller
    pub store: Arc<FeedStore>,
    /// Language, unit and zone for every response
    pub policy: FormatPolicy,
    /// Gauge dial geometry
    pub gauge: GaugeSpec,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    pub fn new(store: Arc<FeedStore>, policy: FormatPolicy, gauge: GaugeSpec) -> Self {
        Self {
            store,
            policy,
            gauge,
            start_time: Instant::now(),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
