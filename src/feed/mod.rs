//! Feed Sources
//!
//! Where temperature readings come from:
//! - Adafruit IO REST API (`FeedClient`)
//!
//! The poller only sees the [`FeedSource`] trait.

mod client;
mod types;

pub use client::{FeedClient, FeedClientConfig, FeedError};
pub use types::RawRecord;

use async_trait::async_trait;

/// Common trait for anything that can produce raw feed records
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Fetch up to `limit` records, newest first
    async fn fetch_readings(&self, limit: Option<u32>) -> Result<Vec<RawRecord>, FeedError>;
}
