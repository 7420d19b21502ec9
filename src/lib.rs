//! # Tempbox
//!
//! Temperature dashboard backed by an Adafruit IO feed: polls the feed,
//! normalizes the readings into a time-ordered history, and serves a gauge,
//! a line chart and a date-filtered CSV export.
//!
//! ## Modules
//!
//! - [`feed`]: Adafruit IO REST client
//! - [`history`]: Raw records to ordered readings
//! - [`poller`]: Periodic and one-shot polling into a single state owner
//! - [`views`]: Gauge, chart and dashboard models plus formatting policy
//! - [`export`]: CSV export with date-range filtering
//! - [`api`]: REST API server with Axum
//! - [`config`]: TOML configuration with environment overrides
//! - [`logging`]: Tracing subscriber setup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tempbox::feed::{FeedClient, FeedClientConfig};
//! use tempbox::poller::{FeedStore, Poller, PollerConfig};
//! use tempbox::views::FormatPolicy;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = FeedClient::new(FeedClientConfig {
//!         username: "maker".to_string(),
//!         feed_key: "tank-temp".to_string(),
//!         ..Default::default()
//!     })?;
//!
//!     let store = Arc::new(FeedStore::new());
//!     let poller = Poller::new(
//!         Arc::new(client),
//!         Arc::clone(&store),
//!         PollerConfig::default(),
//!         FormatPolicy::default(),
//!     );
//!
//!     poller.poll_once().await;
//!     println!("{:?}", store.current().label());
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod export;
pub mod feed;
pub mod history;
pub mod logging;
pub mod poller;
pub mod views;

pub use config::Config;
pub use history::{DateRange, Reading, Snapshot};
pub use poller::{FeedState, FeedStore};
