//! Adafruit IO REST Client
//!
//! HTTP client for reading the data points of a single Adafruit IO feed.

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;

use super::types::RawRecord;
use super::FeedSource;

/// Adafruit IO feed client
pub struct FeedClient {
    client: Client,
    config: FeedClientConfig,
}

/// Configuration for the feed client
#[derive(Debug, Clone)]
pub struct FeedClientConfig {
    /// Base URL of the REST API (e.g., "https://io.adafruit.com/api/v2")
    pub base_url: String,
    /// Adafruit IO account name
    pub username: String,
    /// Key of the temperature feed
    pub feed_key: String,
    /// Optional AIO key, sent as `X-AIO-Key` (private feeds only)
    pub api_key: Option<String>,
    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
}

impl Default for FeedClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://io.adafruit.com/api/v2".to_string(),
            username: String::new(),
            feed_key: String::new(),
            api_key: None,
            request_timeout_ms: 10_000,
        }
    }
}

impl FeedClientConfig {
    /// URL of the feed's data endpoint.
    ///
    /// Username and feed key are not validated; empty values give a URL
    /// the server rejects, which surfaces as a fetch failure.
    pub fn data_url(&self) -> String {
        format!(
            "{}/{}/feeds/{}/data",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(&self.username),
            urlencoding::encode(&self.feed_key)
        )
    }

    /// Whether both identifiers needed to build a usable URL are present
    pub fn is_complete(&self) -> bool {
        !self.username.is_empty() && !self.feed_key.is_empty()
    }
}

impl FeedClient {
    /// Create a new feed client with the given configuration
    pub fn new(config: FeedClientConfig) -> Result<Self, FeedError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_millis(config.request_timeout_ms))
            .user_agent(concat!("tempbox/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, config })
    }

    /// Get the current configuration
    pub fn config(&self) -> &FeedClientConfig {
        &self.config
    }

    /// Fetch the newest `limit` records (all the API returns when `None`).
    ///
    /// Records come back newest first.
    pub async fn fetch_readings(&self, limit: Option<u32>) -> Result<Vec<RawRecord>, FeedError> {
        let url = self.config.data_url();

        let mut request = self.client.get(&url);
        if let Some(limit) = limit {
            request = request.query(&[("limit", limit)]);
        }
        if let Some(key) = &self.config.api_key {
            request = request.header("X-AIO-Key", key);
        }

        tracing::debug!(url = %url, ?limit, "Fetching feed data");

        let response = request.send().await.map_err(FeedError::from_transport)?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(FeedError::Status {
                status: status.as_u16(),
                message: text,
            });
        }

        let bytes = response.bytes().await.map_err(FeedError::from_transport)?;
        let records: Vec<RawRecord> =
            serde_json::from_slice(&bytes).map_err(|e| FeedError::Decode(e.to_string()))?;

        tracing::debug!(records = records.len(), "Feed data received");
        Ok(records)
    }
}

#[async_trait]
impl FeedSource for FeedClient {
    fn name(&self) -> &str {
        &self.config.feed_key
    }

    async fn fetch_readings(&self, limit: Option<u32>) -> Result<Vec<RawRecord>, FeedError> {
        FeedClient::fetch_readings(self, limit).await
    }
}

// ============================================
// Errors
// ============================================

/// Errors that can occur when reading the feed
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Feed unavailable")]
    Unavailable,

    #[error("Request timeout")]
    Timeout,

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Feed returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Unexpected feed payload: {0}")]
    Decode(String),
}

impl FeedError {
    fn from_transport(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FeedError::Timeout
        } else if e.is_connect() {
            FeedError::Unavailable
        } else {
            FeedError::Request(e)
        }
    }

    /// Transport failures and non-success statuses
    pub fn is_network(&self) -> bool {
        !matches!(self, FeedError::Decode(_))
    }
}
