//! Normalizer error types

use thiserror::Error;

/// Errors that can occur while turning feed records into history
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NormalizeError {
    /// The feed returned zero records
    #[error("No data found in the feed")]
    EmptyFeed,

    /// `value` is not a finite decimal number
    #[error("Invalid value: {0:?}")]
    InvalidValue(String),

    /// `created_at` is not an ISO-8601 timestamp
    #[error("Invalid timestamp {value:?}: {reason}")]
    InvalidTimestamp { value: String, reason: String },
}

impl NormalizeError {
    /// Malformed value or timestamp, as opposed to an empty feed
    pub fn is_parse(&self) -> bool {
        !matches!(self, NormalizeError::EmptyFeed)
    }
}

/// Result type alias for normalizer operations
pub type NormalizeResult<T> = Result<T, NormalizeError>;
