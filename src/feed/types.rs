//! Raw feed records
//!
//! Records exactly as the Adafruit IO data endpoint returns them.
//! Nothing here is parsed beyond JSON; the normalizer owns that.

use serde::{Deserialize, Deserializer, Serialize};

/// One entry of `GET /feeds/{key}/data`
///
/// Adafruit IO sends many more fields (`feed_id`, `lat`, `expiration`, ...).
/// Only the ones the dashboard reads are kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Adafruit IO data id
    #[serde(default)]
    pub id: Option<String>,
    /// Measured value, as text
    #[serde(deserialize_with = "string_or_number")]
    pub value: String,
    /// ISO-8601 creation time
    pub created_at: String,
}

impl RawRecord {
    pub fn new(value: impl Into<String>, created_at: impl Into<String>) -> Self {
        Self {
            id: None,
            value: value.into(),
            created_at: created_at.into(),
        }
    }
}

/// Feeds written by some firmware send bare numbers instead of strings.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Value {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Value::deserialize(deserializer)? {
        Value::Text(s) => s,
        Value::Number(n) => n.to_string(),
    })
}
