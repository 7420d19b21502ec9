//! Feed normalization
//!
//! Turns raw feed records (newest first, values as text) into a typed
//! history in chart order. Malformed records are dropped from the history
//! and reported on the snapshot instead of poisoning it with NaN values.

use chrono::{DateTime, Utc};

use super::error::{NormalizeError, NormalizeResult};
use super::types::{Reading, Rejected, Snapshot};
use crate::feed::RawRecord;

/// Parse a single record
pub fn parse_record(record: &RawRecord) -> NormalizeResult<Reading> {
    let value_str = record.value.trim();
    let value = value_str
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| NormalizeError::InvalidValue(record.value.clone()))?;

    let timestamp = DateTime::parse_from_rfc3339(record.created_at.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| NormalizeError::InvalidTimestamp {
            value: record.created_at.clone(),
            reason: e.to_string(),
        })?;

    Ok(Reading::new(timestamp, value))
}

/// Normalize a feed response
///
/// `raw` is in API order (newest first). The returned history is oldest
/// first. An empty response is [`NormalizeError::EmptyFeed`]; a response
/// with no parseable record fails with the first record's parse error.
pub fn normalize(raw: Vec<RawRecord>) -> NormalizeResult<Snapshot> {
    if raw.is_empty() {
        return Err(NormalizeError::EmptyFeed);
    }

    let mut history = Vec::with_capacity(raw.len());
    let mut rejected = Vec::new();
    let mut first_error = None;

    for (index, record) in raw.iter().enumerate() {
        match parse_record(record) {
            Ok(reading) => history.push(reading),
            Err(e) => {
                tracing::warn!(index, value = %record.value, created_at = %record.created_at, error = %e, "Dropping malformed feed record");
                rejected.push(Rejected {
                    index,
                    record: record.clone(),
                    reason: e.to_string(),
                });
                first_error.get_or_insert(e);
            }
        }
    }

    // API order is newest first; reverse, then a stable sort in case the
    // feed misorders anything.
    history.reverse();
    history.sort_by_key(|r| r.timestamp);

    let latest = match history.last() {
        Some(latest) => *latest,
        None => return Err(first_error.unwrap_or(NormalizeError::EmptyFeed)),
    };

    Ok(Snapshot {
        history,
        latest,
        raw,
        rejected,
        fetched_at: Utc::now(),
    })
}
