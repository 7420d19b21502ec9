//! Core data types for temperature history
//!
//! - `Reading`: one parsed measurement
//! - `DateRange`: inclusive, optionally open-ended time window
//! - `Snapshot`: everything one successful poll produced

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::feed::RawRecord;

/// A single temperature measurement
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Reading {
    /// When the feed recorded the value
    pub timestamp: DateTime<Utc>,
    /// Finite value in feed units
    pub value: f64,
}

impl Reading {
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// Time window for filtering (closed interval: [start, end])
///
/// A missing bound leaves that side unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    /// Start timestamp (inclusive)
    pub start: Option<DateTime<Utc>>,
    /// End timestamp (inclusive)
    pub end: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn new(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        Self { start, end }
    }

    /// Range with neither bound set
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Check if a timestamp falls within this range
    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        self.start.map_or(true, |start| timestamp >= start)
            && self.end.map_or(true, |end| timestamp <= end)
    }

    /// Readings of `history` that fall inside the range, order preserved
    pub fn filter<'a>(&self, history: &'a [Reading]) -> Vec<&'a Reading> {
        history
            .iter()
            .filter(|reading| self.contains(reading.timestamp))
            .collect()
    }
}

/// A raw record the normalizer could not turn into a reading
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rejected {
    /// Position in the feed response (newest first)
    pub index: usize,
    /// The record as received
    pub record: RawRecord,
    /// Why it was rejected
    pub reason: String,
}

/// Result of normalizing one feed response
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Valid readings, oldest first
    pub history: Vec<Reading>,
    /// Newest valid reading
    pub latest: Reading,
    /// Records as the feed returned them, malformed ones included
    pub raw: Vec<RawRecord>,
    /// Records dropped from `history`
    pub rejected: Vec<Rejected>,
    /// When the feed response was normalized
    pub fetched_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}
