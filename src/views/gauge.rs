//! Gauge view: the latest reading on a segmented dial

use serde::Serialize;

use super::format::FormatPolicy;
use crate::history::Snapshot;

/// Dial geometry
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GaugeSpec {
    pub min: f64,
    pub max: f64,
    pub segments: u32,
}

impl Default for GaugeSpec {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: 50.0,
            segments: 5,
        }
    }
}

impl GaugeSpec {
    /// Zero-based segment the needle points into.
    ///
    /// Values outside the dial are pinned to the first or last segment.
    pub fn segment_of(&self, value: f64) -> u32 {
        let segments = self.segments.max(1);
        let span = self.max - self.min;
        if span <= 0.0 {
            return 0;
        }

        let fraction = ((value - self.min) / span).clamp(0.0, 1.0);
        ((fraction * segments as f64) as u32).min(segments - 1)
    }
}

/// Everything a gauge widget needs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GaugeView {
    pub title: String,
    pub caption: String,
    /// Display unit, rounded to two decimals
    pub value: f64,
    /// e.g. `23.40°C`
    pub display: String,
    pub unit: String,
    pub min: f64,
    pub max: f64,
    pub segments: u32,
    pub segment: u32,
}

impl GaugeView {
    pub fn from_snapshot(snapshot: &Snapshot, policy: &FormatPolicy, spec: &GaugeSpec) -> Self {
        let value = policy.display_value(snapshot.latest.value);
        let labels = policy.labels();

        Self {
            title: labels.title.to_string(),
            caption: labels.current_caption.to_string(),
            value,
            display: policy.format_value(snapshot.latest.value),
            unit: policy.unit.symbol().to_string(),
            min: spec.min,
            max: spec.max,
            segments: spec.segments,
            segment: spec.segment_of(value),
        }
    }

    /// One-line rendering for terminals
    pub fn line(&self) -> String {
        let filled = self.segment as usize + 1;
        let empty = (self.segments as usize).saturating_sub(filled);
        format!(
            "{} : {} [{}{}] ({}-{})",
            self.caption,
            self.display,
            "#".repeat(filled),
            "-".repeat(empty),
            self.min,
            self.max
        )
    }
}
