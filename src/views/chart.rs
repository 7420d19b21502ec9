//! Chart view: the history as a single line series, oldest first

use serde::Serialize;

use super::format::FormatPolicy;
use crate::history::Snapshot;

/// Labels and points for a line chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartView {
    pub title: String,
    pub series: String,
    /// Axis labels, one per point
    pub labels: Vec<String>,
    /// Values in the display unit
    pub points: Vec<f64>,
    /// Raw timestamps (ms since epoch), for pan/zoom widgets
    pub timestamps: Vec<i64>,
}

impl ChartView {
    pub fn from_snapshot(snapshot: &Snapshot, policy: &FormatPolicy) -> Self {
        let history = &snapshot.history;

        Self {
            title: policy.labels().title.to_string(),
            series: policy.series_label(),
            labels: history
                .iter()
                .map(|r| policy.chart_label(r.timestamp))
                .collect(),
            points: history
                .iter()
                .map(|r| policy.unit.from_celsius(r.value))
                .collect(),
            timestamps: history
                .iter()
                .map(|r| r.timestamp.timestamp_millis())
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
