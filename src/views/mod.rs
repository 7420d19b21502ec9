//! Dashboard Views
//!
//! Presentation models derived purely from the feed state. Widgets (gauge,
//! line chart) bind to these; nothing here talks to the network.
//!
//! - **format**: language, unit and zone policy
//! - **gauge**: latest reading on a dial
//! - **chart**: history as a line series

pub mod chart;
pub mod format;
pub mod gauge;

pub use chart::ChartView;
pub use format::{FormatPolicy, Labels, Language, TemperatureUnit};
pub use gauge::{GaugeSpec, GaugeView};

use serde::Serialize;

use crate::poller::{FailureKind, FeedState};

/// The whole dashboard for one state
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DashboardView {
    Loading {
        title: String,
        message: String,
    },
    Ready {
        gauge: GaugeView,
        chart: ChartView,
        /// Records dropped as malformed
        rejected: usize,
    },
    Error {
        title: String,
        kind: FailureKind,
        message: String,
    },
}

impl DashboardView {
    pub fn from_state(state: &FeedState, policy: &FormatPolicy, spec: &GaugeSpec) -> Self {
        let labels = policy.labels();
        match state {
            FeedState::Loading => DashboardView::Loading {
                title: labels.title.to_string(),
                message: labels.loading.to_string(),
            },
            FeedState::Ready(snapshot) => DashboardView::Ready {
                gauge: GaugeView::from_snapshot(snapshot, policy, spec),
                chart: ChartView::from_snapshot(snapshot, policy),
                rejected: snapshot.rejected.len(),
            },
            FeedState::Error(failure) => DashboardView::Error {
                title: labels.title.to_string(),
                kind: failure.kind,
                message: failure.message.clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::DisplayZone;
    use crate::poller::FeedFailure;

    #[test]
    fn test_loading_view() {
        let policy = FormatPolicy::new(Language::En, TemperatureUnit::Celsius, DisplayZone::utc());
        let view = DashboardView::from_state(&FeedState::Loading, &policy, &GaugeSpec::default());

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["state"], "loading");
        assert_eq!(json["message"], "Loading...");
    }

    #[test]
    fn test_error_view() {
        let policy = FormatPolicy::default();
        let state = FeedState::Error(FeedFailure {
            kind: FailureKind::EmptyFeed,
            message: "No data found in the feed.".to_string(),
            detail: "No data found in the feed".to_string(),
        });

        let json = serde_json::to_value(DashboardView::from_state(
            &state,
            &policy,
            &GaugeSpec::default(),
        ))
        .unwrap();
        assert_eq!(json["state"], "error");
        assert_eq!(json["kind"], "empty_feed");
        assert_eq!(json["message"], "No data found in the feed.");
    }
}
