//! Feed Poller
//!
//! Fetches and normalizes the feed on a fixed period (gauge) or once
//! (chart/export), publishing every outcome into the [`FeedStore`].

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::oneshot;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::MissedTickBehavior;

use super::store::{FailureKind, FeedFailure, FeedStore, RequestToken};
use crate::feed::{FeedError, FeedSource};
use crate::history::{normalize, NormalizeError, Snapshot};
use crate::views::FormatPolicy;

/// How often to poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollMode {
    /// First attempt immediately, then every period. Attempts may overlap.
    Periodic(Duration),
    /// A single attempt
    OneShot,
}

/// Configuration for the poller
#[derive(Debug, Clone)]
pub struct PollerConfig {
    pub mode: PollMode,
    /// `?limit=` sent to the feed
    pub limit: Option<u32>,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            mode: PollMode::Periodic(Duration::from_secs(5)),
            limit: None,
        }
    }
}

/// Why an attempt failed
#[derive(Error, Debug)]
pub enum PollError {
    #[error(transparent)]
    Feed(#[from] FeedError),

    #[error(transparent)]
    Normalize(#[from] NormalizeError),
}

impl PollError {
    pub fn kind(&self) -> FailureKind {
        match self {
            PollError::Feed(FeedError::Decode(_)) => FailureKind::Decode,
            PollError::Feed(_) => FailureKind::Network,
            PollError::Normalize(NormalizeError::EmptyFeed) => FailureKind::EmptyFeed,
            PollError::Normalize(_) => FailureKind::Parse,
        }
    }
}

/// Periodic or one-shot feed poller
#[derive(Clone)]
pub struct Poller {
    source: Arc<dyn FeedSource>,
    store: Arc<FeedStore>,
    config: PollerConfig,
    policy: FormatPolicy,
}

impl Poller {
    pub fn new(
        source: Arc<dyn FeedSource>,
        store: Arc<FeedStore>,
        config: PollerConfig,
        policy: FormatPolicy,
    ) -> Self {
        Self {
            source,
            store,
            config,
            policy,
        }
    }

    pub fn store(&self) -> &Arc<FeedStore> {
        &self.store
    }

    /// Run one attempt to completion.
    ///
    /// Returns whether its outcome was applied (false if a newer attempt
    /// was issued while this one was in flight).
    pub async fn poll_once(&self) -> bool {
        let token = self.store.issue();
        self.attempt(token).await
    }

    async fn attempt(&self, token: RequestToken) -> bool {
        tracing::debug!(token = token.value(), source = self.source.name(), "Polling feed");

        let outcome = self.fetch().await.map_err(|e| {
            tracing::warn!(token = token.value(), error = %e, "Feed poll failed");
            let kind = e.kind();
            FeedFailure {
                kind,
                message: self.policy.failure_message(kind).to_string(),
                detail: e.to_string(),
            }
        });

        if let Ok(snapshot) = &outcome {
            tracing::debug!(
                token = token.value(),
                readings = snapshot.len(),
                rejected = snapshot.rejected.len(),
                latest = snapshot.latest.value,
                "Feed poll succeeded"
            );
        }

        let applied = self.store.apply(token, outcome);
        if !applied {
            tracing::debug!(token = token.value(), "Discarding stale poll result");
        }
        applied
    }

    async fn fetch(&self) -> Result<Snapshot, PollError> {
        let raw = self.source.fetch_readings(self.config.limit).await?;
        Ok(normalize(raw)?)
    }

    /// Start polling in the background
    pub fn start(self) -> PollerHandle {
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(self.run(shutdown_rx));

        PollerHandle {
            shutdown: Some(shutdown_tx),
            task: Some(task),
        }
    }

    async fn run(self, mut shutdown: oneshot::Receiver<()>) {
        let period = match self.config.mode {
            PollMode::OneShot => {
                tokio::select! {
                    _ = self.poll_once() => {}
                    _ = &mut shutdown => {}
                }
                return;
            }
            PollMode::Periodic(period) => period.max(Duration::from_millis(1)),
        };

        tracing::info!(period_ms = period.as_millis() as u64, source = self.source.name(), "Poller started");

        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        // Attempts live here so stopping the loop aborts them too
        let mut in_flight = JoinSet::new();

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = interval.tick() => {
                    let token = self.store.issue();
                    let poller = self.clone();
                    in_flight.spawn(async move { poller.attempt(token).await });
                }
                Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                    if let Err(e) = joined {
                        if e.is_panic() {
                            tracing::error!(error = %e, "Poll attempt panicked");
                        }
                    }
                }
            }
        }

        in_flight.abort_all();
        tracing::info!("Poller stopped");
    }
}

/// Owner of a running poller
///
/// Dropping the handle aborts the poller and any request it has in flight.
pub struct PollerHandle {
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl PollerHandle {
    /// Stop polling and wait for the task to exit
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }

    /// Wait for a one-shot poller to finish its attempt
    pub async fn finished(mut self) {
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, |t| t.is_finished())
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::RawRecord;
    use crate::poller::FeedState;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tokio::sync::Notify;

    type Reply = Result<Vec<RawRecord>, FeedError>;

    /// Source that replays scripted replies, then repeats a default one
    struct ScriptedSource {
        replies: Mutex<VecDeque<Reply>>,
        calls: AtomicUsize,
        /// When set, the first call waits for this before answering
        gate: Option<Arc<Notify>>,
    }

    impl ScriptedSource {
        fn new(replies: Vec<Reply>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                calls: AtomicUsize::new(0),
                gate: None,
            }
        }

        fn gated(replies: Vec<Reply>, gate: Arc<Notify>) -> Self {
            Self {
                gate: Some(gate),
                ..Self::new(replies)
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl FeedSource for ScriptedSource {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn fetch_readings(&self, _limit: Option<u32>) -> Reply {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            let reply = self
                .replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(feed("20.0")));

            if call == 0 {
                if let Some(gate) = &self.gate {
                    gate.notified().await;
                }
            }
            reply
        }
    }

    fn feed(latest: &str) -> Vec<RawRecord> {
        vec![
            RawRecord::new(latest, "2024-01-01T10:00:00Z"),
            RawRecord::new("22.1", "2024-01-01T09:00:00Z"),
        ]
    }

    fn poller(source: Arc<ScriptedSource>, mode: PollMode) -> Poller {
        Poller::new(
            source,
            Arc::new(FeedStore::new()),
            PollerConfig { mode, limit: None },
            FormatPolicy::default(),
        )
    }

    fn latest(state: &FeedState) -> Option<f64> {
        state.snapshot().map(|s| s.latest.value)
    }

    #[tokio::test]
    async fn test_poll_once_ready() {
        let source = Arc::new(ScriptedSource::new(vec![Ok(feed("23.4"))]));
        let poller = poller(source, PollMode::OneShot);

        assert!(poller.store().current().is_loading());
        assert!(poller.poll_once().await);

        let state = poller.store().current();
        assert_eq!(latest(&state), Some(23.4));
        assert_eq!(state.snapshot().unwrap().history.len(), 2);
    }

    #[tokio::test]
    async fn test_alternating_outcomes() {
        let source = Arc::new(ScriptedSource::new(vec![
            Ok(feed("23.4")),
            Err(FeedError::Unavailable),
            Ok(feed("24.5")),
        ]));
        let poller = poller(source, PollMode::OneShot);

        poller.poll_once().await;
        assert_eq!(poller.store().current().label(), "ready");

        poller.poll_once().await;
        match poller.store().current() {
            FeedState::Error(failure) => {
                assert_eq!(failure.kind, FailureKind::Network);
                assert_eq!(failure.message, "Failed to fetch data from Adafruit IO.");
                assert_eq!(failure.detail, "Feed unavailable");
            }
            other => panic!("expected error, got {:?}", other),
        }

        poller.poll_once().await;
        assert_eq!(latest(&poller.store().current()), Some(24.5));
    }

    #[tokio::test]
    async fn test_empty_feed_is_error_not_loading() {
        let source = Arc::new(ScriptedSource::new(vec![Ok(Vec::new())]));
        let poller = poller(source, PollMode::OneShot);

        poller.poll_once().await;

        match poller.store().current() {
            FeedState::Error(failure) => {
                assert_eq!(failure.kind, FailureKind::EmptyFeed);
                assert_eq!(failure.message, "No data found in the feed.");
            }
            other => panic!("expected error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_feed_is_parse_failure() {
        let source = Arc::new(ScriptedSource::new(vec![Ok(vec![RawRecord::new(
            "n/a",
            "2024-01-01T10:00:00Z",
        )])]));
        let poller = poller(source, PollMode::OneShot);

        poller.poll_once().await;

        assert!(
            matches!(poller.store().current(), FeedState::Error(f) if f.kind == FailureKind::Parse)
        );
    }

    #[tokio::test]
    async fn test_slow_response_does_not_overwrite_newer() {
        let gate = Arc::new(Notify::new());
        let source = Arc::new(ScriptedSource::gated(
            vec![Ok(feed("19.0")), Ok(feed("25.0"))],
            Arc::clone(&gate),
        ));
        let poller = poller(Arc::clone(&source), PollMode::OneShot);

        // First attempt blocks inside the source
        let slow = {
            let poller = poller.clone();
            tokio::spawn(async move { poller.poll_once().await })
        };
        while source.calls() == 0 {
            tokio::task::yield_now().await;
        }

        // Second attempt completes first
        assert!(poller.poll_once().await);
        assert_eq!(latest(&poller.store().current()), Some(25.0));

        gate.notify_one();
        assert!(!slow.await.unwrap());

        assert_eq!(latest(&poller.store().current()), Some(25.0));
        assert_eq!(poller.store().status().discarded, 1);
    }

    #[tokio::test]
    async fn test_one_shot_runs_once() {
        let source = Arc::new(ScriptedSource::new(vec![Ok(feed("23.4"))]));
        let poller = poller(Arc::clone(&source), PollMode::OneShot);
        let store = Arc::clone(poller.store());

        poller.start().finished().await;

        assert_eq!(source.calls(), 1);
        assert_eq!(latest(&store.current()), Some(23.4));
    }

    #[tokio::test]
    async fn test_periodic_polls_until_stopped() {
        let source = Arc::new(ScriptedSource::new(vec![
            Ok(feed("23.4")),
            Err(FeedError::Timeout),
        ]));
        let poller = poller(
            Arc::clone(&source),
            PollMode::Periodic(Duration::from_millis(50)),
        );
        let mut watcher = poller.store().subscribe();
        let handle = poller.start();

        let first = tokio::time::timeout(Duration::from_secs(2), watcher.changed())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(latest(&first), Some(23.4));

        let second = tokio::time::timeout(Duration::from_secs(2), watcher.changed())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(second.label(), "error");

        handle.stop().await;

        let calls = source.calls();
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(source.calls(), calls);
    }

    #[tokio::test]
    async fn test_drop_cancels_in_flight_request() {
        let gate = Arc::new(Notify::new());
        let source = Arc::new(ScriptedSource::gated(vec![Ok(feed("23.4"))], gate));
        let poller = poller(
            Arc::clone(&source),
            PollMode::Periodic(Duration::from_secs(60)),
        );
        let store = Arc::clone(poller.store());

        let handle = poller.start();
        while source.calls() == 0 {
            tokio::task::yield_now().await;
        }
        drop(handle);

        // Give the runtime a moment to tear the tasks down
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert!(store.current().is_loading());
        // Only the test's reference remains once the poller is gone
        assert_eq!(Arc::strong_count(&source), 1);
    }
}
