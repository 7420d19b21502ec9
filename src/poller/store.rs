//! Feed State Container
//!
//! The single owner of the dashboard's mutable state. Every change goes
//! through [`FeedStore::issue`] and [`FeedStore::apply`]; observers get a
//! [`StateWatcher`] and are woken only when an outcome is applied.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;

use crate::history::Snapshot;

/// What the dashboard currently shows
#[derive(Debug, Clone, PartialEq)]
pub enum FeedState {
    /// No attempt has completed yet
    Loading,
    /// The most recent applied attempt succeeded
    Ready(Arc<Snapshot>),
    /// The most recent applied attempt failed
    Error(FeedFailure),
}

impl FeedState {
    pub fn is_loading(&self) -> bool {
        matches!(self, FeedState::Loading)
    }

    pub fn snapshot(&self) -> Option<&Arc<Snapshot>> {
        match self {
            FeedState::Ready(snapshot) => Some(snapshot),
            _ => None,
        }
    }

    /// Short name for logs and JSON
    pub fn label(&self) -> &'static str {
        match self {
            FeedState::Loading => "loading",
            FeedState::Ready(_) => "ready",
            FeedState::Error(_) => "error",
        }
    }
}

/// Classification of a failed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Request failed, timed out, or got a non-success status
    Network,
    /// The feed answered with something that is not a record list
    Decode,
    /// The feed has no records
    EmptyFeed,
    /// No record had a parseable value and timestamp
    Parse,
}

/// A failed attempt, as presented to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedFailure {
    pub kind: FailureKind,
    /// User-visible message
    pub message: String,
    /// Underlying error, for logs and health output
    pub detail: String,
}

/// Ticket for one poll attempt
///
/// Tokens increase monotonically; only the latest issued one may apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// State plus bookkeeping, as seen by watchers
#[derive(Debug, Clone)]
pub struct PollStatus {
    pub state: FeedState,
    /// Latest token handed out
    pub issued: u64,
    /// Token of the outcome currently shown (0 while loading)
    pub applied: u64,
    /// When `state` last changed
    pub updated_at: Option<DateTime<Utc>>,
    pub successes: u64,
    pub failures: u64,
    /// Outcomes dropped because a newer request had been issued
    pub discarded: u64,
}

impl Default for PollStatus {
    fn default() -> Self {
        Self {
            state: FeedState::Loading,
            issued: 0,
            applied: 0,
            updated_at: None,
            successes: 0,
            failures: 0,
            discarded: 0,
        }
    }
}

/// Owner of the feed state
pub struct FeedStore {
    tx: watch::Sender<PollStatus>,
}

impl FeedStore {
    /// Create a store in the `Loading` state
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(PollStatus::default());
        Self { tx }
    }

    /// Hand out the token for a new attempt.
    ///
    /// Issuing does not wake watchers.
    pub fn issue(&self) -> RequestToken {
        let mut token = 0;
        self.tx.send_if_modified(|status| {
            status.issued += 1;
            token = status.issued;
            false
        });
        RequestToken(token)
    }

    /// Record the outcome of the attempt holding `token`.
    ///
    /// Returns false and leaves the state untouched when a newer token has
    /// been issued since.
    pub fn apply(&self, token: RequestToken, outcome: Result<Snapshot, FeedFailure>) -> bool {
        self.tx.send_if_modified(|status| {
            if token.0 != status.issued {
                status.discarded += 1;
                return false;
            }

            status.state = match outcome {
                Ok(snapshot) => {
                    status.successes += 1;
                    FeedState::Ready(Arc::new(snapshot))
                }
                Err(failure) => {
                    status.failures += 1;
                    FeedState::Error(failure)
                }
            };
            status.applied = token.0;
            status.updated_at = Some(Utc::now());
            true
        })
    }

    /// Current state
    pub fn current(&self) -> FeedState {
        self.tx.borrow().state.clone()
    }

    /// Current state with bookkeeping
    pub fn status(&self) -> PollStatus {
        self.tx.borrow().clone()
    }

    /// Watch for applied outcomes
    pub fn subscribe(&self) -> StateWatcher {
        StateWatcher {
            rx: self.tx.subscribe(),
        }
    }
}

impl Default for FeedStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Read side of the store
#[derive(Clone)]
pub struct StateWatcher {
    rx: watch::Receiver<PollStatus>,
}

impl StateWatcher {
    /// Current state, marking it as seen
    pub fn current(&mut self) -> FeedState {
        self.rx.borrow_and_update().state.clone()
    }

    /// Wait until an outcome newer than the last seen one is applied.
    ///
    /// Returns `None` once the store is gone.
    pub async fn changed(&mut self) -> Option<FeedState> {
        self.rx.changed().await.ok()?;
        Some(self.current())
    }
}
