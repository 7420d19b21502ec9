//! Feed Polling
//!
//! - **store**: the single state container (`Loading` / `Ready` / `Error`)
//! - **runner**: periodic or one-shot fetch + normalize loop
//!
//! ## Flow
//!
//! 1. Each tick issues a `RequestToken` from the store
//! 2. The attempt fetches and normalizes the feed
//! 3. The outcome is applied only if its token is still the latest issued
//! 4. Watchers wake on every applied outcome

mod runner;
mod store;

pub use runner::{PollError, PollMode, Poller, PollerConfig, PollerHandle};
pub use store::{
    FailureKind, FeedFailure, FeedState, FeedStore, PollStatus, RequestToken, StateWatcher,
};
