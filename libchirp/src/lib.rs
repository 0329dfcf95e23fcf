//! Chirp - a small framework for scheduled social-feed bots
//!
//! A Chirp bot posts one status per scheduled run, checks a narrow set of
//! account interactions (retweets, followers, favorites, replies, direct
//! messages), and exits. Between runs everything it remembers lives in
//! flat per-feature files under one state directory, so restarts are
//! idempotent. Interactions are reported through injected hooks whose
//! defaults just log; the operator watches the logs.

pub mod config;
pub mod credentials;
pub mod error;
pub mod feed;
pub mod hooks;
pub mod logging;
pub mod poller;
pub mod publisher;
pub mod state;
pub mod types;

// Re-export commonly used types
pub use config::Config;
pub use credentials::Credentials;
pub use error::{ChirpError, FeedError, Result};
pub use feed::{FeedClient, FeedSession};
pub use hooks::{EventHooks, LogHooks};
pub use poller::UpdatePoller;
pub use publisher::{PostPublisher, CHARACTER_LIMIT};
pub use state::{Feature, StateStore};
