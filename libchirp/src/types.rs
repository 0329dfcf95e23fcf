//! Core types for Chirp

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier the remote feed assigns to a status or direct message.
///
/// Opaque to the bot except for its ordering: ids are monotonically
/// increasing, which is what the per-feature markers rely on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusId(pub u64);

impl std::fmt::Display for StatusId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier the remote feed assigns to an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The account behind a status or direct message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: UserId,
    pub name: String,
    pub handle: String,
}

/// A status on the remote feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Status {
    pub id: StatusId,
    pub author: Author,
    pub text: String,
    /// Account this status replies to, when it is a reply.
    pub in_reply_to_user: Option<UserId>,
    pub retweet_count: u64,
    pub created_at: DateTime<Utc>,
}

/// An account following the bot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Follower {
    pub id: UserId,
    pub name: String,
    pub handle: String,
}

/// One of the bot's own posts with its current favorite total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnPost {
    pub id: StatusId,
    pub favorite_count: u64,
}

/// A direct message sent to the bot account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectMessage {
    pub id: StatusId,
    pub sender: Author,
    pub text: String,
    pub created_at: DateTime<Utc>,
}
