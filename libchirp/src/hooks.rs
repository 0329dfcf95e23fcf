//! Notification hooks for feed events
//!
//! Every notification path takes an injected handler, so bot authors can
//! attach their own behavior per event. The defaults just log, which is
//! all the stock bot needs: the operator is expected to watch the logs
//! rather than interact live.

use tracing::info;

use crate::types::{DirectMessage, Follower, OwnPost, Status};

pub trait EventHooks: Send + Sync {
    /// Called once after a status is successfully published.
    fn on_post(&self, status: &Status) {
        info!(id = %status.id, "status published");
    }

    /// Called for each of our statuses that picked up new retweets.
    fn on_retweet(&self, status: &Status) {
        info!(
            id = %status.id,
            count = status.retweet_count,
            "status has new retweets"
        );
    }

    fn on_new_follower(&self, follower: &Follower) {
        info!(
            id = %follower.id,
            name = %follower.name,
            handle = %follower.handle,
            "new follower"
        );
    }

    /// `previous` is the count recorded before this check.
    fn on_favorite(&self, post: &OwnPost, previous: u64) {
        info!(
            id = %post.id,
            count = post.favorite_count,
            previous,
            "favorite count changed"
        );
    }

    fn on_reply(&self, reply: &Status) {
        info!(
            id = %reply.id,
            from = %reply.author.handle,
            text = %reply.text,
            "new reply"
        );
    }

    fn on_direct_message(&self, message: &DirectMessage) {
        info!(
            id = %message.id,
            from = %message.sender.handle,
            text = %message.text,
            "new direct message"
        );
    }
}

/// Hook implementation that keeps all the log-only defaults.
pub struct LogHooks;

impl EventHooks for LogHooks {}
