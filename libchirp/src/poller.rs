//! Incremental update checks against the remote feed
//!
//! Each check loads its on-disk state, fetches what the remote has past
//! it, filters for novelty, persists the new state, and only then fires
//! the notification hooks. Persist-before-notify keeps restarts
//! idempotent: a crash between the two at worst drops notifications, it
//! never repeats them.

use std::sync::Arc;

use tracing::{debug, error, info};

use crate::config::PollingConfig;
use crate::error::{ChirpError, FeedError, Result};
use crate::feed::FeedSession;
use crate::hooks::{EventHooks, LogHooks};
use crate::state::{Feature, StateStore};
use crate::types::{DirectMessage, Follower, OwnPost, Status, StatusId};

pub struct UpdatePoller {
    state: StateStore,
    config: PollingConfig,
    hooks: Arc<dyn EventHooks>,
}

impl UpdatePoller {
    pub fn new(state: StateStore, config: PollingConfig) -> Self {
        Self::with_hooks(state, config, Arc::new(LogHooks))
    }

    pub fn with_hooks(state: StateStore, config: PollingConfig, hooks: Arc<dyn EventHooks>) -> Self {
        Self {
            state,
            config,
            hooks,
        }
    }

    pub fn state(&self) -> &StateStore {
        &self.state
    }

    /// Cadence gate: true once every `interval` invocations.
    ///
    /// The countdown is persisted between runs. An interval of 0 checks on
    /// every invocation and leaves the counter file alone entirely.
    pub fn should_check(&self, interval: u32) -> Result<bool> {
        if interval == 0 {
            return Ok(true);
        }

        let remaining = self.state.load_cadence_counter().saturating_sub(1);
        if remaining == 0 {
            self.state.save_cadence_counter(interval)?;
            info!(interval, "check interval hit, updates will be checked");
            Ok(true)
        } else {
            self.state.save_cadence_counter(remaining)?;
            info!(remaining, "check interval not hit, skipping update checks");
            Ok(false)
        }
    }

    /// Run every enabled check, once every configured number of
    /// invocations.
    ///
    /// Checks run in a fixed order: retweets, followers, favorites,
    /// direct messages, replies. A disabled check is skipped with a log
    /// line; a failing check is logged and stops the run, leaving its
    /// error with the caller.
    pub async fn check_for_updates(&self, session: &mut FeedSession) -> Result<()> {
        if !self.should_check(self.config.interval)? {
            return Ok(());
        }

        if let Err(err) = session.ensure_authenticated().await {
            error!(error = %err, "authentication failed while preparing update checks");
            return Err(err);
        }

        info!("checking for updates on the feed account");

        if self.config.retweets {
            self.check_retweets(session).await?;
        } else {
            info!("skipping retweet check");
        }

        if self.config.followers {
            self.check_new_followers(session).await?;
        } else {
            info!("skipping follower check");
        }

        if self.config.favorites {
            self.check_favorites(session).await?;
        } else {
            info!("skipping favorite check");
        }

        if self.config.direct_messages {
            self.check_direct_messages(session).await?;
        } else {
            info!("skipping direct message check");
        }

        if self.config.replies {
            self.check_replies(session).await?;
        } else {
            info!("skipping reply check");
        }

        Ok(())
    }

    /// Retweets of our statuses since the stored marker, newest first.
    pub async fn check_retweets(&self, session: &mut FeedSession) -> Result<Vec<Status>> {
        session.ensure_authenticated().await?;
        let result = self.retweets_inner(session).await;
        if let Err(err) = &result {
            error!(error = %err, "retweet check failed");
        }
        result
    }

    async fn retweets_inner(&self, session: &mut FeedSession) -> Result<Vec<Status>> {
        info!("checking for new retweets");
        let marker = self.state.load_marker(Feature::Retweets);
        let mut new_items = session
            .client()
            .list_retweets_of_me(marker, self.config.max_retweets)
            .await?;
        new_items.sort_by(|a, b| b.id.cmp(&a.id));

        if new_items.is_empty() {
            info!("no new retweets");
        } else {
            info!(count = new_items.len(), "new retweets");
            self.advance_marker(Feature::Retweets, marker, new_items[0].id)?;
            for status in &new_items {
                self.hooks.on_retweet(status);
            }
        }
        Ok(new_items)
    }

    /// Followers not present in the known-follower set. Every novel id is
    /// added to the set; ids never leave it.
    pub async fn check_new_followers(&self, session: &mut FeedSession) -> Result<Vec<Follower>> {
        session.ensure_authenticated().await?;
        let result = self.followers_inner(session).await;
        if let Err(err) = &result {
            error!(error = %err, "follower check failed");
        }
        result
    }

    async fn followers_inner(&self, session: &mut FeedSession) -> Result<Vec<Follower>> {
        info!("checking for new followers");
        let mut known = self.state.load_follower_set();
        let followers = session
            .client()
            .list_followers(self.config.max_followers)
            .await?;

        let mut new_followers = Vec::new();
        for follower in followers {
            if known.insert(follower.id) {
                new_followers.push(follower);
            }
        }

        if new_followers.is_empty() {
            info!("no new followers");
        } else {
            info!(count = new_followers.len(), "new followers");
            self.state.save_follower_set(&known)?;
            for follower in &new_followers {
                self.hooks.on_new_follower(follower);
            }
        }
        Ok(new_followers)
    }

    /// Our recent posts whose favorite count moved since the ledger last
    /// saw them. Returns each changed post with its previously recorded
    /// count.
    pub async fn check_favorites(
        &self,
        session: &mut FeedSession,
    ) -> Result<Vec<(OwnPost, u64)>> {
        session.ensure_authenticated().await?;
        let result = self.favorites_inner(session).await;
        if let Err(err) = &result {
            error!(error = %err, "favorite check failed");
        }
        result
    }

    async fn favorites_inner(&self, session: &mut FeedSession) -> Result<Vec<(OwnPost, u64)>> {
        info!("checking for new favorites");
        let mut ledger = self.state.load_favorite_ledger();
        let posts = session
            .client()
            .list_own_recent_posts(self.config.max_favorites)
            .await?;

        let mut changed = Vec::new();
        for post in posts {
            if post.favorite_count == 0 {
                continue;
            }
            let recorded = ledger.get(&post.id).copied().unwrap_or(0);
            if post.favorite_count == recorded {
                debug!(id = %post.id, count = post.favorite_count, "favorite count already known");
                continue;
            }
            ledger.insert(post.id, post.favorite_count);
            changed.push((post, recorded));
        }

        if changed.is_empty() {
            info!("no new favorites");
        } else {
            info!(count = changed.len(), "new favorites");
            self.state.save_favorite_ledger(&ledger)?;
            for (post, previous) in &changed {
                self.hooks.on_favorite(post, *previous);
            }
        }
        Ok(changed)
    }

    /// Direct messages since the stored marker, newest first.
    ///
    /// A permission denial from the remote is expected for applications
    /// without the direct-message grant: with
    /// `ignore_missing_dm_permission` (the default) it is logged and
    /// treated as an empty result; otherwise it propagates.
    pub async fn check_direct_messages(
        &self,
        session: &mut FeedSession,
    ) -> Result<Vec<DirectMessage>> {
        session.ensure_authenticated().await?;
        let result = self.direct_messages_inner(session).await;
        if let Err(err) = &result {
            error!(error = %err, "direct message check failed");
        }
        result
    }

    async fn direct_messages_inner(
        &self,
        session: &mut FeedSession,
    ) -> Result<Vec<DirectMessage>> {
        info!("checking for new direct messages");
        let marker = self.state.load_marker(Feature::DirectMessages);
        let fetched = match session
            .client()
            .list_direct_messages(marker, self.config.max_direct_messages)
            .await
        {
            Ok(items) => items,
            Err(ChirpError::Feed(FeedError::PermissionDenied(reason)))
                if self.config.ignore_missing_dm_permission =>
            {
                info!(
                    %reason,
                    "no direct message permission; this is the typical configuration, so the check is skipped"
                );
                return Ok(Vec::new());
            }
            Err(err) => return Err(err),
        };

        let mut new_items = fetched;
        new_items.sort_by(|a, b| b.id.cmp(&a.id));

        if new_items.is_empty() {
            info!("no new direct messages");
        } else {
            info!(count = new_items.len(), "new direct messages");
            self.advance_marker(Feature::DirectMessages, marker, new_items[0].id)?;
            for message in &new_items {
                self.hooks.on_direct_message(message);
            }
        }
        Ok(new_items)
    }

    /// Replies to our statuses since the stored marker, newest first.
    ///
    /// The remote has no reply query, so this scans the home timeline and
    /// keeps statuses that reply to the authenticated account. The marker
    /// only tracks surviving replies, not everything on the timeline.
    pub async fn check_replies(&self, session: &mut FeedSession) -> Result<Vec<Status>> {
        session.ensure_authenticated().await?;
        let result = self.replies_inner(session).await;
        if let Err(err) = &result {
            error!(error = %err, "reply check failed");
        }
        result
    }

    async fn replies_inner(&self, session: &mut FeedSession) -> Result<Vec<Status>> {
        info!("checking for new replies");
        let own_id = session.ensure_authenticated().await?;
        let marker = self.state.load_marker(Feature::Replies);
        let timeline = session
            .client()
            .list_home_timeline(marker, self.config.max_replies)
            .await?;

        let mut new_items: Vec<Status> = timeline
            .into_iter()
            .filter(|status| status.in_reply_to_user == Some(own_id))
            .collect();
        new_items.sort_by(|a, b| b.id.cmp(&a.id));

        if new_items.is_empty() {
            info!("no new replies");
        } else {
            info!(count = new_items.len(), "new replies");
            self.advance_marker(Feature::Replies, marker, new_items[0].id)?;
            for reply in &new_items {
                self.hooks.on_reply(reply);
            }
        }
        Ok(new_items)
    }

    /// Persist a marker only when it moves forward.
    fn advance_marker(
        &self,
        feature: Feature,
        current: Option<StatusId>,
        candidate: StatusId,
    ) -> Result<()> {
        if current.is_some_and(|cur| candidate <= cur) {
            debug!(%feature, %candidate, "marker not advanced");
            return Ok(());
        }
        self.state.save_marker(feature, candidate)
    }
}
