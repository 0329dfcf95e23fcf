//! Mock feed implementation for testing
//!
//! A configurable in-process feed that serves fixtures, applies the same
//! `since_id` paging a real remote would, and can be scripted to fail
//! (authentication rejection, rate limiting, missing direct-message
//! permission). Available for all builds so integration tests and the
//! dry-run binary can drive the full bot pipeline without network access.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use secrecy::ExposeSecret;

use crate::credentials::Credentials;
use crate::error::{FeedError, Result};
use crate::feed::FeedClient;
use crate::types::{Author, DirectMessage, Follower, OwnPost, Status, StatusId, UserId};

/// Scripted behavior and fixtures for [`MockFeed`].
#[derive(Debug, Clone)]
pub struct MockFeedConfig {
    /// Whether authentication should succeed
    pub auth_succeeds: bool,

    /// Fail this many `post_status` calls with a rate-limit signal before
    /// accepting one
    pub rate_limited_posts: u32,

    /// Whether direct-message listing fails with a permission denial
    pub dm_permission_denied: bool,

    /// The account the client is authenticated as
    pub account: Author,

    pub followers: Vec<Follower>,
    pub own_posts: Vec<OwnPost>,
    pub retweets: Vec<Status>,
    pub timeline: Vec<Status>,
    pub direct_messages: Vec<DirectMessage>,

    /// Number of times authenticate has been called
    pub auth_call_count: Arc<Mutex<u32>>,

    /// Number of times post_status has been called
    pub post_call_count: Arc<Mutex<u32>>,

    /// Statuses that have been posted (for verification)
    pub posted_statuses: Arc<Mutex<Vec<String>>>,
}

impl Default for MockFeedConfig {
    fn default() -> Self {
        Self {
            auth_succeeds: true,
            rate_limited_posts: 0,
            dm_permission_denied: false,
            account: Author {
                id: UserId(1),
                name: "Chirp Bot".to_string(),
                handle: "chirpbot".to_string(),
            },
            followers: Vec::new(),
            own_posts: Vec::new(),
            retweets: Vec::new(),
            timeline: Vec::new(),
            direct_messages: Vec::new(),
            auth_call_count: Arc::new(Mutex::new(0)),
            post_call_count: Arc::new(Mutex::new(0)),
            posted_statuses: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

/// Mock feed for tests and dry runs
pub struct MockFeed {
    config: MockFeedConfig,
    authenticated: bool,
}

impl MockFeed {
    pub fn new(config: MockFeedConfig) -> Self {
        Self {
            config,
            authenticated: false,
        }
    }

    /// A feed with no fixtures at all.
    pub fn empty() -> Self {
        Self::new(MockFeedConfig::default())
    }

    /// A feed that rejects authentication.
    pub fn auth_failure() -> Self {
        Self::new(MockFeedConfig {
            auth_succeeds: false,
            ..Default::default()
        })
    }

    /// A feed that rate-limits the first `failures` posts.
    pub fn rate_limited(failures: u32) -> Self {
        Self::new(MockFeedConfig {
            rate_limited_posts: failures,
            ..Default::default()
        })
    }

    /// A feed whose application lacks the direct-message grant.
    pub fn without_dm_permission() -> Self {
        Self::new(MockFeedConfig {
            dm_permission_denied: true,
            ..Default::default()
        })
    }

    /// A feed with a small fixed set of interactions, used by the dry-run
    /// binary so every check has something to report.
    pub fn sample() -> Self {
        let bot = Author {
            id: UserId(1),
            name: "Chirp Bot".to_string(),
            handle: "chirpbot".to_string(),
        };
        let fan = Author {
            id: UserId(7),
            name: "Some Fan".to_string(),
            handle: "somefan".to_string(),
        };

        Self::new(MockFeedConfig {
            account: bot.clone(),
            followers: vec![Follower {
                id: fan.id,
                name: fan.name.clone(),
                handle: fan.handle.clone(),
            }],
            own_posts: vec![OwnPost {
                id: StatusId(100),
                favorite_count: 2,
            }],
            retweets: vec![Status {
                id: StatusId(205),
                author: bot,
                text: "good morning from the scheduler".to_string(),
                in_reply_to_user: None,
                retweet_count: 3,
                created_at: Utc::now(),
            }],
            timeline: vec![
                Status {
                    id: StatusId(301),
                    author: fan.clone(),
                    text: "nice bot you have there".to_string(),
                    in_reply_to_user: Some(UserId(1)),
                    retweet_count: 0,
                    created_at: Utc::now(),
                },
                Status {
                    id: StatusId(300),
                    author: fan,
                    text: "unrelated chatter".to_string(),
                    in_reply_to_user: None,
                    retweet_count: 0,
                    created_at: Utc::now(),
                },
            ],
            ..Default::default()
        })
    }

    /// Get the number of times authenticate was called
    pub fn auth_call_count(&self) -> u32 {
        *self.config.auth_call_count.lock().unwrap()
    }

    /// Get the number of times post_status was called
    pub fn post_call_count(&self) -> u32 {
        *self.config.post_call_count.lock().unwrap()
    }

    /// Get all statuses that were posted
    pub fn posted_statuses(&self) -> Vec<String> {
        self.config.posted_statuses.lock().unwrap().clone()
    }

    fn require_auth(&self) -> Result<()> {
        if self.authenticated {
            Ok(())
        } else {
            Err(FeedError::Authentication("not authenticated".to_string()).into())
        }
    }
}

/// Newest-first page of `items` past `since_id`, at most `limit` long.
fn page_by_id<T: Clone>(
    items: &[T],
    id_of: impl Fn(&T) -> StatusId,
    since_id: Option<StatusId>,
    limit: usize,
) -> Vec<T> {
    let mut page: Vec<T> = items
        .iter()
        .filter(|item| since_id.is_none_or(|since| id_of(item) > since))
        .cloned()
        .collect();
    page.sort_by(|a, b| id_of(b).cmp(&id_of(a)));
    page.truncate(limit);
    page
}

#[async_trait]
impl FeedClient for MockFeed {
    async fn authenticate(&mut self, credentials: &Credentials) -> Result<()> {
        *self.config.auth_call_count.lock().unwrap() += 1;

        if !self.config.auth_succeeds || credentials.consumer_key.expose_secret().is_empty() {
            return Err(
                FeedError::Authentication("credentials were not accepted".to_string()).into(),
            );
        }

        self.authenticated = true;
        Ok(())
    }

    async fn verify_credentials(&self) -> Result<Author> {
        self.require_auth()?;
        Ok(self.config.account.clone())
    }

    async fn post_status(&self, text: &str) -> Result<Status> {
        self.require_auth()?;

        let mut calls = self.config.post_call_count.lock().unwrap();
        *calls += 1;
        let call_number = *calls;
        drop(calls);

        if call_number <= self.config.rate_limited_posts {
            return Err(
                FeedError::RateLimited("posting quota exhausted for this window".to_string())
                    .into(),
            );
        }

        self.config
            .posted_statuses
            .lock()
            .unwrap()
            .push(text.to_string());

        Ok(Status {
            id: StatusId(90_000 + u64::from(call_number)),
            author: self.config.account.clone(),
            text: text.to_string(),
            in_reply_to_user: None,
            retweet_count: 0,
            created_at: Utc::now(),
        })
    }

    async fn list_followers(&self, limit: usize) -> Result<Vec<Follower>> {
        self.require_auth()?;
        Ok(self.config.followers.iter().take(limit).cloned().collect())
    }

    async fn list_own_recent_posts(&self, limit: usize) -> Result<Vec<OwnPost>> {
        self.require_auth()?;
        Ok(self.config.own_posts.iter().take(limit).copied().collect())
    }

    async fn list_retweets_of_me(
        &self,
        since_id: Option<StatusId>,
        limit: usize,
    ) -> Result<Vec<Status>> {
        self.require_auth()?;
        Ok(page_by_id(&self.config.retweets, |s| s.id, since_id, limit))
    }

    async fn list_home_timeline(
        &self,
        since_id: Option<StatusId>,
        limit: usize,
    ) -> Result<Vec<Status>> {
        self.require_auth()?;
        Ok(page_by_id(&self.config.timeline, |s| s.id, since_id, limit))
    }

    async fn list_direct_messages(
        &self,
        since_id: Option<StatusId>,
        limit: usize,
    ) -> Result<Vec<DirectMessage>> {
        self.require_auth()?;

        if self.config.dm_permission_denied {
            return Err(FeedError::PermissionDenied(
                "direct message access is not granted for this application".to_string(),
            )
            .into());
        }

        Ok(page_by_id(
            &self.config.direct_messages,
            |m| m.id,
            since_id,
            limit,
        ))
    }
}
