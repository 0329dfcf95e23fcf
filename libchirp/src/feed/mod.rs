//! Remote feed abstraction
//!
//! All network traffic goes through the [`FeedClient`] capability trait;
//! the bot core never sees a transport. [`FeedSession`] wraps a client with
//! the lazy-authentication behavior the bot relies on: nothing touches the
//! credential file until the first call that actually needs the remote.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::info;

use crate::credentials::Credentials;
use crate::error::{FeedError, Result};
use crate::types::{Author, DirectMessage, Follower, OwnPost, Status, StatusId, UserId};

pub mod mock;

/// Capability set the bot needs from a social network.
///
/// Listing calls that accept `since_id` must return only items with ids
/// strictly greater than the marker. Ordering of returned items is not
/// relied upon; the poller sorts where it matters.
#[async_trait]
pub trait FeedClient: Send + Sync {
    /// Establish a connection using the supplied credentials.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Authentication`] when the remote rejects the
    /// credentials.
    async fn authenticate(&mut self, credentials: &Credentials) -> Result<()>;

    /// The account this client is authenticated as.
    async fn verify_credentials(&self) -> Result<Author>;

    /// Publish a status and return the created item.
    async fn post_status(&self, text: &str) -> Result<Status>;

    /// Accounts following the authenticated user, most recent first.
    async fn list_followers(&self, limit: usize) -> Result<Vec<Follower>>;

    /// The authenticated user's own most recent posts with their current
    /// favorite totals.
    async fn list_own_recent_posts(&self, limit: usize) -> Result<Vec<OwnPost>>;

    /// Retweets of the authenticated user's posts.
    async fn list_retweets_of_me(
        &self,
        since_id: Option<StatusId>,
        limit: usize,
    ) -> Result<Vec<Status>>;

    /// The authenticated user's home timeline.
    async fn list_home_timeline(
        &self,
        since_id: Option<StatusId>,
        limit: usize,
    ) -> Result<Vec<Status>>;

    /// Direct messages sent to the authenticated user.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::PermissionDenied`] when the application lacks
    /// the direct-message grant, which is the typical configuration.
    async fn list_direct_messages(
        &self,
        since_id: Option<StatusId>,
        limit: usize,
    ) -> Result<Vec<DirectMessage>>;
}

enum CredentialSource {
    Inline(Credentials),
    File(PathBuf),
}

/// A feed client plus the credentials to connect it, authenticated on
/// first use.
pub struct FeedSession {
    client: Box<dyn FeedClient>,
    source: CredentialSource,
    account: Option<Author>,
}

impl FeedSession {
    /// Session with credentials supplied directly.
    pub fn new(client: Box<dyn FeedClient>, credentials: Credentials) -> Self {
        Self {
            client,
            source: CredentialSource::Inline(credentials),
            account: None,
        }
    }

    /// Session that reads its credentials from a TOML file when first
    /// needed. A missing or malformed file surfaces as an authentication
    /// error at that point.
    pub fn with_credential_file(client: Box<dyn FeedClient>, path: impl Into<PathBuf>) -> Self {
        Self {
            client,
            source: CredentialSource::File(path.into()),
            account: None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.account.is_some()
    }

    /// The authenticated account, once [`ensure_authenticated`] has run.
    ///
    /// [`ensure_authenticated`]: Self::ensure_authenticated
    pub fn account(&self) -> Option<&Author> {
        self.account.as_ref()
    }

    pub fn client(&self) -> &dyn FeedClient {
        self.client.as_ref()
    }

    /// Authenticate on first use and return the account id. Later calls
    /// return the cached id without touching the remote.
    pub async fn ensure_authenticated(&mut self) -> Result<UserId> {
        if let Some(account) = &self.account {
            return Ok(account.id);
        }

        let loaded;
        let credentials = match &self.source {
            CredentialSource::Inline(credentials) => credentials,
            CredentialSource::File(path) => {
                info!(path = %path.display(), "reading credential file");
                loaded = Credentials::load(path).map_err(|err| {
                    FeedError::Authentication(format!(
                        "failed to load credentials from {}: {}",
                        path.display(),
                        err
                    ))
                })?;
                &loaded
            }
        };

        self.client.authenticate(credentials).await?;
        let account = self.client.verify_credentials().await?;
        info!(handle = %account.handle, id = %account.id, "feed connection established");

        let id = account.id;
        self.account = Some(account);
        Ok(id)
    }
}
