//! Status publishing with bounded rate-limit retry

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::config::PublisherConfig;
use crate::error::{ChirpError, FeedError, Result};
use crate::feed::FeedSession;
use crate::hooks::{EventHooks, LogHooks};
use crate::types::Status;

/// Maximum status length accepted by the publisher, in characters.
pub const CHARACTER_LIMIT: usize = 280;

pub struct PostPublisher {
    attempts: u32,
    sleep_between: Duration,
    hooks: Arc<dyn EventHooks>,
}

impl PostPublisher {
    pub fn new(config: &PublisherConfig) -> Self {
        Self::with_hooks(config, Arc::new(LogHooks))
    }

    pub fn with_hooks(config: &PublisherConfig, hooks: Arc<dyn EventHooks>) -> Self {
        Self {
            // At least one attempt, whatever the config says.
            attempts: config.rate_limit_attempts.max(1),
            sleep_between: Duration::from_secs(config.rate_limit_sleep_secs),
            hooks,
        }
    }

    /// Publish `message`, retrying while the remote reports rate limiting.
    ///
    /// Validation happens before anything touches the remote: an empty or
    /// over-limit message fails with [`ChirpError::InvalidInput`] without a
    /// network call. Authentication happens lazily through the session.
    ///
    /// # Errors
    ///
    /// - [`ChirpError::InvalidInput`] for an empty or over-limit message
    /// - [`FeedError::Authentication`] when credentials are missing or bad
    /// - [`FeedError::RateLimitExceeded`] when every attempt was rate
    ///   limited
    /// - any other remote failure, unchanged
    pub async fn post(&self, session: &mut FeedSession, message: &str) -> Result<Status> {
        let status = match self.try_post(session, message).await {
            Ok(status) => status,
            Err(err) => {
                error!(error = %err, "failed to publish status");
                return Err(err);
            }
        };

        self.hooks.on_post(&status);
        Ok(status)
    }

    async fn try_post(&self, session: &mut FeedSession, message: &str) -> Result<Status> {
        validate_message(message)?;
        session.ensure_authenticated().await?;

        let mut remaining = self.attempts;
        loop {
            info!(text = %message, "publishing status");
            match session.client().post_status(message).await {
                Ok(status) => {
                    info!(id = %status.id, "status published successfully");
                    return Ok(status);
                }
                Err(ChirpError::Feed(FeedError::RateLimited(reason))) => {
                    remaining -= 1;
                    warn!(%reason, "remote rate limit reached");
                    if remaining == 0 {
                        return Err(FeedError::RateLimitExceeded {
                            attempts: self.attempts,
                        }
                        .into());
                    }
                    info!(
                        retries_left = remaining,
                        sleep_secs = self.sleep_between.as_secs(),
                        "sleeping before retrying"
                    );
                    sleep(self.sleep_between).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

fn validate_message(message: &str) -> Result<()> {
    if message.trim().is_empty() {
        return Err(ChirpError::InvalidInput(
            "message cannot be empty".to_string(),
        ));
    }

    let length = message.chars().count();
    if length > CHARACTER_LIMIT {
        return Err(ChirpError::InvalidInput(format!(
            "message is {} characters, over the {} character limit",
            length, CHARACTER_LIMIT
        )));
    }

    Ok(())
}
