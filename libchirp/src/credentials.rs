//! Credential handling for the feed account
//!
//! The bot authenticates with four OAuth-style string secrets read from a
//! TOML file:
//!
//! ```toml
//! consumer_key = "xxxxxxxxxx"
//! consumer_secret = "xxxxxxxxxx"
//! access_token = "xxxxxxxxxx"
//! access_token_secret = "xxxxxxxxxx"
//! ```
//!
//! Secrets are wrapped in [`SecretString`] so they are zeroed on drop and
//! redacted from `Debug` output. A missing or malformed file is surfaced at
//! authentication time as a fatal error.

use secrecy::SecretString;
use serde::Deserialize;
use std::path::Path;

use crate::error::{ConfigError, Result};

#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub consumer_key: SecretString,
    pub consumer_secret: SecretString,
    pub access_token: SecretString,
    pub access_token_secret: SecretString,
}

impl Credentials {
    pub fn new(
        consumer_key: impl Into<SecretString>,
        consumer_secret: impl Into<SecretString>,
        access_token: impl Into<SecretString>,
        access_token_secret: impl Into<SecretString>,
    ) -> Self {
        Self {
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
            access_token: access_token.into(),
            access_token_secret: access_token_secret.into(),
        }
    }

    /// Read credentials from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let credentials: Credentials =
            toml::from_str(&content).map_err(ConfigError::ParseError)?;
        Ok(credentials)
    }
}
