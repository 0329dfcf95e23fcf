//! Configuration management for Chirp

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{ConfigError, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub state: StateConfig,
    pub credentials: CredentialsConfig,
    pub publisher: PublisherConfig,
    pub polling: PollingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StateConfig {
    /// Directory holding the per-feature marker files.
    pub dir: String,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            dir: "~/.local/share/chirp/state".to_string(),
        }
    }
}

impl StateConfig {
    pub fn expand_dir(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.dir).to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialsConfig {
    /// TOML file holding the four account secrets.
    pub file: String,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            file: "~/.config/chirp/credentials.toml".to_string(),
        }
    }
}

impl CredentialsConfig {
    pub fn expand_file(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.file).to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PublisherConfig {
    /// Total submission attempts while the remote keeps rate limiting.
    pub rate_limit_attempts: u32,
    /// Seconds to sleep between rate-limited attempts.
    pub rate_limit_sleep_secs: u64,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            rate_limit_attempts: 2,
            rate_limit_sleep_secs: 960,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Run the update checks once every this many invocations.
    /// 0 checks on every invocation and leaves the cadence counter alone.
    pub interval: u32,
    pub retweets: bool,
    pub followers: bool,
    pub favorites: bool,
    /// Most feed applications are not granted the direct-message scope,
    /// so this check is off unless asked for.
    pub direct_messages: bool,
    pub replies: bool,
    pub ignore_missing_dm_permission: bool,
    pub max_retweets: usize,
    pub max_followers: usize,
    pub max_favorites: usize,
    pub max_direct_messages: usize,
    pub max_replies: usize,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval: 7,
            retweets: true,
            followers: true,
            favorites: true,
            direct_messages: false,
            replies: true,
            ignore_missing_dm_permission: true,
            max_retweets: 50,
            max_followers: 50,
            max_favorites: 50,
            max_direct_messages: 50,
            max_replies: 100,
        }
    }
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        let config_path = resolve_config_path()?;
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: Config = toml::from_str(&content).map_err(ConfigError::ParseError)?;
        Ok(config)
    }

    /// Create a default configuration
    pub fn default_config() -> Self {
        Self::default()
    }
}

/// Resolve the configuration file path following XDG Base Directory spec
pub fn resolve_config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("CHIRP_CONFIG") {
        return Ok(PathBuf::from(shellexpand::tilde(&path).to_string()));
    }

    let config_dir = dirs::config_dir()
        .ok_or_else(|| ConfigError::MissingField("config directory".to_string()))?;

    Ok(config_dir.join("chirp").join("config.toml"))
}
