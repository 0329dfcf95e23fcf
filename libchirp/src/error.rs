//! Error types for Chirp

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ChirpError>;

#[derive(Error, Debug)]
pub enum ChirpError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("State error: {0}")]
    State(#[from] StateError),

    #[error("Feed error: {0}")]
    Feed(#[from] FeedError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl ChirpError {
    /// Returns the appropriate exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            ChirpError::InvalidInput(_) => 3,
            ChirpError::Feed(FeedError::Authentication(_)) => 2,
            ChirpError::Feed(_) => 1,
            ChirpError::Config(_) => 1,
            ChirpError::State(_) => 1,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

#[derive(Error, Debug)]
pub enum StateError {
    #[error("State I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode state: {0}")]
    Encode(#[from] toml::ser::Error),

    /// Unparseable state files are logged and replaced with defaults; this
    /// variant never reaches a caller.
    #[error("State file {path} is corrupt: {detail}")]
    Corrupt { path: String, detail: String },
}

#[derive(Error, Debug, Clone)]
pub enum FeedError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Rate limited by the remote: {0}")]
    RateLimited(String),

    #[error("Rate limit retries exhausted after {attempts} attempts")]
    RateLimitExceeded { attempts: u32 },

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Remote error: {0}")]
    Remote(String),
}
