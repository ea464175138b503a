use thiserror::Error;
use uuid::Uuid;

/// subtrack error types
#[derive(Error, Debug)]
pub enum SubtrackError {
    /// Failed to parse stored JSON or user input
    #[error("parse error: {0}")]
    Parse(String),

    /// File I/O error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Store operation failed
    #[error("store error: {0}")]
    Store(String),

    /// No subscription with this id
    #[error("subscription {0} not found")]
    NotFound(Uuid),

    /// Rejected input (bad date, empty user id, ...)
    #[error("invalid input: {0}")]
    Validation(String),

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),
}

impl From<config::ConfigError> for SubtrackError {
    fn from(err: config::ConfigError) -> Self {
        SubtrackError::Config(err.to_string())
    }
}

/// Result type alias for subtrack
pub type Result<T> = std::result::Result<T, SubtrackError>;
