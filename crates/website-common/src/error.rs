//! Error types for the website
//!
//! This module defines the common error type shared by the server and the
//! background jobs.

use thiserror::Error;

/// Common result type for website operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the website
#[derive(Debug, Error)]
pub enum Error {
    #[error("storage error: {0}")]
    Storage(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("invalid email address: {0}")]
    InvalidEmailAddress(String),

    #[error("message length ({length}) is too long (max {max} characters)")]
    MessageTooLong { length: usize, max: usize },

    #[error("mail delivery failed: {0}")]
    Mail(String),

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl Error {
    /// Create an invalid request error
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create a mail delivery error
    pub fn mail(msg: impl Into<String>) -> Self {
        Self::Mail(msg.into())
    }

    /// Check if this error was caused by the client
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidRequest(_) | Self::InvalidEmailAddress(_) | Self::MessageTooLong { .. }
        )
    }

    /// Get the HTTP status code to answer with
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::InvalidRequest(_) | Self::InvalidEmailAddress(_) | Self::MessageTooLong { .. } => {
                400
            }

            Self::NotFound(_) => 404,

            Self::Storage(_) | Self::Mail(_) | Self::Configuration(_) => 500,
        }
    }
}
