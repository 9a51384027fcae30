//! Types shared by the external collaborators (store, reports, permissions).

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Failure of a call to an external collaborator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ServiceError {
    #[error("{what} not found: {id}")]
    NotFound { what: &'static str, id: String },

    #[error("{operation} timed out after {}ms", .timeout.as_millis())]
    Timeout {
        operation: String,
        timeout: Duration,
    },

    #[error("service unavailable: {message}")]
    Unavailable { message: String },

    #[error("request rejected: {message}")]
    Rejected { message: String },

    #[error("storage failure: {message}")]
    Storage { message: String },
}

impl ServiceError {
    /// Whether repeating the same call may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ServiceError::Timeout { .. } | ServiceError::Unavailable { .. }
        )
    }

    pub fn storage(message: impl fmt::Display) -> Self {
        ServiceError::Storage {
            message: message.to_string(),
        }
    }
}

/// Opaque bearer credential forwarded to collaborators.
///
/// The token is never printed by `Debug` or `Display`.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential([REDACTED])")
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}
