// Error handling module
// Defines the error kinds surfaced by the session client

use thiserror::Error;

/// Errors that can occur while talking to the auth backend or the token store
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AuthError {
    /// Backend rejected the request; carries the backend's own error detail
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// Backend unreachable, timed out, or answered with something unreadable
    #[error("Transport error: {0}")]
    Transport(String),

    /// Durable token store failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AuthError {
    /// Backend-provided message, if the backend rejected the request
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            AuthError::Rejected { message, .. } => Some(message),
            _ => None,
        }
    }

    /// HTTP status of a backend rejection
    pub fn status(&self) -> Option<u16> {
        match self {
            AuthError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for AuthError {
    fn from(err: rusqlite::Error) -> Self {
        AuthError::Storage(err.to_string())
    }
}

/// Result type alias for session operations
pub type Result<T> = std::result::Result<T, AuthError>;
