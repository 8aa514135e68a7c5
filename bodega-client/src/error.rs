//! Client error types

use thiserror::Error;

use crate::storage::StorageError;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Authentication required (HTTP 401)
    #[error("Authentication required")]
    Unauthorized,

    /// Permission denied
    #[error("Permission denied: {0}")]
    Forbidden(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Request rejected by the server (HTTP 400)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Server-side error
    #[error("Server error: {0}")]
    Server(String),

    /// Credential storage failure
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ClientError {
    /// Message suitable for a page-level error banner. Server-provided
    /// messages pass through; transport failures get a generic text.
    pub fn banner_message(&self) -> String {
        match self {
            ClientError::Http(_) => "Could not reach the server".to_string(),
            ClientError::Unauthorized => "Session expired, please log in again".to_string(),
            other => other.to_string(),
        }
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
