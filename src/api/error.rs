//! Error types for the course backend

use thiserror::Error;

/// Errors that can occur when talking to the course backend
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed before a response arrived
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    /// The requested record does not exist
    #[error("{resource} not found")]
    NotFound {
        /// What was looked up (e.g. "course abc123")
        resource: String,
    },

    /// The backend rejected our credentials
    #[error("Not authorized. Set COURSEGATE_API_TOKEN to a valid token")]
    Unauthorized,

    /// The backend returned an error response
    #[error("API error ({status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Response body or reason
        message: String,
    },

    /// The backend could not be reached or refused the write
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl ApiError {
    /// Check if this error is recoverable (user can retry)
    pub fn is_recoverable(&self) -> bool {
        match self {
            ApiError::RequestError(_) | ApiError::Unavailable(_) => true,
            ApiError::ApiError { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// Check if this error means the record is missing
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
    }
}
