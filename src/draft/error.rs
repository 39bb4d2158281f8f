//! Error types for course drafting

use thiserror::Error;

/// Errors that can occur while drafting a course
#[derive(Debug, Error)]
pub enum DraftError {
    /// API key is not configured
    #[error("API key not configured. Run `coursegate set-key <key>` first")]
    ApiKeyNotFound,

    /// Failed to access system keyring
    #[error("Failed to access keyring: {0}")]
    KeyringError(String),

    /// Invalid API key format
    #[error("Invalid API key format. Key should start with 'sk-ant-'")]
    InvalidApiKey,

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    /// Service returned an error response
    #[error("API error ({status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the service
        message: String,
    },

    /// Rate limited by the service
    #[error("Rate limited. Retry after {retry_after_seconds} seconds")]
    RateLimited {
        /// Seconds to wait before retrying
        retry_after_seconds: u64,
    },

    /// The reply contained no usable course
    #[error("Could not read a course from the reply: {0}")]
    MalformedDraft(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl DraftError {
    /// Check if this error is recoverable (user can retry)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            DraftError::RateLimited { .. }
                | DraftError::RequestError(_)
                | DraftError::MalformedDraft(_)
        )
    }

    /// Check if this error requires a new API key
    pub fn requires_reauth(&self) -> bool {
        matches!(
            self,
            DraftError::ApiKeyNotFound
                | DraftError::InvalidApiKey
                | DraftError::ApiError { status: 401, .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_failures_require_reauth() {
        assert!(DraftError::ApiKeyNotFound.requires_reauth());
        assert!(DraftError::ApiError { status: 401, message: String::new() }.requires_reauth());
        assert!(!DraftError::ApiError { status: 500, message: String::new() }.requires_reauth());
    }

    #[test]
    fn malformed_drafts_can_be_retried() {
        assert!(DraftError::MalformedDraft("empty".into()).is_recoverable());
        assert!(DraftError::RateLimited { retry_after_seconds: 5 }.is_recoverable());
        assert!(!DraftError::InvalidApiKey.is_recoverable());
    }
}
