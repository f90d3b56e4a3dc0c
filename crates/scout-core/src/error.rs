use std::time::Duration;

use thiserror::Error;

/// Application-wide error types for Scout.
#[derive(Error, Debug)]
pub enum AppError {
    /// HTTP request failed (fetching a page).
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Request timed out.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// Network/connection error.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// The page URL handed to discovery is not an absolute URL.
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The fetched resource is not an HTML document.
    #[error("Unsupported content type: {0}")]
    UnsupportedContent(String),

    /// Validation was asked to run over zero URLs.
    #[error("No URLs to validate")]
    EmptyUrlBatch,

    /// Validation was given a selector set where every field is blank.
    #[error("No selectors configured")]
    NoSelectorsConfigured,

    /// JSON serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Generic error.
    #[error("{0}")]
    Generic(String),
}

impl AppError {
    /// Timeout error for `limit`, rounded up to whole seconds.
    pub fn timeout(limit: Duration) -> Self {
        let secs = limit.as_secs() + u64::from(limit.subsec_nanos() > 0);
        AppError::Timeout(secs)
    }

    /// Returns true if this error is transient and worth retrying.
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::NetworkError(_) | AppError::Timeout(_) => true,
            AppError::HttpError(msg) => {
                msg.contains("timeout") || msg.contains("connect") || msg.contains("reset")
            }
            _ => false,
        }
    }

    /// Returns true for caller mistakes that no amount of retrying will fix.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            AppError::InvalidUrl { .. } | AppError::EmptyUrlBatch | AppError::NoSelectorsConfigured
        )
    }
}
