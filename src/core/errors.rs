//! Custom error types for translation operations

use thiserror::Error;

/// Translation-related errors
#[derive(Error, Debug)]
pub enum TranslationError {
    /// API request failed with a non-success status
    #[error("API error: {status} - {message}")]
    ApiError {
        /// HTTP status code returned by the remote API
        status: u16,
        /// Error body or message from the remote API
        message: String,
    },

    /// Rate limit, quota, or other temporary remote condition
    #[error("Rate limited: {message}")]
    RateLimited {
        /// Original error message from the remote API
        message: String,
    },

    /// Network error
    #[error("Network error: {message}")]
    NetworkError {
        /// Underlying transport error message
        message: String,
    },

    /// Invalid response from API
    #[error("Invalid response: {message}")]
    InvalidResponseError {
        /// What was wrong with the response
        message: String,
    },

    /// File operation error
    #[error("File error: {path} - {message}")]
    FileError {
        /// Path involved in the failed operation
        path: String,
        /// Underlying I/O error message
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError {
        /// What is wrong with the configuration
        message: String,
    },

    /// Glossary entry could not be compiled into a pattern
    #[error("Glossary error: {message}")]
    GlossaryError {
        /// The offending entry and regex error
        message: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Reqwest error
    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Message fragments that mark a remote failure as retryable.
/// Mirrors the wording Gemini uses for rate-limit and quota conditions.
const TRANSIENT_MARKERS: &[&str] = &["429", "rate", "quota", "temporar", "exceeded"];

impl TranslationError {
    /// Whether this error is a transient remote condition worth retrying.
    ///
    /// Only rate-limit/quota/temporary failures qualify; everything else is
    /// fatal and must surface immediately.
    pub fn is_transient(&self) -> bool {
        matches!(self, TranslationError::RateLimited { .. })
    }
}

/// Check an error message for rate-limit/quota/temporary wording.
pub fn is_transient_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    TRANSIENT_MARKERS.iter().any(|m| lower.contains(m))
}

/// Classify a non-success API response into a transient or fatal error.
///
/// HTTP 429 is always transient; otherwise the body text is checked for
/// rate-limit/quota wording.
pub fn classify_api_error(status: u16, message: String) -> TranslationError {
    if status == 429 || is_transient_message(&message) {
        TranslationError::RateLimited { message }
    } else {
        TranslationError::ApiError { status, message }
    }
}

/// Result type for translation operations
pub type Result<T> = std::result::Result<T, TranslationError>;
