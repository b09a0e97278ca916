//! Error types for gist API operations.

use thiserror::Error;

use crate::http::HttpError;

/// Errors that can occur when talking to the gist API.
#[derive(Debug, Error)]
pub enum GistError {
    /// Local input was rejected before any request was made.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// The operation needs a bearer token and none is available, or the
    /// server rejected the one we sent.
    #[error("Authentication required. Please log in with GitHub.")]
    AuthRequired,

    /// A resource lookup came back empty.
    #[error("Gist not found: {0}")]
    NotFound(String),

    /// The search endpoint refused the request (HTTP 403).
    #[error("Rate limit exceeded. Please try again later.")]
    RateLimited,

    /// Any other non-2xx response.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The request never produced a response.
    #[error("Network error: {0}")]
    Network(String),

    /// The response body was not what we expected.
    #[error("Failed to decode response: {0}")]
    Decode(String),
}

impl GistError {
    /// Create a validation error.
    #[inline]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Whether retrying the same request could plausibly succeed.
    ///
    /// Transport failures, 429 and 5xx responses qualify. Auth, validation
    /// and search rate-limit failures do not: they need the user to act.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Api { status, .. } => *status == 429 || (500..600).contains(status),
            _ => false,
        }
    }

    /// Whether this error should stop an aggregated search outright instead
    /// of being treated as an empty contribution.
    pub fn is_systemic(&self) -> bool {
        matches!(self, Self::AuthRequired | Self::RateLimited)
    }
}

impl From<HttpError> for GistError {
    fn from(err: HttpError) -> Self {
        Self::Network(err.to_string())
    }
}

impl From<serde_json::Error> for GistError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Get a short error message suitable for display.
pub fn short_error_message(err: &GistError) -> String {
    match err {
        GistError::Validation(msg) => msg.clone(),
        GistError::AuthRequired => "Authentication required".to_string(),
        GistError::NotFound(id) => format!("Not found: {}", id),
        GistError::RateLimited => "Rate limited".to_string(),
        GistError::Api { status, message } => {
            if message.chars().count() > 50 {
                let truncated: String = message.chars().take(47).collect();
                format!("HTTP {}: {}...", status, truncated)
            } else {
                format!("HTTP {}: {}", status, message)
            }
        }
        GistError::Network(_) => "Network error".to_string(),
        GistError::Decode(_) => "JSON parse error".to_string(),
    }
}

/// Result type for gist operations.
pub type Result<T> = std::result::Result<T, GistError>;
