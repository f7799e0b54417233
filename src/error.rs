//! Error type shared by the source-resolution and aggregation core.

use thiserror::Error;

use crate::twitter::PostId;

/// Failures that abort a trace.
///
/// "No searchable signal" and "no earlier match" are not errors; they are
/// reported through [`crate::source::Resolution`].
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("post {0} not found or not accessible")]
    PostNotFound(PostId),

    #[error("user {0} not found or not accessible")]
    UserNotFound(String),

    #[error("not a post URL: {0}")]
    InvalidPostUrl(String),

    #[error("X API error for operation '{operation}' ({status})")]
    Api { operation: String, status: u16 },

    #[error("X API returned malformed data: {0}")]
    MalformedResponse(String),

    #[error("token refresh failed: {0}")]
    Auth(String),

    #[error("NLP service failure: {0}")]
    Nlp(String),

    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("failed to encode request parameters: {0}")]
    Encode(#[from] serde_urlencoded::ser::Error),
}

impl SourceError {
    /// True for the "it no longer exists or we may not see it" family.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            SourceError::PostNotFound(_) | SourceError::UserNotFound(_)
        )
    }
}
