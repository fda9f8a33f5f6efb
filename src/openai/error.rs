//! Failures when talking to an OpenAI compatible chat completion
//! server.

/// Every way a call to the model server can fail. Nothing here is
/// retried, callers get the error exactly as it happened.
#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    /// The request never got a response (connection refused, timeout,
    /// body read failure).
    #[error("Connection to model server failed: {0}")]
    ConnectionFailed(#[source] reqwest::Error),

    #[error("Rate limited by model server (retry after: {})", .retry_after.as_deref().unwrap_or("unknown"))]
    RateLimited { retry_after: Option<String> },

    /// Any non-success status other than 429.
    #[error("Model server returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body is not JSON or is missing the first choice's
    /// message content.
    #[error("Invalid response from model server: {0}")]
    InvalidResponse(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl From<reqwest::Error> for CompletionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            CompletionError::InvalidRequest(err.to_string())
        } else {
            CompletionError::ConnectionFailed(err)
        }
    }
}
