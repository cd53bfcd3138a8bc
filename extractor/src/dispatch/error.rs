//! Errors raised by chat-completion dispatchers.

use thiserror::Error;

/// Failure of a single remote call. The extraction controller never
/// propagates these; it folds them into the result envelope.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Connection, TLS or timeout failure.
    #[error("Network error: {0}")]
    Network(String),

    /// Credentials rejected (401/403).
    #[error("Authentication rejected (status {status}): {body}")]
    Authentication {
        /// HTTP status code.
        status: u16,
        /// Response body returned by the provider.
        body: String,
    },

    /// Provider rate limit hit (429).
    #[error("Rate limited by provider: {0}")]
    RateLimited(String),

    /// Unknown model identifier (404).
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    /// Any other non-success status.
    #[error("Provider returned status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body returned by the provider.
        body: String,
    },

    /// Body could not be read or decoded as a chat completion.
    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),

    /// Request body could not be serialized.
    #[error("Could not build request: {0}")]
    InvalidRequest(String),

    /// First choice carried no text content.
    #[error("Response from model {0} carried no content")]
    EmptyContent(String),

    /// Generation stopped on the token limit.
    #[error("Response from model {0} was truncated by the token limit")]
    Truncated(String),

    /// Generation stopped by the provider content filter.
    #[error("Response from model {0} was blocked by the content filter")]
    ContentFiltered(String),

    /// Model refused the structured-output request.
    #[error("Model {model} refused the request: {refusal}")]
    Refused {
        /// Model identifier.
        model: String,
        /// Refusal text.
        refusal: String,
    },
}

impl From<reqwest::Error> for DispatchError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            Self::InvalidResponse(error.to_string())
        } else {
            Self::Network(error.to_string())
        }
    }
}
