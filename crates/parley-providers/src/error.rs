//! Provider error type.
//!
//! The agent loop does not retry; every variant propagates out of
//! `ConversationAgent::chat()` to its caller.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    /// Connection, TLS, or timeout failure.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success HTTP status.
    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    /// The service answered 200 but reported a failed response.
    #[error("response failed: {0}")]
    Failed(String),

    /// Response body did not match the expected shape.
    #[error("failed to decode response: {0}")]
    Decode(String),
}
