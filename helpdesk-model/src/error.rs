//! Error types for the `helpdesk-model` crate.

use thiserror::Error;

/// Errors returned by a [`CompletionModel`](crate::CompletionModel).
#[derive(Debug, Error)]
pub enum ModelError {
    /// The provider throttled the request.
    #[error("Rate limit exceeded ({provider}): {message}")]
    RateLimited { provider: String, message: String },

    /// The provider rejected the credentials.
    #[error("Authentication failed ({provider}): {message}")]
    Authentication { provider: String, message: String },

    /// The account has no quota left.
    #[error("Quota exhausted ({provider}): {message}")]
    QuotaExceeded { provider: String, message: String },

    /// Any other non-success response.
    #[error("API error ({provider}) {status}: {message}")]
    Api { provider: String, status: u16, message: String },

    /// The request never produced a response (connection, TLS, timeout).
    #[error("Request failed ({provider}): {message}")]
    Request { provider: String, message: String },

    /// The response could not be turned into a [`ModelTurn`](crate::ModelTurn).
    #[error("Malformed response ({provider}): {message}")]
    MalformedResponse { provider: String, message: String },

    /// Invalid client configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ModelError {
    /// A short message safe to show to end users. Upstream details stay in
    /// the `Display` output and the logs.
    pub fn user_message(&self) -> &'static str {
        match self {
            ModelError::RateLimited { .. } => "Rate limit exceeded – please try again shortly.",
            ModelError::Authentication { .. } => {
                "The assistant could not authenticate with its language model provider."
            }
            ModelError::QuotaExceeded { .. } => {
                "The assistant has exhausted its language model quota."
            }
            _ => "The assistant failed to generate a response. Please try again.",
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ModelError::RateLimited { .. })
    }
}

/// A convenience result type for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;
