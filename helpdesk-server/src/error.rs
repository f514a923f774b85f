use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use helpdesk_agent::AgentError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

pub const INVALID_JSON_MESSAGE: &str = "Invalid JSON payload";
pub const NO_MESSAGES_MESSAGE: &str = "No messages provided";

/// Failures surfaced to HTTP callers as `{ "error": ... }`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The body is not JSON at all.
    #[error("{INVALID_JSON_MESSAGE}")]
    InvalidJson,

    /// The body is JSON but does not match the request schema.
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Agent(#[from] AgentError),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidJson | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Agent(AgentError::EmptyConversation) => StatusCode::BAD_REQUEST,
            ApiError::Agent(e) if e.is_rate_limited() => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Agent(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message returned to the caller. Upstream error details are logged,
    /// never returned.
    pub fn public_message(&self) -> String {
        match self {
            ApiError::InvalidJson => INVALID_JSON_MESSAGE.to_string(),
            ApiError::Validation(message) => message.clone(),
            ApiError::Agent(e) => e.user_message().to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let ApiError::Agent(e) = &self {
            if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
                error!(error = %e, status = status.as_u16(), "request failed");
            }
        }
        (status, Json(ErrorBody { error: self.public_message() })).into_response()
    }
}
