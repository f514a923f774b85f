pub mod assistant;
pub mod chat;
pub mod debug;
pub mod health;

use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::ApiError;

/// Decode a request body in two steps so that malformed JSON and a schema
/// mismatch produce different errors.
pub(crate) fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    let value: serde_json::Value = serde_json::from_slice(body).map_err(|e| {
        warn!(error = %e, "failed to parse request body");
        ApiError::InvalidJson
    })?;
    serde_json::from_value(value).map_err(|e| ApiError::Validation(e.to_string()))
}
