use axum::{Json, body::Bytes, extract::State};
use helpdesk_agent::RagAnswer;
use helpdesk_model::ChatMessage;
use serde::Deserialize;
use tracing::info;

use super::parse_body;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub conversation_history: Vec<ChatMessage>,
}

/// POST /api/chat
///
/// Retrieval-first answer with the sources it was grounded on.
pub async fn chat(State(state): State<AppState>, body: Bytes) -> Result<Json<RagAnswer>, ApiError> {
    let request: ChatRequest = parse_body(&body)?;
    if request.message.trim().is_empty() {
        return Err(ApiError::Validation("message must not be empty".to_string()));
    }

    info!(history = request.conversation_history.len(), "chat request");
    let answer = state
        .assistant
        .direct()
        .answer(&request.message, &request.conversation_history)
        .await?;
    Ok(Json(answer))
}
