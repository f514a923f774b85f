use axum::{Json, body::Bytes, extract::State};
use helpdesk_model::ChatMessage;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::parse_body;
use crate::error::{ApiError, NO_MESSAGES_MESSAGE};
use crate::state::AppState;

#[derive(Debug, Clone, Deserialize)]
pub struct AssistantRequest {
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantReply {
    pub reply: String,
}

fn validate(request: &AssistantRequest) -> Result<(), ApiError> {
    if request.messages.is_empty() {
        return Err(ApiError::Validation(NO_MESSAGES_MESSAGE.to_string()));
    }
    if let Some(i) = request.messages.iter().position(|m| m.content.is_empty()) {
        return Err(ApiError::Validation(format!("messages[{i}].content must not be empty")));
    }
    Ok(())
}

/// POST /api/assistant
///
/// Tool-calling reply; the model decides whether to search.
pub async fn assistant(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<AssistantReply>, ApiError> {
    let request: AssistantRequest = parse_body(&body)?;
    validate(&request)?;

    info!(messages = request.messages.len(), "assistant request");
    let reply = state.assistant.agentic().reply(&request.messages).await?;
    Ok(Json(AssistantReply { reply }))
}
