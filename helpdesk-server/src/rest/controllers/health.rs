use axum::{Json, response::IntoResponse};
use serde_json::json;

/// GET /api/health
pub async fn health() -> impl IntoResponse {
    Json(json!({"status": "ok", "service": "helpdesk"}))
}
