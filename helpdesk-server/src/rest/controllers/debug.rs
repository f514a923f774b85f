use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use helpdesk_telemetry::SpanData;

use crate::error::ErrorBody;
use crate::state::AppState;

/// GET /api/debug/trace/{request_id}
///
/// Spans captured for one request, in closing order.
pub async fn request_trace(
    Path(request_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Vec<SpanData>>, (StatusCode, Json<ErrorBody>)> {
    state.traces.get_trace(&request_id).map(Json).ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            Json(ErrorBody { error: format!("No trace recorded for request '{request_id}'") }),
        )
    })
}
