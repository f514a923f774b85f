pub mod controllers;

use axum::{
    Router,
    body::Body,
    http::Request,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    map_response_body::MapResponseBodyLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info_span;

use crate::config::ServerConfig;
use crate::state::AppState;
use controllers::{assistant, chat, debug, health};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Every route with its middleware stack.
///
/// Incoming requests get an `x-request-id` (a UUID unless the caller sent
/// one), which is echoed on the response and recorded on the
/// `http.request` span so the pipeline trace can be looked up by it.
pub fn app_router(state: AppState, config: &ServerConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace = TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
        let request_id = request
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        info_span!(
            "http.request",
            request_id = %request_id,
            method = %request.method(),
            path = %request.uri().path(),
        )
    });

    Router::new()
        .route("/api/health", get(health::health))
        .route("/api/chat", post(chat::chat))
        .route("/api/assistant", post(assistant::assistant))
        .route("/api/debug/trace/{request_id}", get(debug::request_trace))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(trace)
                .layer(cors)
                .layer(MapResponseBodyLayer::new(Body::new))
                .layer(RequestBodyLimitLayer::new(config.max_body_bytes))
                .layer(TimeoutLayer::new(config.request_timeout)),
        )
}
