use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use helpdesk_agent::{Assistant, Settings};
use helpdesk_model::{MockCompletionModel, ModelError, ModelTurn, ToolCall};
use helpdesk_rag::{EmbeddingProvider, InMemoryVectorStore};
use helpdesk_server::{AppState, REQUEST_ID_HEADER, ServerConfig, app_router};
use helpdesk_telemetry::{InMemoryTraceLayer, SharedTraceStorage};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
use tracing_subscriber::layer::SubscriberExt;

struct FixedEmbedder;

#[async_trait]
impl EmbeddingProvider for FixedEmbedder {
    async fn embed(&self, _text: &str) -> helpdesk_rag::Result<Vec<f32>> {
        Ok(vec![1.0, 0.0])
    }

    fn dimensions(&self) -> usize {
        2
    }
}

fn settings() -> Settings {
    Settings::from_lookup(|key| match key {
        "OPENAI_API_KEY" => Some("sk-test".into()),
        "PINECONE_API_KEY" => Some("pc-test".into()),
        "PINECONE_INDEX_NAME" => Some("test-index".into()),
        _ => None,
    })
    .expect("test settings")
}

async fn seeded_store() -> Arc<InMemoryVectorStore> {
    let store = Arc::new(InMemoryVectorStore::new());
    let metadata = json!({
        "text": "Exports are available under Settings > Data.",
        "source": "export.md",
        "section": "data"
    });
    let metadata = metadata.as_object().cloned().unwrap_or_default();
    store
        .insert_raw(None, "export_0", vec![1.0, 0.0], metadata)
        .await
        .expect("seed vector");
    store
}

struct Harness {
    app: Router,
    answer_model: Arc<MockCompletionModel>,
    agent_model: Arc<MockCompletionModel>,
    traces: Arc<SharedTraceStorage>,
}

async fn harness(answer_model: MockCompletionModel, agent_model: MockCompletionModel) -> Harness {
    let answer_model = Arc::new(answer_model);
    let agent_model = Arc::new(agent_model);
    let assistant = Assistant::from_parts(
        &settings(),
        answer_model.clone(),
        agent_model.clone(),
        Arc::new(FixedEmbedder),
        seeded_store().await,
    )
    .expect("assistant");

    let traces = Arc::new(SharedTraceStorage::new());
    let state = AppState::new(Arc::new(assistant), traces.clone());
    Harness { app: app_router(state, &ServerConfig::default()), answer_model, agent_model, traces }
}

fn post(uri: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.into())
        .expect("request")
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Option<String>, Value) {
    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let request_id = response
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let bytes = response.into_body().collect().await.expect("body").to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, request_id, body)
}

#[tokio::test]
async fn health_reports_ok_with_request_id() {
    let h = harness(MockCompletionModel::new("answer"), MockCompletionModel::new("agent")).await;

    let request = Request::builder().uri("/api/health").body(Body::empty()).expect("request");
    let (status, request_id, body) = send(&h.app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(request_id.is_some_and(|id| !id.is_empty()));
}

#[tokio::test]
async fn caller_request_id_is_echoed() {
    let h = harness(MockCompletionModel::new("answer"), MockCompletionModel::new("agent")).await;

    let request = Request::builder()
        .uri("/api/health")
        .header(REQUEST_ID_HEADER, "caller-42")
        .body(Body::empty())
        .expect("request");
    let (_, request_id, _) = send(&h.app, request).await;

    assert_eq!(request_id.as_deref(), Some("caller-42"));
}

#[tokio::test]
async fn chat_returns_answer_and_sources() {
    let h = harness(
        MockCompletionModel::new("answer").with_turn(ModelTurn::answer("Go to Settings > Data.")),
        MockCompletionModel::new("agent"),
    )
    .await;

    let body = json!({
        "message": "How do I export?",
        "conversationHistory": [
            { "role": "user", "content": "Hi" },
            { "role": "assistant", "content": "Hello! How can I help?" }
        ]
    });
    let (status, request_id, body) = send(&h.app, post("/api/chat", body.to_string())).await;

    assert_eq!(status, StatusCode::OK);
    assert!(request_id.is_some());
    assert_eq!(body["answer"], "Go to Settings > Data.");
    assert_eq!(body["sources"][0]["source"], "export.md");
    assert_eq!(h.answer_model.call_count(), 1);
}

#[tokio::test]
async fn chat_rejects_invalid_json() {
    let h = harness(MockCompletionModel::new("answer"), MockCompletionModel::new("agent")).await;

    let (status, request_id, body) = send(&h.app, post("/api/chat", "invalid json {")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Invalid JSON payload" }));
    assert!(request_id.is_some());
    assert_eq!(h.answer_model.call_count(), 0);
}

#[tokio::test]
async fn chat_rejects_blank_message() {
    let h = harness(MockCompletionModel::new("answer"), MockCompletionModel::new("agent")).await;

    let (status, _, body) =
        send(&h.app, post("/api/chat", json!({ "message": "  " }).to_string())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "message must not be empty");
}

#[tokio::test]
async fn assistant_returns_reply() {
    let h = harness(
        MockCompletionModel::new("answer"),
        MockCompletionModel::new("agent").with_turn(ModelTurn::answer("Happy to help.")),
    )
    .await;

    let body = json!({ "messages": [{ "role": "user", "content": "Hello" }] });
    let (status, _, body) = send(&h.app, post("/api/assistant", body.to_string())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "reply": "Happy to help." }));
}

#[tokio::test]
async fn assistant_runs_search_tool() {
    let h = harness(
        MockCompletionModel::new("answer"),
        MockCompletionModel::new("agent")
            .with_turn(ModelTurn::tool_request(ToolCall {
                id: "call_1".into(),
                name: "search_bio".into(),
                arguments: r#"{"query":"export"}"#.into(),
            }))
            .with_turn(ModelTurn::answer("Use Settings > Data.")),
    )
    .await;

    let body = json!({ "messages": [{ "role": "user", "content": "How do I export?" }] });
    let (status, _, body) = send(&h.app, post("/api/assistant", body.to_string())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reply"], "Use Settings > Data.");
    assert_eq!(h.agent_model.call_count(), 2);
}

#[tokio::test]
async fn assistant_validation_failures() {
    let h = harness(MockCompletionModel::new("answer"), MockCompletionModel::new("agent")).await;

    let empty = json!({ "messages": [] });
    let (status, _, body) = send(&h.app, post("/api/assistant", empty.to_string())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "No messages provided" }));

    let (status, _, body) = send(&h.app, post("/api/assistant", "{}")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().is_some_and(|e| e.contains("messages")));

    let bad_role = json!({ "messages": [{ "role": "tool", "content": "x" }] });
    let (status, _, _) = send(&h.app, post("/api/assistant", bad_role.to_string())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let empty_content = json!({ "messages": [{ "role": "user", "content": "" }] });
    let (status, _, body) = send(&h.app, post("/api/assistant", empty_content.to_string())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "messages[0].content must not be empty");

    assert_eq!(h.agent_model.call_count(), 0);
}

#[tokio::test]
async fn rate_limit_maps_to_429() {
    let h = harness(
        MockCompletionModel::new("answer"),
        MockCompletionModel::new("agent").with_error(ModelError::RateLimited {
            provider: "OpenAI".into(),
            message: "org quota details".into(),
        }),
    )
    .await;

    let body = json!({ "messages": [{ "role": "user", "content": "Hello" }] });
    let (status, _, body) = send(&h.app, post("/api/assistant", body.to_string())).await;

    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    let error = body["error"].as_str().unwrap_or_default();
    assert!(!error.is_empty());
    assert!(!error.contains("org quota details"));
}

#[tokio::test]
async fn generation_failure_maps_to_500() {
    let h = harness(
        MockCompletionModel::new("answer").with_error(ModelError::Request {
            provider: "OpenAI".into(),
            message: "connection reset".into(),
        }),
        MockCompletionModel::new("agent"),
    )
    .await;

    let (status, _, body) =
        send(&h.app, post("/api/chat", json!({ "message": "How do I export?" }).to_string())).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!body["error"].as_str().unwrap_or_default().contains("connection reset"));
}

#[tokio::test]
async fn pipeline_trace_is_available_by_request_id() {
    let h = harness(
        MockCompletionModel::new("answer").with_turn(ModelTurn::answer("Go to Settings > Data.")),
        MockCompletionModel::new("agent"),
    )
    .await;
    let subscriber = tracing_subscriber::registry().with(InMemoryTraceLayer::new(h.traces.clone()));
    let _guard = tracing::subscriber::set_default(subscriber);

    let (status, request_id, _) =
        send(&h.app, post("/api/chat", json!({ "message": "How do I export?" }).to_string())).await;
    assert_eq!(status, StatusCode::OK);
    let request_id = request_id.expect("request id");

    let request = Request::builder()
        .uri(format!("/api/debug/trace/{request_id}"))
        .body(Body::empty())
        .expect("request");
    let (status, _, spans) = send(&h.app, request).await;

    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = spans
        .as_array()
        .map(|spans| spans.iter().filter_map(|s| s["name"].as_str()).collect())
        .unwrap_or_default();
    assert!(names.contains(&"rag.answer"), "{names:?}");
    assert!(names.contains(&"rag.retrieve"), "{names:?}");
    assert!(names.contains(&"rag.generate"), "{names:?}");
}

#[tokio::test]
async fn unknown_trace_is_404() {
    let h = harness(MockCompletionModel::new("answer"), MockCompletionModel::new("agent")).await;

    let request =
        Request::builder().uri("/api/debug/trace/nope").body(Body::empty()).expect("request");
    let (status, _, body) = send(&h.app, request).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().is_some());
}
