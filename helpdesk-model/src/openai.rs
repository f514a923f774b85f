//! OpenAI chat completions over the REST API.
//!
//! This module is only available when the `openai` feature is enabled.
//! It also works against OpenAI-compatible servers through
//! [`OpenAIChatConfig::with_base_url`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::completion::{
    CompletionModel, CompletionRequest, ModelTurn, PromptMessage, ToolCall, ToolChoice,
    ToolDeclaration,
};
use crate::error::{ModelError, Result};

/// The default OpenAI API base.
pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

const PROVIDER: &str = "OpenAI";

/// Connection settings for [`OpenAIChatModel`].
#[derive(Debug, Clone)]
pub struct OpenAIChatConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: Option<String>,
}

impl OpenAIChatConfig {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self { api_key: api_key.into(), model: model.into(), base_url: None }
    }

    /// Point the client at an OpenAI-compatible server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }
}

/// A [`CompletionModel`] backed by `POST /chat/completions`.
pub struct OpenAIChatModel {
    client: reqwest::Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl OpenAIChatModel {
    pub fn new(config: OpenAIChatConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(ModelError::Config("OpenAI API key must not be empty".into()));
        }
        let base = config.base_url.as_deref().unwrap_or(OPENAI_API_BASE).trim_end_matches('/');

        Ok(Self {
            client: reqwest::Client::new(),
            api_key: config.api_key,
            model: config.model,
            endpoint: format!("{base}/chat/completions"),
        })
    }

    /// Share an existing HTTP client (connection pool) with this model.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }
}

// ── OpenAI API request/response types ──────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<WireTool<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<ToolChoice>,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<WireToolCall<'a>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct WireToolCall<'a> {
    id: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
    function: WireFunctionCall<'a>,
}

#[derive(Debug, Serialize)]
struct WireFunctionCall<'a> {
    name: &'a str,
    arguments: &'a str,
}

#[derive(Debug, Serialize)]
struct WireTool<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    function: &'a ToolDeclaration,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ResponseToolCall>>,
}

#[derive(Deserialize)]
struct ResponseToolCall {
    id: String,
    function: ResponseFunction,
}

#[derive(Deserialize)]
struct ResponseFunction {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
    #[serde(default)]
    code: Option<String>,
}

fn wire_message(message: &PromptMessage) -> WireMessage<'_> {
    match message {
        PromptMessage::Chat(chat) => WireMessage {
            role: chat.role.as_str(),
            content: Some(chat.content.as_str()),
            tool_calls: None,
            tool_call_id: None,
            name: None,
        },
        PromptMessage::ToolCalls { content, calls } => WireMessage {
            role: "assistant",
            content: content.as_deref(),
            tool_calls: Some(
                calls
                    .iter()
                    .map(|call| WireToolCall {
                        id: &call.id,
                        kind: "function",
                        function: WireFunctionCall { name: &call.name, arguments: &call.arguments },
                    })
                    .collect(),
            ),
            tool_call_id: None,
            name: None,
        },
        PromptMessage::ToolResult { call_id, name, content } => WireMessage {
            role: "tool",
            content: Some(content.as_str()),
            tool_calls: None,
            tool_call_id: Some(call_id.as_str()),
            name: Some(name.as_str()),
        },
    }
}

fn build_request<'a>(model: &'a str, request: &'a CompletionRequest) -> ChatRequest<'a> {
    let tools: Vec<WireTool<'a>> =
        request.tools.iter().map(|function| WireTool { kind: "function", function }).collect();
    let tool_choice = if tools.is_empty() { None } else { request.tool_choice };

    ChatRequest {
        model,
        messages: request.messages.iter().map(wire_message).collect(),
        tools,
        tool_choice,
    }
}

fn parse_response(body: &str) -> Result<ModelTurn> {
    let response: ChatResponse = serde_json::from_str(body).map_err(|e| {
        ModelError::MalformedResponse {
            provider: PROVIDER.into(),
            message: format!("failed to parse response: {e}"),
        }
    })?;

    let choice = response.choices.into_iter().next().ok_or_else(|| {
        ModelError::MalformedResponse {
            provider: PROVIDER.into(),
            message: "response contained no choices".into(),
        }
    })?;

    let ResponseMessage { content, tool_calls } = choice.message;
    let calls: Vec<ToolCall> = tool_calls
        .unwrap_or_default()
        .into_iter()
        .map(|call| ToolCall {
            id: call.id,
            name: call.function.name,
            arguments: call.function.arguments,
        })
        .collect();

    if calls.is_empty() {
        Ok(ModelTurn::Answer { content })
    } else {
        Ok(ModelTurn::ToolRequest { content, calls })
    }
}

fn classify_error(status: u16, body: &str) -> ModelError {
    let (message, code) = match serde_json::from_str::<ErrorResponse>(body) {
        Ok(e) => (e.error.message, e.error.code),
        Err(_) => (body.to_string(), None),
    };
    let provider = PROVIDER.to_string();

    match (status, code.as_deref()) {
        (_, Some("insufficient_quota")) => ModelError::QuotaExceeded { provider, message },
        (429, _) | (_, Some("rate_limit_exceeded")) => {
            ModelError::RateLimited { provider, message }
        }
        (401, _) | (_, Some("invalid_api_key")) => ModelError::Authentication { provider, message },
        _ => ModelError::Api { provider, status, message },
    }
}

// ── CompletionModel implementation ─────────────────────────────────

#[async_trait]
impl CompletionModel for OpenAIChatModel {
    fn name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: CompletionRequest) -> Result<ModelTurn> {
        debug!(
            provider = PROVIDER,
            model = %self.model,
            messages = request.messages.len(),
            tools = request.tools.len(),
            "chat completion"
        );

        let body = build_request(&self.model, &request);

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = PROVIDER, error = %e, "request failed");
                ModelError::Request { provider: PROVIDER.into(), message: e.to_string() }
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            error!(provider = PROVIDER, error = %e, "failed to read response body");
            ModelError::Request { provider: PROVIDER.into(), message: e.to_string() }
        })?;

        if !status.is_success() {
            error!(provider = PROVIDER, %status, "API error");
            return Err(classify_error(status.as_u16(), &text));
        }

        parse_response(&text)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::message::ChatMessage;

    fn search_tool() -> ToolDeclaration {
        ToolDeclaration {
            name: "search_bio".into(),
            description: "search".into(),
            parameters: json!({ "type": "object" }),
        }
    }

    #[test]
    fn plain_request_omits_tools_and_choice() {
        let request = CompletionRequest::new(vec![
            ChatMessage::system("be brief").into(),
            ChatMessage::user("hi").into(),
        ]);
        let body = serde_json::to_value(build_request("gpt-5-mini", &request)).unwrap();

        assert_eq!(
            body,
            json!({
                "model": "gpt-5-mini",
                "messages": [
                    { "role": "system", "content": "be brief" },
                    { "role": "user", "content": "hi" }
                ]
            })
        );
    }

    #[test]
    fn follow_up_request_carries_tool_turns() {
        let call =
            ToolCall { id: "call_1".into(), name: "search_bio".into(), arguments: "{}".into() };
        let request = CompletionRequest::new(vec![
            ChatMessage::user("pricing?").into(),
            PromptMessage::ToolCalls { content: None, calls: vec![call] },
            PromptMessage::ToolResult {
                call_id: "call_1".into(),
                name: "search_bio".into(),
                content: "Starter is $29".into(),
            },
        ])
        .with_tools(vec![search_tool()], ToolChoice::None);

        let body = serde_json::to_value(build_request("o4-mini", &request)).unwrap();

        assert_eq!(body["tool_choice"], "none");
        assert_eq!(body["tools"][0]["type"], "function");
        assert_eq!(body["tools"][0]["function"]["name"], "search_bio");
        assert_eq!(body["messages"][1]["content"], serde_json::Value::Null);
        assert_eq!(body["messages"][1]["tool_calls"][0]["function"]["arguments"], "{}");
        assert_eq!(body["messages"][2]["role"], "tool");
        assert_eq!(body["messages"][2]["tool_call_id"], "call_1");
        assert_eq!(body["messages"][2]["name"], "search_bio");
    }

    #[test]
    fn parses_direct_answer() {
        let turn = parse_response(
            r#"{"choices":[{"message":{"role":"assistant","content":"Hello!"}}]}"#,
        )
        .unwrap();
        assert_eq!(turn, ModelTurn::answer("Hello!"));
    }

    #[test]
    fn parses_null_content_as_answer_without_text() {
        let turn =
            parse_response(r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#)
                .unwrap();
        assert_eq!(turn, ModelTurn::Answer { content: None });
    }

    #[test]
    fn parses_tool_calls() {
        let body = json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_9",
                        "type": "function",
                        "function": { "name": "search_bio", "arguments": "{\"query\":\"pricing\"}" }
                    }]
                }
            }]
        });
        let turn = parse_response(&body.to_string()).unwrap();
        let call = turn.first_call().unwrap();
        assert_eq!(call.id, "call_9");
        assert_eq!(call.arguments, r#"{"query":"pricing"}"#);
    }

    #[test]
    fn empty_choices_is_malformed() {
        let err = parse_response(r#"{"choices":[]}"#).unwrap_err();
        assert!(matches!(err, ModelError::MalformedResponse { .. }));
    }

    #[test]
    fn classifies_upstream_failures() {
        let quota = r#"{"error":{"message":"no credit","code":"insufficient_quota"}}"#;
        assert!(matches!(classify_error(429, quota), ModelError::QuotaExceeded { .. }));

        let limited = r#"{"error":{"message":"slow down","code":"rate_limit_exceeded"}}"#;
        assert!(matches!(classify_error(429, limited), ModelError::RateLimited { .. }));

        let auth = r#"{"error":{"message":"bad key","code":"invalid_api_key"}}"#;
        assert!(matches!(classify_error(401, auth), ModelError::Authentication { .. }));

        match classify_error(503, "upstream unavailable") {
            ModelError::Api { status, message, .. } => {
                assert_eq!(status, 503);
                assert_eq!(message, "upstream unavailable");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn empty_api_key_is_rejected() {
        assert!(OpenAIChatModel::new(OpenAIChatConfig::new("", "gpt-5-mini")).is_err());
    }
}
