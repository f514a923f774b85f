//! Completion requests, model turns, and the [`CompletionModel`] trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::message::ChatMessage;

/// A function the model may ask the caller to run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDeclaration {
    pub name: String,
    pub description: String,
    /// JSON schema of the tool arguments.
    pub parameters: Value,
}

/// Whether the model may call a tool on this request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolChoice {
    /// The model decides between answering and calling a tool.
    Auto,
    /// The model must answer; tool calls are not allowed.
    None,
}

/// A tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    /// Raw JSON-encoded arguments, exactly as the model produced them.
    pub arguments: String,
}

/// A message sent to the completion service.
///
/// Besides plain chat turns, a follow-up request after a tool call carries
/// the assistant's tool-call turn and the tool's result.
#[derive(Debug, Clone, PartialEq)]
pub enum PromptMessage {
    Chat(ChatMessage),
    ToolCalls { content: Option<String>, calls: Vec<ToolCall> },
    ToolResult { call_id: String, name: String, content: String },
}

impl From<ChatMessage> for PromptMessage {
    fn from(message: ChatMessage) -> Self {
        PromptMessage::Chat(message)
    }
}

/// A single chat-completion request.
///
/// A request without tools is a plain completion; `tool_choice` is only
/// sent when tools are declared.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompletionRequest {
    pub messages: Vec<PromptMessage>,
    pub tools: Vec<ToolDeclaration>,
    pub tool_choice: Option<ToolChoice>,
}

impl CompletionRequest {
    pub fn new(messages: Vec<PromptMessage>) -> Self {
        Self { messages, ..Default::default() }
    }

    pub fn with_tools(mut self, tools: Vec<ToolDeclaration>, choice: ToolChoice) -> Self {
        self.tools = tools;
        self.tool_choice = Some(choice);
        self
    }
}

/// What the model produced for one request.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelTurn {
    /// The model answered directly. `content` is `None` when the service
    /// returned a null message body.
    Answer { content: Option<String> },
    /// The model asked for one or more tool invocations.
    ToolRequest { content: Option<String>, calls: Vec<ToolCall> },
}

impl ModelTurn {
    pub fn answer(content: impl Into<String>) -> Self {
        ModelTurn::Answer { content: Some(content.into()) }
    }

    pub fn tool_request(call: ToolCall) -> Self {
        ModelTurn::ToolRequest { content: None, calls: vec![call] }
    }

    /// Message content, with a null body read as the empty string.
    pub fn text(&self) -> &str {
        match self {
            ModelTurn::Answer { content } | ModelTurn::ToolRequest { content, .. } => {
                content.as_deref().unwrap_or_default()
            }
        }
    }

    /// The first requested tool call, if any. Additional calls are ignored
    /// by callers that support a single tool round.
    pub fn first_call(&self) -> Option<&ToolCall> {
        match self {
            ModelTurn::Answer { .. } => None,
            ModelTurn::ToolRequest { calls, .. } => calls.first(),
        }
    }
}

/// A chat-completion backend.
#[async_trait]
pub trait CompletionModel: Send + Sync {
    /// Model identifier used for requests.
    fn name(&self) -> &str;

    /// Run one completion. No retries are performed.
    async fn complete(&self, request: CompletionRequest) -> Result<ModelTurn>;
}
