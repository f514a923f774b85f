//! Tool-calling replies: the model decides whether to search.
//!
//! One turn makes at most two completion calls. The first offers the
//! `search_bio` tool with `tool_choice: auto`; if the model asks for it, the
//! search runs and a follow-up call with `tool_choice: none` produces the
//! final reply. Only the first requested call is honoured.

use std::sync::Arc;

use helpdesk_model::{
    ChatMessage, CompletionModel, CompletionRequest, ModelTurn, PromptMessage, ToolChoice,
};
use tracing::{Instrument, info, info_span, instrument, warn};

use crate::error::{AgentError, Result};
use crate::tool::{SEARCH_TOOL_NAME, SearchTool};

/// Conversational assistant that consults the knowledge base on demand.
pub struct ToolCallingAgent {
    model: Arc<dyn CompletionModel>,
    tool: SearchTool,
    system_prompt: String,
}

impl ToolCallingAgent {
    pub fn new(
        model: Arc<dyn CompletionModel>,
        tool: SearchTool,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self { model, tool, system_prompt: system_prompt.into() }
    }

    /// Produce the assistant's next message for `messages`.
    ///
    /// A null message body from the model is returned as `""`.
    ///
    /// # Errors
    ///
    /// [`AgentError::EmptyConversation`] for an empty message list and
    /// [`AgentError::Generation`] when either completion call fails. Search
    /// failures never surface; the tool degrades to its no-context message.
    #[instrument(name = "agent.reply", skip_all, fields(messages = messages.len()))]
    pub async fn reply(&self, messages: &[ChatMessage]) -> Result<String> {
        if messages.is_empty() {
            return Err(AgentError::EmptyConversation);
        }

        let mut prompt: Vec<PromptMessage> = Vec::with_capacity(messages.len() + 3);
        prompt.push(ChatMessage::system(self.system_prompt.clone()).into());
        prompt.extend(messages.iter().cloned().map(PromptMessage::from));

        let first = self
            .model
            .complete(
                CompletionRequest::new(prompt.clone())
                    .with_tools(vec![self.tool.declaration()], ToolChoice::Auto),
            )
            .instrument(info_span!("agent.first_call", model = self.model.name()))
            .await?;

        let Some(call) = first.first_call() else {
            info!("model answered directly");
            return Ok(first.text().to_string());
        };
        let mut call = call.clone();
        if let ModelTurn::ToolRequest { calls, .. } = &first {
            if calls.len() > 1 {
                let requested = calls.len();
                warn!(requested, "model requested several tool calls, honouring the first");
            }
        }
        // The echoed call must name the tool whose result follows it.
        if call.name != SEARCH_TOOL_NAME {
            warn!(tool = %call.name, "model called an undeclared tool, running {SEARCH_TOOL_NAME}");
            call.name = SEARCH_TOOL_NAME.to_string();
        }
        let (ModelTurn::Answer { content } | ModelTurn::ToolRequest { content, .. }) = first;

        let query = SearchTool::parse_arguments(&call.arguments);
        let result =
            self.tool.run(&query).instrument(info_span!("agent.search", query = %query)).await;

        let call_id = call.id.clone();
        prompt.push(PromptMessage::ToolCalls { content, calls: vec![call] });
        prompt.push(PromptMessage::ToolResult {
            call_id,
            name: SEARCH_TOOL_NAME.to_string(),
            content: result,
        });

        let followup = self
            .model
            .complete(
                CompletionRequest::new(prompt)
                    .with_tools(vec![self.tool.declaration()], ToolChoice::None),
            )
            .instrument(info_span!("agent.followup_call", model = self.model.name()))
            .await?;

        Ok(followup.text().to_string())
    }
}
