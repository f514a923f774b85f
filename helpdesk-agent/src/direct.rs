//! Direct RAG: retrieve → assemble → generate.
//!
//! Every question is answered from retrieved documentation. When nothing
//! relevant is found the configured no-results message is returned without
//! calling the model.

use std::sync::Arc;

use helpdesk_model::{ChatMessage, CompletionModel, CompletionRequest, PromptMessage};
use helpdesk_rag::{ContextAssembler, ConversationWindow, Retriever, SourcePreview};
use serde::{Deserialize, Serialize};
use tracing::{Instrument, debug, info, info_span, instrument, warn};

use crate::error::{AgentError, ConfigError, Result};
use crate::prompt::{DEFAULT_FALLBACK_MESSAGE, DEFAULT_NO_RESULTS_MESSAGE, DEFAULT_SYSTEM_PROMPT};
use crate::settings::DEFAULT_MAX_HISTORY;

/// An answer with the documents it was grounded on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RagAnswer {
    pub answer: String,
    pub sources: Vec<SourcePreview>,
}

/// Answers questions strictly from retrieved context.
///
/// # Example
///
/// ```rust,ignore
/// let agent = DirectRagAgent::builder()
///     .retriever(retriever)
///     .model(Arc::new(chat_model))
///     .max_history(4)
///     .build()?;
///
/// let reply = agent.answer("How do I reset my API key?", &history).await?;
/// ```
pub struct DirectRagAgent {
    retriever: Retriever,
    model: Arc<dyn CompletionModel>,
    assembler: ContextAssembler,
    max_history: usize,
    no_results_message: String,
    fallback_message: String,
}

impl DirectRagAgent {
    pub fn builder() -> DirectRagAgentBuilder {
        DirectRagAgentBuilder::default()
    }

    pub fn retriever(&self) -> &Retriever {
        &self.retriever
    }

    /// Answer `query` given the earlier conversation.
    ///
    /// Only the last `max_history` messages of `history` are sent to the
    /// model; `history` itself is not modified.
    ///
    /// # Errors
    ///
    /// Retrieval and generation failures are returned as-is; no fallback
    /// answer is fabricated for them.
    #[instrument(
        name = "rag.answer",
        skip_all,
        fields(query_len = query.len(), history = history.len())
    )]
    pub async fn answer(&self, query: &str, history: &[ChatMessage]) -> Result<RagAnswer> {
        let documents =
            self.retriever.retrieve(query).instrument(info_span!("rag.retrieve")).await?;

        if documents.is_empty() {
            self.warn_if_index_empty().await;
            info!("no relevant documents, returning no-results message");
            return Ok(RagAnswer { answer: self.no_results_message.clone(), sources: Vec::new() });
        }

        let system_prompt = info_span!("rag.assemble", documents = documents.len())
            .in_scope(|| self.assembler.system_prompt(&documents));

        let window = ConversationWindow::last(history, self.max_history);
        let mut messages: Vec<PromptMessage> = Vec::with_capacity(window.len() + 2);
        messages.push(ChatMessage::system(system_prompt).into());
        messages.extend(window.iter().cloned().map(PromptMessage::from));
        messages.push(ChatMessage::user(query).into());

        let turn = self
            .model
            .complete(CompletionRequest::new(messages))
            .instrument(info_span!("rag.generate", model = self.model.name()))
            .await?;

        let answer = match turn.text().trim() {
            "" => {
                warn!("model returned an empty answer, using fallback message");
                self.fallback_message.clone()
            }
            text => text.to_string(),
        };

        let sources = documents.iter().map(SourcePreview::from).collect();
        Ok(RagAnswer { answer, sources })
    }

    async fn warn_if_index_empty(&self) {
        let store = self.retriever.vector_store();
        match store.describe().await {
            Ok(stats) if stats.total_vectors == 0 => {
                warn!(backend = store.backend(), "vector index is empty; run the indexer first");
            }
            Ok(_) => {}
            Err(e) => debug!(error = %e, "could not describe vector index"),
        }
    }
}

/// Builder for [`DirectRagAgent`].
///
/// `retriever` and `model` are required; the prompt and messages default to
/// the built-in ones.
#[derive(Default)]
pub struct DirectRagAgentBuilder {
    retriever: Option<Retriever>,
    model: Option<Arc<dyn CompletionModel>>,
    system_prompt: Option<String>,
    max_history: Option<usize>,
    no_results_message: Option<String>,
    fallback_message: Option<String>,
}

impl DirectRagAgentBuilder {
    pub fn retriever(mut self, retriever: Retriever) -> Self {
        self.retriever = Some(retriever);
        self
    }

    pub fn model(mut self, model: Arc<dyn CompletionModel>) -> Self {
        self.model = Some(model);
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn max_history(mut self, max: usize) -> Self {
        self.max_history = Some(max);
        self
    }

    pub fn no_results_message(mut self, message: impl Into<String>) -> Self {
        self.no_results_message = Some(message.into());
        self
    }

    pub fn fallback_message(mut self, message: impl Into<String>) -> Self {
        self.fallback_message = Some(message.into());
        self
    }

    pub fn build(self) -> Result<DirectRagAgent> {
        let retriever = self
            .retriever
            .ok_or_else(|| AgentError::Config(ConfigError::new("retriever is required")))?;
        let model =
            self.model.ok_or_else(|| AgentError::Config(ConfigError::new("model is required")))?;

        Ok(DirectRagAgent {
            retriever,
            model,
            assembler: ContextAssembler::new(
                self.system_prompt.unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
            ),
            max_history: self.max_history.unwrap_or(DEFAULT_MAX_HISTORY),
            no_results_message: self
                .no_results_message
                .unwrap_or_else(|| DEFAULT_NO_RESULTS_MESSAGE.to_string()),
            fallback_message: self
                .fallback_message
                .unwrap_or_else(|| DEFAULT_FALLBACK_MESSAGE.to_string()),
        })
    }
}
