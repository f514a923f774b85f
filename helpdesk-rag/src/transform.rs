//! Query transform stage applied before embedding.

use std::sync::Arc;

use async_trait::async_trait;
use helpdesk_model::{ChatMessage, CompletionModel, CompletionRequest};
use tracing::{debug, error};

use crate::error::{RagError, Result};

/// Rewrites a user question before it is embedded.
///
/// Implementations can expand abbreviations, resolve pronouns against
/// earlier turns, or translate. The retriever works the same with or
/// without a transform.
#[async_trait]
pub trait QueryTransform: Send + Sync {
    async fn transform(&self, query: &str) -> Result<String>;
}

const REWRITE_INSTRUCTIONS: &str = "Rewrite the user's question as a short, standalone search \
query for a documentation index. Reply with the query only, without quotes or explanation.";

/// A [`QueryTransform`] that asks a completion model to restate the question.
///
/// A blank rewrite falls back to the original query.
///
/// # Example
///
/// ```rust,ignore
/// let rewriter = ModelQueryRewriter::new(Arc::new(chat_model));
/// let retriever = Retriever::builder()
///     .query_transform(Arc::new(rewriter))
///     // ...
///     .build()?;
/// ```
pub struct ModelQueryRewriter {
    model: Arc<dyn CompletionModel>,
    instructions: String,
}

impl ModelQueryRewriter {
    pub fn new(model: Arc<dyn CompletionModel>) -> Self {
        Self { model, instructions: REWRITE_INSTRUCTIONS.to_string() }
    }

    /// Replace the default rewrite instructions.
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }
}

#[async_trait]
impl QueryTransform for ModelQueryRewriter {
    async fn transform(&self, query: &str) -> Result<String> {
        let request = CompletionRequest::new(vec![
            ChatMessage::system(self.instructions.clone()).into(),
            ChatMessage::user(query).into(),
        ]);

        let turn = self.model.complete(request).await.map_err(|e| {
            error!(model = self.model.name(), error = %e, "query rewrite failed");
            RagError::Transform(e.to_string())
        })?;

        let rewritten = turn.text().trim();
        if rewritten.is_empty() {
            debug!("blank rewrite, keeping original query");
            return Ok(query.to_string());
        }

        debug!(original = query, rewritten, "rewrote query");
        Ok(rewritten.to_string())
    }
}
