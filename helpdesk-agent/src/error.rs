//! Error types for the `helpdesk-agent` crate.

use helpdesk_model::ModelError;
use helpdesk_rag::RagError;
use thiserror::Error;

/// One or more settings are missing or invalid.
///
/// Every problem found while loading is collected, so a single start-up
/// attempt reports all of them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Configuration errors:\n{}", .problems.join("\n"))]
pub struct ConfigError {
    pub problems: Vec<String>,
}

impl ConfigError {
    pub fn new(problem: impl Into<String>) -> Self {
        Self { problems: vec![problem.into()] }
    }
}

/// Errors returned by the orchestrators.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Embedding or vector search failed while answering directly.
    #[error("Retrieval failed: {0}")]
    Retrieval(#[from] RagError),

    /// The completion service failed.
    #[error("Generation failed: {0}")]
    Generation(#[from] ModelError),

    #[error("No messages provided")]
    EmptyConversation,
}

impl AgentError {
    /// A message safe to return to end users.
    pub fn user_message(&self) -> &'static str {
        match self {
            AgentError::Config(_) => "The assistant is not configured correctly.",
            AgentError::Retrieval(_) => {
                "The knowledge base is unavailable right now. Please try again."
            }
            AgentError::Generation(e) => e.user_message(),
            AgentError::EmptyConversation => "No messages provided",
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, AgentError::Generation(e) if e.is_rate_limited())
    }
}

pub type Result<T> = std::result::Result<T, AgentError>;
