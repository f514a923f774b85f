//! Error types for the `helpdesk-rag` crate.

use thiserror::Error;

/// Errors that can occur in retrieval and indexing.
#[derive(Debug, Error)]
pub enum RagError {
    /// The embedding service failed or returned malformed data.
    #[error("Embedding error ({provider}): {message}")]
    Embedding {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The vector database failed.
    #[error("Search error ({backend}): {message}")]
    Search {
        /// The vector store backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// A vector does not have the dimensionality of the embedding model or
    /// of the vectors already in the index.
    ///
    /// The index and the embedding model disagree; retrieval cannot work
    /// until the configuration is fixed. `id` is the chunk id, or `query`
    /// for a query embedding.
    #[error("Embedding dimension mismatch for '{id}': expected {expected}, got {actual}")]
    DimensionMismatch { id: String, expected: usize, actual: usize },

    /// The query transform stage failed.
    #[error("Query transform error: {0}")]
    Transform(String),

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl RagError {
    pub(crate) fn search(backend: &str, message: impl Into<String>) -> Self {
        RagError::Search { backend: backend.to_string(), message: message.into() }
    }

    pub(crate) fn embedding(provider: &str, message: impl Into<String>) -> Self {
        RagError::Embedding { provider: provider.to_string(), message: message.into() }
    }
}

/// A convenience result type for RAG operations.
pub type Result<T> = std::result::Result<T, RagError>;
