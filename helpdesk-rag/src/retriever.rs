//! Retriever: embed → search → filter → map.
//!
//! The [`Retriever`] composes an [`EmbeddingProvider`], a [`VectorStore`],
//! and an optional [`QueryTransform`] into the read path of the assistant.
//!
//! # Example
//!
//! ```rust,ignore
//! use helpdesk_rag::{Retriever, RetrievalConfig, InMemoryVectorStore};
//!
//! let retriever = Retriever::builder()
//!     .config(RetrievalConfig::default())
//!     .embedding_provider(Arc::new(my_embedder))
//!     .vector_store(Arc::new(InMemoryVectorStore::new()))
//!     .build()?;
//!
//! let documents = retriever.retrieve("How do I reset my API key?").await?;
//! ```

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::config::RetrievalConfig;
use crate::document::RetrievedDocument;
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::transform::QueryTransform;
use crate::vectorstore::VectorStore;

/// Finds the stored chunks most relevant to a question.
///
/// Construct one via [`Retriever::builder()`]. A retriever holds only
/// shared handles and read-only configuration, so it is cheap to clone and
/// safe to use from concurrent requests.
#[derive(Clone)]
pub struct Retriever {
    config: RetrievalConfig,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    vector_store: Arc<dyn VectorStore>,
    query_transform: Option<Arc<dyn QueryTransform>>,
}

impl Retriever {
    /// Create a new [`RetrieverBuilder`].
    pub fn builder() -> RetrieverBuilder {
        RetrieverBuilder::default()
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    pub fn embedding_provider(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.embedding_provider
    }

    pub fn vector_store(&self) -> &Arc<dyn VectorStore> {
        &self.vector_store
    }

    /// A retriever sharing this one's clients but using another configuration.
    pub fn with_config(&self, config: RetrievalConfig) -> Self {
        Self { config, ..self.clone() }
    }

    /// Retrieve documents for `query`.
    ///
    /// Returns documents ordered by descending score, all with
    /// `score >= min_score`. An empty or whitespace-only query returns no
    /// documents without calling the embedding provider. Zero results is a
    /// valid outcome, not an error.
    ///
    /// # Errors
    ///
    /// Propagates [`RagError::Transform`], [`RagError::Embedding`], and
    /// [`RagError::Search`] unchanged. Returns [`RagError::DimensionMismatch`]
    /// when the query embedding's length differs from the provider's declared
    /// dimensionality or from the indexed vectors.
    pub async fn retrieve(&self, query: &str) -> Result<Vec<RetrievedDocument>> {
        if query.trim().is_empty() {
            debug!("empty query, skipping retrieval");
            return Ok(Vec::new());
        }

        // 1. Optional rewrite
        let query = match &self.query_transform {
            Some(transform) => transform.transform(query).await?,
            None => query.to_string(),
        };

        // 2. Embed the query
        let embedding = self.embedding_provider.embed(&query).await.map_err(|e| {
            error!(error = %e, "embedding failed during retrieval");
            e
        })?;
        let expected = self.embedding_provider.dimensions();
        if embedding.len() != expected {
            error!(expected, actual = embedding.len(), "query embedding has the wrong dimension");
            return Err(RagError::DimensionMismatch {
                id: "query".to_string(),
                expected,
                actual: embedding.len(),
            });
        }

        // 3. Search the vector store
        let namespace = self.config.namespace.as_deref();
        let matches = self
            .vector_store
            .query(&embedding, self.config.top_k, namespace)
            .await
            .map_err(|e| {
                let backend = self.vector_store.backend();
                error!(backend, namespace, error = %e, "vector search failed");
                e
            })?;

        // 4. Filter by score threshold
        let min_score = self.config.min_score;
        let best_score = matches.iter().map(|m| m.score).reduce(f32::max);
        let documents: Vec<RetrievedDocument> = matches
            .into_iter()
            .filter(|m| m.score >= min_score)
            .map(RetrievedDocument::from)
            .collect();

        if documents.is_empty() {
            if let Some(best_score) = best_score {
                warn!(best_score, min_score, "all matches fell below the score threshold");
            }
        }

        info!(
            result_count = documents.len(),
            top_k = self.config.top_k,
            min_score,
            "retrieval completed"
        );

        Ok(documents)
    }
}

/// Builder for constructing a [`Retriever`].
///
/// `embedding_provider` and `vector_store` are required; `config` defaults
/// to [`RetrievalConfig::default()`] and `query_transform` is optional.
#[derive(Default)]
pub struct RetrieverBuilder {
    config: Option<RetrievalConfig>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    vector_store: Option<Arc<dyn VectorStore>>,
    query_transform: Option<Arc<dyn QueryTransform>>,
}

impl RetrieverBuilder {
    pub fn config(mut self, config: RetrievalConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    pub fn vector_store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.vector_store = Some(store);
        self
    }

    /// Set an optional query rewrite stage.
    pub fn query_transform(mut self, transform: Arc<dyn QueryTransform>) -> Self {
        self.query_transform = Some(transform);
        self
    }

    /// Build the [`Retriever`].
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if a required component is missing.
    pub fn build(self) -> Result<Retriever> {
        let embedding_provider = self
            .embedding_provider
            .ok_or_else(|| RagError::Config("embedding_provider is required".to_string()))?;
        let vector_store = self
            .vector_store
            .ok_or_else(|| RagError::Config("vector_store is required".to_string()))?;

        Ok(Retriever {
            config: self.config.unwrap_or_default(),
            embedding_provider,
            vector_store,
            query_transform: self.query_transform,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inmemory::InMemoryVectorStore;

    struct UnitEmbedder;

    #[async_trait::async_trait]
    impl EmbeddingProvider for UnitEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(vec![1.0, 0.0])
        }

        fn dimensions(&self) -> usize {
            2
        }
    }

    #[test]
    fn builder_requires_components() {
        let err = Retriever::builder().build().err().unwrap();
        assert!(err.to_string().contains("embedding_provider is required"));

        let err =
            Retriever::builder().embedding_provider(Arc::new(UnitEmbedder)).build().err().unwrap();
        assert!(err.to_string().contains("vector_store is required"));
    }

    #[test]
    fn builder_defaults_config() {
        let retriever = Retriever::builder()
            .embedding_provider(Arc::new(UnitEmbedder))
            .vector_store(Arc::new(InMemoryVectorStore::new()))
            .build()
            .unwrap();
        assert_eq!(retriever.config(), &RetrievalConfig::default());

        let relaxed =
            retriever.with_config(RetrievalConfig { min_score: 0.0, ..RetrievalConfig::default() });
        assert_eq!(relaxed.config().min_score, 0.0);
        assert_eq!(retriever.config().min_score, 0.25);
    }
}
