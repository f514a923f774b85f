//! Batched indexing of pre-chunked documents.

use std::sync::Arc;

use tracing::{error, info};

use crate::document::DocumentChunk;
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::vectorstore::{IndexStats, VectorStore};

/// Number of chunk texts sent per embedding request.
pub const EMBED_BATCH_SIZE: usize = 20;

/// Number of chunks sent per upsert request.
pub const UPSERT_BATCH_SIZE: usize = 100;

/// Embeds chunks and writes them to a [`VectorStore`].
///
/// Chunks that already carry an embedding are not re-embedded. Every vector
/// is checked against the provider's dimensionality before anything is
/// written, so a model/index mismatch fails the whole run up front.
///
/// # Example
///
/// ```rust,ignore
/// let indexer = Indexer::new(embedder, store).with_namespace("bio");
/// let count = indexer.index(chunks).await?;
/// ```
pub struct Indexer {
    embedding_provider: Arc<dyn EmbeddingProvider>,
    vector_store: Arc<dyn VectorStore>,
    namespace: Option<String>,
    embed_batch_size: usize,
    upsert_batch_size: usize,
}

impl Indexer {
    pub fn new(
        embedding_provider: Arc<dyn EmbeddingProvider>,
        vector_store: Arc<dyn VectorStore>,
    ) -> Self {
        Self {
            embedding_provider,
            vector_store,
            namespace: None,
            embed_batch_size: EMBED_BATCH_SIZE,
            upsert_batch_size: UPSERT_BATCH_SIZE,
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Override the embedding and upsert batch sizes. Zero is treated as one.
    pub fn with_batch_sizes(mut self, embed: usize, upsert: usize) -> Self {
        self.embed_batch_size = embed.max(1);
        self.upsert_batch_size = upsert.max(1);
        self
    }

    /// Embed missing vectors and upsert every chunk. Returns the number of
    /// chunks written.
    ///
    /// # Errors
    ///
    /// - [`RagError::Embedding`] if an embedding batch fails.
    /// - [`RagError::DimensionMismatch`] if any vector has the wrong length;
    ///   nothing is upserted in that case.
    /// - [`RagError::Search`] if an upsert batch fails. Earlier batches stay
    ///   written.
    pub async fn index(&self, mut chunks: Vec<DocumentChunk>) -> Result<usize> {
        if chunks.is_empty() {
            return Ok(0);
        }

        // 1. Embed chunks that have no vector yet
        let pending: Vec<usize> = chunks
            .iter()
            .enumerate()
            .filter(|(_, c)| c.embedding.is_none())
            .map(|(i, _)| i)
            .collect();

        for batch in pending.chunks(self.embed_batch_size) {
            let texts: Vec<&str> = batch.iter().map(|&i| chunks[i].text.as_str()).collect();
            let embeddings = self.embedding_provider.embed_batch(&texts).await.map_err(|e| {
                error!(batch_size = texts.len(), error = %e, "embedding failed during indexing");
                e
            })?;
            if embeddings.len() != batch.len() {
                return Err(RagError::Embedding {
                    provider: "indexer".to_string(),
                    message: format!(
                        "expected {} embeddings, got {}",
                        batch.len(),
                        embeddings.len()
                    ),
                });
            }
            for (&i, embedding) in batch.iter().zip(embeddings) {
                chunks[i].embedding = Some(embedding);
            }
        }
        info!(embedded = pending.len(), total = chunks.len(), "embedded chunks");

        // 2. Validate dimensionality
        let expected = self.embedding_provider.dimensions();
        for chunk in &chunks {
            let actual = chunk.embedding.as_ref().map_or(0, Vec::len);
            if actual != expected {
                error!(chunk.id = %chunk.id, expected, actual, "embedding dimension mismatch");
                return Err(RagError::DimensionMismatch { id: chunk.id.clone(), expected, actual });
            }
        }

        // 3. Upsert in batches
        let namespace = self.namespace.as_deref();
        for batch in chunks.chunks(self.upsert_batch_size) {
            self.vector_store.upsert(namespace, batch).await.map_err(|e| {
                let backend = self.vector_store.backend();
                error!(backend, error = %e, "upsert failed during indexing");
                e
            })?;
        }

        info!(namespace, count = chunks.len(), "indexed chunks");
        Ok(chunks.len())
    }

    /// Remove every vector in this indexer's namespace.
    pub async fn clear(&self) -> Result<()> {
        let namespace = self.namespace.as_deref();
        self.vector_store.delete_all(namespace).await?;
        info!(namespace, "cleared namespace");
        Ok(())
    }

    pub async fn stats(&self) -> Result<IndexStats> {
        self.vector_store.describe().await
    }
}
