//! Embedding provider trait.

use async_trait::async_trait;

use crate::error::Result;

/// Turns text into a fixed-length vector.
///
/// Callers reject empty or whitespace-only input before calling
/// [`embed`](EmbeddingProvider::embed); implementations do not retry and
/// report upstream failures as [`RagError::Embedding`](crate::RagError::Embedding).
///
/// # Example
///
/// ```rust,ignore
/// use helpdesk_rag::EmbeddingProvider;
///
/// let vector = provider.embed("How do I reset my API key?").await?;
/// assert_eq!(vector.len(), provider.dimensions());
/// ```
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed several texts, preserving input order.
    ///
    /// Defaults to sequential [`embed`](EmbeddingProvider::embed) calls;
    /// backends with a native batch endpoint override it.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }

    /// Dimensionality D of every vector this provider returns.
    fn dimensions(&self) -> usize;
}
