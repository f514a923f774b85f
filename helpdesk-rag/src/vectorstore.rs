//! Vector store trait for nearest-neighbour search over indexed chunks.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::document::{DocumentChunk, VectorMatch};
use crate::error::Result;

/// Summary of an index, as reported by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexStats {
    pub dimension: Option<usize>,
    pub total_vectors: u64,
    /// Vector count per namespace. The default namespace is `""`.
    pub namespaces: BTreeMap<String, u64>,
}

/// A vector database holding embedded [`DocumentChunk`]s.
///
/// `namespace` scopes every operation to a partition of the index; `None`
/// is the backend's default namespace.
///
/// # Example
///
/// ```rust,ignore
/// use helpdesk_rag::{InMemoryVectorStore, VectorStore};
///
/// let store = InMemoryVectorStore::new();
/// store.upsert(None, &chunks).await?;
/// let matches = store.query(&query_embedding, 5, None).await?;
/// ```
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Short backend name used in logs and errors.
    fn backend(&self) -> &str;

    /// Return at most `top_k` matches ordered by descending score.
    ///
    /// The relative order of matches with equal scores is backend-defined.
    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        namespace: Option<&str>,
    ) -> Result<Vec<VectorMatch>>;

    /// Insert or replace chunks. Every chunk must carry its embedding.
    async fn upsert(&self, namespace: Option<&str>, chunks: &[DocumentChunk]) -> Result<()>;

    /// Remove every vector in the namespace.
    async fn delete_all(&self, namespace: Option<&str>) -> Result<()>;

    /// Report index statistics.
    async fn describe(&self) -> Result<IndexStats>;
}
