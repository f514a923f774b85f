//! In-memory vector store using cosine similarity.
//!
//! [`InMemoryVectorStore`] keeps vectors in a `HashMap` behind a
//! `tokio::sync::RwLock`. It is meant for tests, demos, and small corpora.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use crate::document::{DocumentChunk, VectorMatch};
use crate::error::{RagError, Result};
use crate::vectorstore::{IndexStats, VectorStore};

const BACKEND: &str = "InMemory";

#[derive(Debug, Clone)]
struct StoredVector {
    values: Vec<f32>,
    metadata: Map<String, Value>,
}

/// An in-memory vector store using cosine similarity for search.
///
/// Namespaces are stored as nested maps: namespace → vector ID → vector.
/// The default namespace is `""`. All vectors of a namespace share one
/// dimensionality, fixed by the first vector written to it.
///
/// # Example
///
/// ```rust,ignore
/// use helpdesk_rag::{InMemoryVectorStore, VectorStore};
///
/// let store = InMemoryVectorStore::new();
/// store.upsert(Some("bio"), &chunks).await?;
/// ```
#[derive(Debug, Default)]
pub struct InMemoryVectorStore {
    namespaces: RwLock<HashMap<String, HashMap<String, StoredVector>>>,
}

impl InMemoryVectorStore {
    /// Create a new empty in-memory vector store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a raw vector with arbitrary metadata.
    ///
    /// Lets tests and demos seed matches whose metadata does not come from a
    /// [`DocumentChunk`] (missing fields, non-string values).
    ///
    /// # Errors
    ///
    /// [`RagError::DimensionMismatch`] if `values` does not match the
    /// namespace's dimensionality.
    pub async fn insert_raw(
        &self,
        namespace: Option<&str>,
        id: impl Into<String>,
        values: Vec<f32>,
        metadata: Map<String, Value>,
    ) -> Result<()> {
        let id = id.into();
        let namespace = namespace.unwrap_or_default();
        let mut namespaces = self.namespaces.write().await;
        if let Some(expected) = namespaces.get(namespace).and_then(dimension_of) {
            check_dimension(&id, expected, values.len())?;
        }
        namespaces
            .entry(namespace.to_string())
            .or_default()
            .insert(id, StoredVector { values, metadata });
        Ok(())
    }
}

fn dimension_of(store: &HashMap<String, StoredVector>) -> Option<usize> {
    store.values().next().map(|v| v.values.len())
}

fn check_dimension(id: &str, expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(RagError::DimensionMismatch { id: id.to_string(), expected, actual })
    }
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    fn backend(&self) -> &str {
        BACKEND
    }

    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        namespace: Option<&str>,
    ) -> Result<Vec<VectorMatch>> {
        let namespaces = self.namespaces.read().await;
        let Some(store) = namespaces.get(namespace.unwrap_or_default()) else {
            return Ok(Vec::new());
        };
        if let Some(expected) = dimension_of(store) {
            check_dimension("query", expected, vector.len())?;
        }

        let mut scored: Vec<VectorMatch> = store
            .iter()
            .map(|(id, stored)| VectorMatch {
                id: id.clone(),
                score: cosine_similarity(&stored.values, vector),
                metadata: stored.metadata.clone(),
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);
        Ok(scored)
    }

    /// Writes nothing unless every chunk has an embedding of the
    /// namespace's dimensionality.
    async fn upsert(&self, namespace: Option<&str>, chunks: &[DocumentChunk]) -> Result<()> {
        let namespace = namespace.unwrap_or_default();
        let mut namespaces = self.namespaces.write().await;

        let mut expected = namespaces.get(namespace).and_then(dimension_of);
        let mut vectors = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            let values = chunk.embedding.clone().ok_or_else(|| {
                RagError::search(BACKEND, format!("chunk '{}' has no embedding", chunk.id))
            })?;
            let dimension = *expected.get_or_insert(values.len());
            check_dimension(&chunk.id, dimension, values.len())?;
            vectors.push((chunk.id.clone(), StoredVector { values, metadata: chunk.payload() }));
        }

        namespaces.entry(namespace.to_string()).or_default().extend(vectors);
        Ok(())
    }

    async fn delete_all(&self, namespace: Option<&str>) -> Result<()> {
        let mut namespaces = self.namespaces.write().await;
        namespaces.remove(namespace.unwrap_or_default());
        Ok(())
    }

    async fn describe(&self) -> Result<IndexStats> {
        let namespaces = self.namespaces.read().await;
        let dimension =
            namespaces.values().flat_map(|ns| ns.values()).map(|v| v.values.len()).next();
        let counts: std::collections::BTreeMap<String, u64> =
            namespaces.iter().map(|(name, ns)| (name.clone(), ns.len() as u64)).collect();

        Ok(IndexStats { dimension, total_vectors: counts.values().sum(), namespaces: counts })
    }
}
