//! Qdrant vector store backend.
//!
//! Provides [`QdrantVectorStore`] which implements [`VectorStore`] using
//! the [qdrant-client](https://docs.rs/qdrant-client) crate over gRPC.
//! Namespaces map to Qdrant collections; `None` uses the store's default
//! collection.
//!
//! # Example
//!
//! ```rust,ignore
//! use helpdesk_rag::QdrantVectorStore;
//!
//! let store = QdrantVectorStore::new("http://localhost:6334", "helpdesk")?;
//! store.upsert(None, &chunks).await?;
//! let matches = store.query(&query_embedding, 10, None).await?;
//! ```

use async_trait::async_trait;
use qdrant_client::qdrant::point_id::PointIdOptions;
use qdrant_client::qdrant::value::Kind;
use qdrant_client::qdrant::vectors_config::Config as VectorsConfigKind;
use qdrant_client::qdrant::{
    CreateCollectionBuilder, Distance, PointStruct, SearchPointsBuilder, UpsertPointsBuilder,
    Value as QdrantValue, VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant};
use serde_json::{Map, Number, Value};
use tracing::debug;
use uuid::Uuid;

use crate::document::{DocumentChunk, VectorMatch};
use crate::error::{RagError, Result};
use crate::vectorstore::{IndexStats, VectorStore};

const BACKEND: &str = "qdrant";

/// Payload key holding the caller's chunk id; Qdrant point ids must be
/// UUIDs or integers.
const CHUNK_ID_KEY: &str = "chunkId";

/// A [`VectorStore`] backed by [Qdrant](https://qdrant.tech/).
///
/// Collections are created on first upsert with cosine distance and the
/// dimensionality of the first vector.
pub struct QdrantVectorStore {
    client: Qdrant,
    collection: String,
}

impl QdrantVectorStore {
    /// Connect to `url`, using `collection` as the default namespace.
    pub fn new(url: &str, collection: impl Into<String>) -> Result<Self> {
        let client = Qdrant::from_url(url).build().map_err(map_err)?;
        Ok(Self { client, collection: collection.into() })
    }

    /// Create a store from an existing client.
    pub fn from_client(client: Qdrant, collection: impl Into<String>) -> Self {
        Self { client, collection: collection.into() }
    }

    fn collection<'a>(&'a self, namespace: Option<&'a str>) -> &'a str {
        namespace.filter(|ns| !ns.is_empty()).unwrap_or(&self.collection)
    }
}

fn map_err(e: qdrant_client::QdrantError) -> RagError {
    RagError::search(BACKEND, e.to_string())
}

/// Deterministic point id for a chunk id.
fn point_id(chunk_id: &str) -> String {
    Uuid::new_v5(&Uuid::NAMESPACE_OID, chunk_id.as_bytes()).to_string()
}

fn to_json(value: QdrantValue) -> Value {
    match value.kind {
        Some(Kind::NullValue(_)) | None => Value::Null,
        Some(Kind::BoolValue(b)) => Value::Bool(b),
        Some(Kind::IntegerValue(i)) => Value::from(i),
        Some(Kind::DoubleValue(d)) => Number::from_f64(d).map_or(Value::Null, Value::Number),
        Some(Kind::StringValue(s)) => Value::String(s),
        Some(Kind::ListValue(list)) => Value::Array(list.values.into_iter().map(to_json).collect()),
        Some(Kind::StructValue(s)) => {
            Value::Object(s.fields.into_iter().map(|(k, v)| (k, to_json(v))).collect())
        }
    }
}

#[async_trait]
impl VectorStore for QdrantVectorStore {
    fn backend(&self) -> &str {
        BACKEND
    }

    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        namespace: Option<&str>,
    ) -> Result<Vec<VectorMatch>> {
        let collection = self.collection(namespace);
        if !self.client.collection_exists(collection).await.map_err(map_err)? {
            debug!(collection, "qdrant collection does not exist");
            return Ok(Vec::new());
        }

        let response = self
            .client
            .search_points(
                SearchPointsBuilder::new(collection, vector.to_vec(), top_k as u64)
                    .with_payload(true),
            )
            .await
            .map_err(map_err)?;

        let matches = response
            .result
            .into_iter()
            .map(|scored| {
                let mut metadata: Map<String, Value> =
                    scored.payload.into_iter().map(|(k, v)| (k, to_json(v))).collect();

                let id = match metadata.remove(CHUNK_ID_KEY) {
                    Some(Value::String(id)) => id,
                    _ => scored
                        .id
                        .and_then(|pid| match pid.point_id_options {
                            Some(PointIdOptions::Uuid(s)) => Some(s),
                            Some(PointIdOptions::Num(n)) => Some(n.to_string()),
                            None => None,
                        })
                        .unwrap_or_default(),
                };

                VectorMatch { id, score: scored.score, metadata }
            })
            .collect();

        Ok(matches)
    }

    async fn upsert(&self, namespace: Option<&str>, chunks: &[DocumentChunk]) -> Result<()> {
        let Some(first) = chunks.first() else {
            return Ok(());
        };
        let collection = self.collection(namespace);

        if !self.client.collection_exists(collection).await.map_err(map_err)? {
            let dimensions = first.embedding.as_ref().map_or(0, Vec::len);
            self.client
                .create_collection(
                    CreateCollectionBuilder::new(collection).vectors_config(
                        VectorParamsBuilder::new(dimensions as u64, Distance::Cosine),
                    ),
                )
                .await
                .map_err(map_err)?;
            debug!(collection, dimensions, "created qdrant collection");
        }

        let points = chunks
            .iter()
            .map(|chunk| {
                let values = chunk.embedding.clone().ok_or_else(|| {
                    RagError::search(BACKEND, format!("chunk '{}' has no embedding", chunk.id))
                })?;
                let mut payload = chunk.payload();
                payload.insert(CHUNK_ID_KEY.to_string(), Value::String(chunk.id.clone()));
                let payload = Payload::try_from(Value::Object(payload))
                    .map_err(|e| RagError::search(BACKEND, e.to_string()))?;
                Ok(PointStruct::new(point_id(&chunk.id), values, payload))
            })
            .collect::<Result<Vec<_>>>()?;

        self.client
            .upsert_points(UpsertPointsBuilder::new(collection, points).wait(true))
            .await
            .map_err(map_err)?;

        debug!(collection, count = chunks.len(), "upserted chunks to qdrant");
        Ok(())
    }

    async fn delete_all(&self, namespace: Option<&str>) -> Result<()> {
        let collection = self.collection(namespace);
        if self.client.collection_exists(collection).await.map_err(map_err)? {
            self.client.delete_collection(collection).await.map_err(map_err)?;
            debug!(collection, "deleted qdrant collection");
        }
        Ok(())
    }

    async fn describe(&self) -> Result<IndexStats> {
        if !self.client.collection_exists(&self.collection).await.map_err(map_err)? {
            return Ok(IndexStats::default());
        }

        let info = self.client.collection_info(&self.collection).await.map_err(map_err)?;
        let Some(info) = info.result else {
            return Ok(IndexStats::default());
        };

        let dimension = info
            .config
            .and_then(|c| c.params)
            .and_then(|p| p.vectors_config)
            .and_then(|v| v.config)
            .and_then(|c| match c {
                VectorsConfigKind::Params(params) => Some(params.size as usize),
                _ => None,
            });
        let count = info.points_count.unwrap_or_default();

        Ok(IndexStats {
            dimension,
            total_vectors: count,
            namespaces: [(self.collection.clone(), count)].into_iter().collect(),
        })
    }
}
