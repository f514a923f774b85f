//! Pinecone vector store backend.
//!
//! Provides [`PineconeVectorStore`], which talks to a Pinecone index over
//! its REST data plane.
//!
//! # Example
//!
//! ```rust,ignore
//! use helpdesk_rag::PineconeVectorStore;
//!
//! // Resolve the index host through the control plane once at startup.
//! let store = PineconeVectorStore::connect(api_key, "background-context").await?;
//! let matches = store.query(&embedding, 10, Some("bio")).await?;
//! ```

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, error};

use crate::document::{DocumentChunk, VectorMatch};
use crate::error::{RagError, Result};
use crate::vectorstore::{IndexStats, VectorStore};

const BACKEND: &str = "pinecone";

/// Pinecone control plane, used to resolve an index name to its host.
pub const CONTROL_PLANE_URL: &str = "https://api.pinecone.io";

const API_VERSION: &str = "2024-07";

/// A [`VectorStore`] backed by a [Pinecone](https://www.pinecone.io/) index.
pub struct PineconeVectorStore {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl PineconeVectorStore {
    /// Create a store for an index whose host is already known
    /// (e.g. `my-index-abc123.svc.us-east-1-aws.pinecone.io`).
    pub fn new(api_key: impl Into<String>, host: &str) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(RagError::Config("Pinecone API key must not be empty".into()));
        }
        if host.trim().is_empty() {
            return Err(RagError::Config("Pinecone index host must not be empty".into()));
        }

        Ok(Self { client: reqwest::Client::new(), api_key, base_url: normalize_host(host) })
    }

    /// Resolve `index_name` through the control plane and create a store for it.
    pub async fn connect(api_key: impl Into<String>, index_name: &str) -> Result<Self> {
        let api_key = api_key.into();
        let client = reqwest::Client::new();

        let response = client
            .get(format!("{CONTROL_PLANE_URL}/indexes/{index_name}"))
            .header("Api-Key", &api_key)
            .header("X-Pinecone-API-Version", API_VERSION)
            .send()
            .await
            .map_err(|e| RagError::search(BACKEND, format!("describe index failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(backend = BACKEND, index = index_name, %status, "describe index failed");
            return Err(RagError::search(
                BACKEND,
                format!("describe index '{index_name}' returned {status}: {body}"),
            ));
        }

        let description: IndexDescription = response
            .json()
            .await
            .map_err(|e| {
                RagError::search(BACKEND, format!("failed to parse index description: {e}"))
            })?;

        debug!(
            backend = BACKEND,
            index = index_name,
            host = %description.host,
            "resolved index host"
        );
        Ok(Self::new(api_key, &description.host)?.with_client(client))
    }

    /// Share an existing HTTP client (connection pool) with this store.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    async fn post<B: Serialize, R: DeserializeOwned>(&self, path: &str, body: &B) -> Result<R> {
        let response = self
            .client
            .post(format!("{}{path}", self.base_url))
            .header("Api-Key", &self.api_key)
            .header("X-Pinecone-API-Version", API_VERSION)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                error!(backend = BACKEND, path, error = %e, "request failed");
                RagError::search(BACKEND, format!("request failed: {e}"))
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| RagError::search(BACKEND, format!("failed to read response: {e}")))?;

        if !status.is_success() {
            error!(backend = BACKEND, path, %status, "API error");
            return Err(RagError::search(BACKEND, format!("{path} returned {status}: {text}")));
        }

        serde_json::from_str(&text)
            .map_err(|e| RagError::search(BACKEND, format!("failed to parse {path} response: {e}")))
    }
}

fn normalize_host(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{host}")
    }
}

// ── Pinecone API request/response types ────────────────────────────

#[derive(Deserialize)]
struct IndexDescription {
    host: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
    include_values: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    namespace: Option<&'a str>,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Deserialize)]
struct QueryMatch {
    id: String,
    #[serde(default)]
    score: f32,
    #[serde(default)]
    metadata: Option<Map<String, Value>>,
}

#[derive(Serialize)]
struct UpsertRequest<'a> {
    vectors: Vec<UpsertVector<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    namespace: Option<&'a str>,
}

#[derive(Serialize)]
struct UpsertVector<'a> {
    id: &'a str,
    values: &'a [f32],
    metadata: Map<String, Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpsertResponse {
    #[serde(default)]
    upserted_count: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DeleteRequest<'a> {
    delete_all: bool,
    namespace: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatsResponse {
    #[serde(default)]
    dimension: Option<usize>,
    #[serde(default)]
    total_vector_count: u64,
    #[serde(default)]
    namespaces: BTreeMap<String, NamespaceStats>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NamespaceStats {
    #[serde(default)]
    vector_count: u64,
}

impl From<StatsResponse> for IndexStats {
    fn from(stats: StatsResponse) -> Self {
        IndexStats {
            dimension: stats.dimension,
            total_vectors: stats.total_vector_count,
            namespaces: stats
                .namespaces
                .into_iter()
                .map(|(name, ns)| (name, ns.vector_count))
                .collect(),
        }
    }
}

// ── VectorStore implementation ─────────────────────────────────────

#[async_trait]
impl VectorStore for PineconeVectorStore {
    fn backend(&self) -> &str {
        BACKEND
    }

    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        namespace: Option<&str>,
    ) -> Result<Vec<VectorMatch>> {
        let request = QueryRequest {
            vector,
            top_k,
            include_metadata: true,
            include_values: false,
            namespace,
        };
        let response: QueryResponse = self.post("/query", &request).await?;

        debug!(backend = BACKEND, top_k, matches = response.matches.len(), "query completed");

        Ok(response
            .matches
            .into_iter()
            .map(|m| VectorMatch {
                id: m.id,
                score: m.score,
                metadata: m.metadata.unwrap_or_default(),
            })
            .collect())
    }

    async fn upsert(&self, namespace: Option<&str>, chunks: &[DocumentChunk]) -> Result<()> {
        if chunks.is_empty() {
            return Ok(());
        }

        let vectors = chunks
            .iter()
            .map(|chunk| {
                let values = chunk.embedding.as_deref().ok_or_else(|| {
                    RagError::search(BACKEND, format!("chunk '{}' has no embedding", chunk.id))
                })?;
                Ok(UpsertVector { id: &chunk.id, values, metadata: chunk.payload() })
            })
            .collect::<Result<Vec<_>>>()?;

        let response: UpsertResponse =
            self.post("/vectors/upsert", &UpsertRequest { vectors, namespace }).await?;

        debug!(backend = BACKEND, count = response.upserted_count, "upserted chunks");
        Ok(())
    }

    async fn delete_all(&self, namespace: Option<&str>) -> Result<()> {
        let request = DeleteRequest { delete_all: true, namespace: namespace.unwrap_or_default() };
        let _: Value = self.post("/vectors/delete", &request).await?;
        debug!(backend = BACKEND, namespace = request.namespace, "deleted all vectors");
        Ok(())
    }

    async fn describe(&self) -> Result<IndexStats> {
        let stats: StatsResponse = self.post("/describe_index_stats", &Map::new()).await?;
        Ok(stats.into())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn query_body_matches_pinecone_contract() {
        let vector = [0.1f32, 0.2];
        let body = serde_json::to_value(QueryRequest {
            vector: &vector,
            top_k: 10,
            include_metadata: true,
            include_values: false,
            namespace: Some("bio"),
        })
        .unwrap();

        assert_eq!(body["topK"], 10);
        assert_eq!(body["includeMetadata"], true);
        assert_eq!(body["includeValues"], false);
        assert_eq!(body["namespace"], "bio");
        assert_eq!(body["vector"].as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn query_response_tolerates_missing_metadata() {
        let parsed: QueryResponse = serde_json::from_value(json!({
            "matches": [
                { "id": "a", "score": 0.8, "metadata": { "text": "hi" } },
                { "id": "b", "score": 0.3 }
            ],
            "namespace": ""
        }))
        .unwrap();
        assert_eq!(parsed.matches.len(), 2);
        assert!(parsed.matches[1].metadata.is_none());

        let empty: QueryResponse = serde_json::from_value(json!({ "namespace": "" })).unwrap();
        assert!(empty.matches.is_empty());
    }

    #[test]
    fn stats_response_maps_to_index_stats() {
        let parsed: StatsResponse = serde_json::from_value(json!({
            "dimension": 1536,
            "indexFullness": 0.0,
            "totalVectorCount": 42,
            "namespaces": { "bio": { "vectorCount": 40 }, "": { "vectorCount": 2 } }
        }))
        .unwrap();
        let stats = IndexStats::from(parsed);
        assert_eq!(stats.dimension, Some(1536));
        assert_eq!(stats.total_vectors, 42);
        assert_eq!(stats.namespaces.get("bio"), Some(&40));
    }

    #[test]
    fn host_is_normalized() {
        assert_eq!(normalize_host("idx.svc.pinecone.io/"), "https://idx.svc.pinecone.io");
        assert_eq!(normalize_host("http://localhost:5080"), "http://localhost:5080");
    }

    #[test]
    fn empty_credentials_are_rejected() {
        assert!(PineconeVectorStore::new("", "idx.svc.pinecone.io").is_err());
        assert!(PineconeVectorStore::new("key", " ").is_err());
    }
}
