#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use helpdesk_agent::Settings;
use helpdesk_rag::{EmbeddingProvider, InMemoryVectorStore, RagError, Result};
use serde_json::json;

/// Embeds every text to `[1, 0]` and counts calls.
#[derive(Default)]
pub struct FixedEmbedder {
    calls: AtomicUsize,
}

impl FixedEmbedder {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingProvider for FixedEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![1.0, 0.0])
    }

    fn dimensions(&self) -> usize {
        2
    }
}

pub struct FailingEmbedder;

#[async_trait]
impl EmbeddingProvider for FailingEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Err(RagError::Embedding { provider: "test".into(), message: "connection reset".into() })
    }

    fn dimensions(&self) -> usize {
        2
    }
}

/// Unit vector whose cosine similarity with `[1, 0]` is `score`.
pub fn at_cosine(score: f32) -> Vec<f32> {
    vec![score, (1.0 - score * score).max(0.0).sqrt()]
}

/// One relevant chunk at 0.9 and one unrelated chunk at 0.2.
pub async fn seeded_store() -> Arc<InMemoryVectorStore> {
    let store = Arc::new(InMemoryVectorStore::new());
    let metadata = |v: serde_json::Value| v.as_object().cloned().unwrap_or_default();
    store
        .insert_raw(
            None,
            "pricing_0",
            at_cosine(0.9),
            metadata(json!({
                "text": "Plans start at $10 per month.",
                "source": "pricing.md",
                "section": "plans",
                "subsection": "Starter",
                "chunkIndex": 0
            })),
        )
        .await
        .expect("seed vector");
    store
        .insert_raw(
            None,
            "misc_0",
            at_cosine(0.2),
            metadata(json!({
                "text": "Office dogs are welcome.",
                "source": "misc.md",
                "section": "culture"
            })),
        )
        .await
        .expect("seed vector");
    store
}

pub fn settings() -> Settings {
    Settings::from_lookup(|key| match key {
        "OPENAI_API_KEY" => Some("sk-test".into()),
        "PINECONE_API_KEY" => Some("pc-test".into()),
        "PINECONE_INDEX_NAME" => Some("test-index".into()),
        _ => None,
    })
    .expect("test settings")
}
