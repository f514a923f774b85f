//! Data types for chunks, vector matches, and retrieved documents.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Maximum number of characters kept in a [`SourcePreview`].
pub const PREVIEW_CHARS: usize = 200;

/// Provenance of a chunk, used for citations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub source: String,
    pub section: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subsection: Option<String>,
}

/// Metadata stored with an indexed chunk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkMetadata {
    #[serde(flatten)]
    pub document: DocumentMetadata,
    pub chunk_index: u32,
}

/// The corpus' unit of storage: one piece of text with one embedding.
///
/// Chunks are produced by an external ingestion step; the
/// [`Indexer`](crate::Indexer) fills in missing embeddings before upserting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub id: String,
    pub text: String,
    pub metadata: ChunkMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

impl DocumentChunk {
    /// Metadata payload stored next to the vector. The chunk text travels in
    /// the payload under `text` so matches can be turned back into documents.
    pub fn payload(&self) -> Map<String, Value> {
        let meta = &self.metadata.document;
        let mut payload = Map::new();
        payload.insert("text".into(), Value::String(self.text.clone()));
        payload.insert("source".into(), Value::String(meta.source.clone()));
        payload.insert("section".into(), Value::String(meta.section.clone()));
        if let Some(title) = &meta.title {
            payload.insert("title".into(), Value::String(title.clone()));
        }
        if let Some(subsection) = &meta.subsection {
            payload.insert("subsection".into(), Value::String(subsection.clone()));
        }
        payload.insert("chunkIndex".into(), Value::from(self.metadata.chunk_index));
        payload
    }
}

/// A raw nearest-neighbour match as returned by a [`VectorStore`](crate::VectorStore).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorMatch {
    pub id: String,
    pub score: f32,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

/// A chunk matched for one query. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedDocument {
    pub id: String,
    pub text: String,
    pub score: f32,
    pub metadata: DocumentMetadata,
}

/// Renders a metadata value the way it would print, with `null` as absent.
fn metadata_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

impl From<VectorMatch> for RetrievedDocument {
    /// Missing `text`, `source`, and `section` become empty strings;
    /// `title` and `subsection` stay `None` when absent.
    fn from(m: VectorMatch) -> Self {
        let field = |key: &str| metadata_string(m.metadata.get(key));
        Self {
            text: field("text").unwrap_or_default(),
            metadata: DocumentMetadata {
                source: field("source").unwrap_or_default(),
                section: field("section").unwrap_or_default(),
                title: field("title"),
                subsection: field("subsection"),
            },
            id: m.id,
            score: m.score,
        }
    }
}

/// Citation shown to the caller next to an answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourcePreview {
    /// First [`PREVIEW_CHARS`] characters of the chunk text.
    pub text: String,
    pub source: String,
    pub section: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subsection: Option<String>,
    pub score: f32,
}

impl From<&RetrievedDocument> for SourcePreview {
    fn from(doc: &RetrievedDocument) -> Self {
        let text = match doc.text.char_indices().nth(PREVIEW_CHARS) {
            Some((cut, _)) => format!("{}…", &doc.text[..cut]),
            None => doc.text.clone(),
        };
        Self {
            text,
            source: doc.metadata.source.clone(),
            section: doc.metadata.section.clone(),
            subsection: doc.metadata.subsection.clone().filter(|s| !s.is_empty()),
            score: doc.score,
        }
    }
}
