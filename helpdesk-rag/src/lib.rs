//! # helpdesk-rag
//!
//! Retrieval for the helpdesk assistant.
//!
//! ## Overview
//!
//! A question goes through a fixed sequence of stages:
//!
//! 1. an optional [`QueryTransform`] rewrites it,
//! 2. an [`EmbeddingProvider`] turns it into a vector,
//! 3. a [`VectorStore`] returns the nearest stored chunks,
//! 4. the [`Retriever`] drops matches below `min_score` and maps the rest
//!    into typed [`RetrievedDocument`]s,
//! 5. the [`ContextAssembler`] renders them into the model's system prompt.
//!
//! The ingestion side ([`Indexer`]) embeds pre-chunked [`DocumentChunk`]s and
//! upserts them, refusing vectors whose dimensionality does not match the
//! embedding provider.
//!
//! ## Feature flags
//!
//! | Feature | Description |
//! |---|---|
//! | `openai` | [`OpenAIEmbeddingProvider`] (default) |
//! | `pinecone` | [`PineconeVectorStore`] (default) |
//! | `qdrant` | `QdrantVectorStore` |
//! | `full` | all of the above |
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use helpdesk_rag::{InMemoryVectorStore, Retriever, RetrievalConfig};
//!
//! let retriever = Retriever::builder()
//!     .config(RetrievalConfig::builder().top_k(10).min_score(0.25).build()?)
//!     .embedding_provider(Arc::new(my_embedder))
//!     .vector_store(Arc::new(InMemoryVectorStore::new()))
//!     .build()?;
//!
//! let documents = retriever.retrieve("What's your background?").await?;
//! ```

pub mod config;
pub mod context;
pub mod document;
pub mod embedding;
pub mod error;
pub mod indexer;
pub mod inmemory;
pub mod retriever;
pub mod transform;
pub mod vectorstore;

#[cfg(feature = "openai")]
pub mod openai;
#[cfg(feature = "pinecone")]
pub mod pinecone;
#[cfg(feature = "qdrant")]
pub mod qdrant;

pub use config::{RetrievalConfig, RetrievalConfigBuilder};
pub use context::{ContextAssembler, ConversationWindow};
pub use document::{
    ChunkMetadata, DocumentChunk, DocumentMetadata, RetrievedDocument, SourcePreview, VectorMatch,
};
pub use embedding::EmbeddingProvider;
pub use error::{RagError, Result};
pub use indexer::Indexer;
pub use inmemory::InMemoryVectorStore;
pub use retriever::{Retriever, RetrieverBuilder};
pub use transform::{ModelQueryRewriter, QueryTransform};
pub use vectorstore::{IndexStats, VectorStore};

#[cfg(feature = "openai")]
pub use openai::OpenAIEmbeddingProvider;
#[cfg(feature = "pinecone")]
pub use pinecone::PineconeVectorStore;
#[cfg(feature = "qdrant")]
pub use qdrant::QdrantVectorStore;
