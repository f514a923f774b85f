//! Configuration for retrieval.

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// Parameters of one retrieval pass.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrievalConfig {
    /// Number of nearest neighbours requested from the vector store.
    pub top_k: usize,
    /// Minimum similarity score; matches below it are dropped (inclusive).
    pub min_score: f32,
    /// Vector store namespace to search. `None` is the default namespace.
    pub namespace: Option<String>,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { top_k: 10, min_score: 0.25, namespace: None }
    }
}

impl RetrievalConfig {
    /// Create a new builder for constructing a [`RetrievalConfig`].
    pub fn builder() -> RetrievalConfigBuilder {
        RetrievalConfigBuilder::default()
    }
}

/// Builder for constructing a validated [`RetrievalConfig`].
#[derive(Debug, Clone, Default)]
pub struct RetrievalConfigBuilder {
    config: RetrievalConfig,
}

impl RetrievalConfigBuilder {
    /// Set the number of nearest neighbours to request.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Set the minimum similarity score.
    pub fn min_score(mut self, score: f32) -> Self {
        self.config.min_score = score;
        self
    }

    /// Set the namespace to search.
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.config.namespace = Some(namespace.into());
        self
    }

    /// Build the [`RetrievalConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if:
    /// - `top_k == 0`
    /// - `min_score` is outside `[0, 1]` or NaN
    pub fn build(self) -> Result<RetrievalConfig> {
        if self.config.top_k == 0 {
            return Err(RagError::Config("top_k must be greater than zero".to_string()));
        }
        if !(0.0..=1.0).contains(&self.config.min_score) {
            return Err(RagError::Config(format!(
                "min_score ({}) must be between 0 and 1",
                self.config.min_score
            )));
        }
        Ok(self.config)
    }
}
