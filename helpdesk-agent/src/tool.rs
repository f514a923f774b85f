//! The `search_bio` retrieval tool offered to the model.
//!
//! The [`SearchTool`] wraps a [`Retriever`] so the model can decide at
//! runtime whether to consult the knowledge base.

use helpdesk_model::ToolDeclaration;
use helpdesk_rag::Retriever;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

/// Name under which the tool is declared to the model.
pub const SEARCH_TOOL_NAME: &str = "search_bio";

#[derive(Deserialize)]
struct SearchArguments {
    #[serde(default)]
    query: Option<String>,
}

/// Semantic search over the knowledge base, returning plain text for the
/// model. It never fails: errors and empty results become the configured
/// no-context message.
#[derive(Clone)]
pub struct SearchTool {
    retriever: Retriever,
    no_context_message: String,
}

impl SearchTool {
    pub fn new(retriever: Retriever, no_context_message: impl Into<String>) -> Self {
        Self { retriever, no_context_message: no_context_message.into() }
    }

    pub fn no_context_message(&self) -> &str {
        &self.no_context_message
    }

    pub fn declaration(&self) -> ToolDeclaration {
        ToolDeclaration {
            name: SEARCH_TOOL_NAME.to_string(),
            description: concat!(
                "Semantic search over the bio knowledge base ",
                "to retrieve relevant information."
            )
            .to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "Standalone search query derived from the user question."
                    }
                },
                "required": ["query"]
            }),
        }
    }

    /// Extract the `query` argument. Malformed JSON, a missing field, or a
    /// non-string value all yield an empty query.
    pub fn parse_arguments(raw: &str) -> String {
        match serde_json::from_str::<SearchArguments>(raw) {
            Ok(args) => args.query.unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, "invalid search_bio arguments, using empty query");
                String::new()
            }
        }
    }

    /// Run the search and render the result for the model: chunk texts
    /// joined by blank lines, or the no-context message.
    pub async fn run(&self, query: &str) -> String {
        if query.trim().is_empty() {
            return self.no_context_message.clone();
        }

        let documents = match self.retriever.retrieve(query).await {
            Ok(documents) => documents,
            Err(e) => {
                warn!(error = %e, "search_bio failed, returning no-context message");
                return self.no_context_message.clone();
            }
        };

        let chunks: Vec<&str> =
            documents.iter().map(|d| d.text.as_str()).filter(|t| !t.is_empty()).collect();
        info!(query, chunks = chunks.len(), "search_bio completed");

        if chunks.is_empty() { self.no_context_message.clone() } else { chunks.join("\n\n") }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arguments_parse_to_query() {
        assert_eq!(SearchTool::parse_arguments(r#"{"query":"pricing"}"#), "pricing");
    }

    #[test]
    fn bad_arguments_yield_empty_query() {
        assert_eq!(SearchTool::parse_arguments("not json"), "");
        assert_eq!(SearchTool::parse_arguments(""), "");
        assert_eq!(SearchTool::parse_arguments("{}"), "");
        assert_eq!(SearchTool::parse_arguments(r#"{"query":42}"#), "");
        assert_eq!(SearchTool::parse_arguments(r#"{"query":null}"#), "");
    }
}
