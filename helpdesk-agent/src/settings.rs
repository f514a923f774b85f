//! Process settings, read once at start-up.
//!
//! Settings come from environment variables (a `.env` file is loaded by the
//! binary before this runs). Blank values count as missing. Every missing or
//! unparsable key is collected into a single [`ConfigError`].

use std::fmt;
use std::str::FromStr;

use helpdesk_rag::RetrievalConfig;

use crate::error::ConfigError;
use crate::prompt::{
    DEFAULT_AGENT_PROMPT, DEFAULT_FALLBACK_MESSAGE, DEFAULT_NO_CONTEXT_MESSAGE,
    DEFAULT_NO_RESULTS_MESSAGE, DEFAULT_SYSTEM_PROMPT,
};

pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
pub const DEFAULT_ANSWER_MODEL: &str = "gpt-5-mini";
pub const DEFAULT_AGENT_MODEL: &str = "o4-mini";
pub const DEFAULT_TOP_K: usize = 10;
pub const DEFAULT_MIN_SCORE: f32 = 0.25;
pub const DEFAULT_TOOL_MIN_SCORE: f32 = 0.0;
pub const DEFAULT_MAX_HISTORY: usize = 4;

/// Explicit configuration for the assistant, injected into every component.
#[derive(Clone, PartialEq)]
pub struct Settings {
    pub openai_api_key: String,
    pub openai_base_url: Option<String>,
    pub pinecone_api_key: String,
    pub pinecone_index_name: String,
    /// Data-plane host; resolved from the control plane when absent.
    pub pinecone_index_host: Option<String>,
    pub pinecone_namespace: Option<String>,
    pub embedding_model: String,
    pub answer_model: String,
    pub agent_model: String,
    pub top_k: usize,
    pub min_score: f32,
    /// Threshold used by the `search_bio` tool.
    pub tool_min_score: f32,
    pub max_history: usize,
    pub system_prompt: String,
    pub agent_prompt: String,
    pub no_results_message: String,
    pub fallback_message: String,
    pub no_context_message: String,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("openai_api_key", &"[redacted]")
            .field("openai_base_url", &self.openai_base_url)
            .field("pinecone_api_key", &"[redacted]")
            .field("pinecone_index_name", &self.pinecone_index_name)
            .field("pinecone_index_host", &self.pinecone_index_host)
            .field("pinecone_namespace", &self.pinecone_namespace)
            .field("embedding_model", &self.embedding_model)
            .field("answer_model", &self.answer_model)
            .field("agent_model", &self.agent_model)
            .field("top_k", &self.top_k)
            .field("min_score", &self.min_score)
            .field("tool_min_score", &self.tool_min_score)
            .field("max_history", &self.max_history)
            .finish_non_exhaustive()
    }
}

/// Accumulates values and problems while reading keys.
struct Reader<F> {
    lookup: F,
    problems: Vec<String>,
}

impl<F: Fn(&str) -> Option<String>> Reader<F> {
    fn optional(&self, key: &str) -> Option<String> {
        (self.lookup)(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
    }

    fn required(&mut self, key: &str) -> String {
        self.optional(key).unwrap_or_else(|| {
            self.problems.push(format!("{key} is not set"));
            String::new()
        })
    }

    fn or(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    fn parsed<T: FromStr>(
        &mut self,
        key: &str,
        default: T,
        valid: impl Fn(&T) -> bool,
        expected: &str,
    ) -> T {
        let Some(raw) = self.optional(key) else {
            return default;
        };
        match raw.parse::<T>() {
            Ok(value) if valid(&value) => value,
            _ => {
                self.problems.push(format!("{key} must be {expected} (got '{raw}')"));
                default
            }
        }
    }
}

impl Settings {
    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`, which maps a key to its raw value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut r = Reader { lookup, problems: Vec::new() };

        let openai_api_key = r.required("OPENAI_API_KEY");
        let pinecone_api_key = r.required("PINECONE_API_KEY");
        let pinecone_index_name = r.required("PINECONE_INDEX_NAME");

        let top_k = r.parsed("HELPDESK_TOP_K", DEFAULT_TOP_K, |k| *k > 0, "a positive integer");
        let unit = |s: &f32| (0.0..=1.0).contains(s);
        const UNIT: &str = "a number between 0 and 1";
        let min_score = r.parsed("HELPDESK_MIN_SCORE", DEFAULT_MIN_SCORE, unit, UNIT);
        let tool_min_score =
            r.parsed("HELPDESK_TOOL_MIN_SCORE", DEFAULT_TOOL_MIN_SCORE, unit, UNIT);
        let max_history = r.parsed(
            "HELPDESK_MAX_HISTORY",
            DEFAULT_MAX_HISTORY,
            |_| true,
            "a non-negative integer",
        );

        let settings = Settings {
            openai_api_key,
            openai_base_url: r.optional("OPENAI_BASE_URL"),
            pinecone_api_key,
            pinecone_index_name,
            pinecone_index_host: r.optional("PINECONE_INDEX_HOST"),
            pinecone_namespace: r.optional("PINECONE_NAMESPACE"),
            embedding_model: r.or("HELPDESK_EMBEDDING_MODEL", DEFAULT_EMBEDDING_MODEL),
            answer_model: r.or("HELPDESK_ANSWER_MODEL", DEFAULT_ANSWER_MODEL),
            agent_model: r.or("HELPDESK_AGENT_MODEL", DEFAULT_AGENT_MODEL),
            top_k,
            min_score,
            tool_min_score,
            max_history,
            system_prompt: r.or("HELPDESK_SYSTEM_PROMPT", DEFAULT_SYSTEM_PROMPT),
            agent_prompt: r.or("HELPDESK_AGENT_PROMPT", DEFAULT_AGENT_PROMPT),
            no_results_message: r.or("HELPDESK_NO_RESULTS_MESSAGE", DEFAULT_NO_RESULTS_MESSAGE),
            fallback_message: r.or("HELPDESK_FALLBACK_MESSAGE", DEFAULT_FALLBACK_MESSAGE),
            no_context_message: r.or("HELPDESK_NO_CONTEXT_MESSAGE", DEFAULT_NO_CONTEXT_MESSAGE),
        };

        if r.problems.is_empty() { Ok(settings) } else { Err(ConfigError { problems: r.problems }) }
    }

    /// Retrieval parameters for direct answers.
    pub fn retrieval_config(&self) -> RetrievalConfig {
        RetrievalConfig {
            top_k: self.top_k,
            min_score: self.min_score,
            namespace: self.pinecone_namespace.clone(),
        }
    }

    /// Retrieval parameters for the `search_bio` tool.
    pub fn tool_retrieval_config(&self) -> RetrievalConfig {
        RetrievalConfig { min_score: self.tool_min_score, ..self.retrieval_config() }
    }
}
