//! # helpdesk-agent
//!
//! Orchestration for the helpdesk assistant.
//!
//! ## Overview
//!
//! Two conversation protocols sit on top of `helpdesk-rag` and
//! `helpdesk-model`:
//!
//! - [`DirectRagAgent`] always retrieves first and answers strictly from the
//!   retrieved documentation, returning the sources it used.
//! - [`ToolCallingAgent`] offers the model a `search_bio` tool
//!   ([`SearchTool`]) and lets it decide whether to consult the knowledge
//!   base, with at most one tool round per turn.
//!
//! [`Settings`] holds every tunable, read once from the environment, and
//! [`Assistant`] wires both protocols to real OpenAI and Pinecone clients.
//!
//! ## Example
//!
//! ```rust,ignore
//! use helpdesk_agent::{Assistant, Settings};
//! use helpdesk_model::ChatMessage;
//!
//! let settings = Settings::from_env()?;
//! let assistant = Assistant::connect(&settings).await?;
//!
//! let answer = assistant.direct().answer("How do I export my notes?", &[]).await?;
//! let reply = assistant
//!     .agentic()
//!     .reply(&[ChatMessage::user("What's your background?")])
//!     .await?;
//! ```

pub mod agentic;
pub mod assistant;
pub mod direct;
pub mod error;
pub mod prompt;
pub mod settings;
pub mod tool;

pub use agentic::ToolCallingAgent;
pub use assistant::Assistant;
pub use direct::{DirectRagAgent, DirectRagAgentBuilder, RagAnswer};
pub use error::{AgentError, ConfigError, Result};
pub use settings::Settings;
pub use tool::{SEARCH_TOOL_NAME, SearchTool};
