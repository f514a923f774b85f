//! # helpdesk-model
//!
//! Chat completion clients for the helpdesk assistant.
//!
//! ## Overview
//!
//! This crate provides the language-model side of the assistant:
//!
//! - [`ChatMessage`] / [`ChatRole`] - the conversation data model
//! - [`CompletionModel`] - the async trait every backend implements
//! - [`ModelTurn`] - the discriminated result of a completion call
//!   (a direct answer, or a request to run a tool)
//! - [`OpenAIChatModel`] - OpenAI and OpenAI-compatible chat completions
//! - [`MockCompletionModel`] - scripted model for tests
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use helpdesk_model::{ChatMessage, CompletionModel, CompletionRequest, OpenAIChatModel};
//! use helpdesk_model::openai::OpenAIChatConfig;
//!
//! let model = OpenAIChatModel::new(OpenAIChatConfig::new(
//!     std::env::var("OPENAI_API_KEY")?,
//!     "gpt-5-mini",
//! ))?;
//!
//! let turn = model
//!     .complete(CompletionRequest::new(vec![ChatMessage::user("Hello").into()]))
//!     .await?;
//! println!("{}", turn.text());
//! ```
//!
//! ## Tool calling
//!
//! Declare tools with [`ToolDeclaration`] and pick a [`ToolChoice`]. When the
//! model asks for a tool, [`ModelTurn::ToolRequest`] carries every
//! [`ToolCall`] it returned; callers echo the turn back with
//! [`PromptMessage::ToolCalls`] and answer with [`PromptMessage::ToolResult`].

pub mod completion;
pub mod error;
pub mod message;
pub mod mock;
#[cfg(feature = "openai")]
pub mod openai;

pub use completion::{
    CompletionModel, CompletionRequest, ModelTurn, PromptMessage, ToolCall, ToolChoice,
    ToolDeclaration,
};
pub use error::{ModelError, Result};
pub use message::{ChatMessage, ChatRole};
pub use mock::MockCompletionModel;
#[cfg(feature = "openai")]
pub use openai::OpenAIChatModel;
