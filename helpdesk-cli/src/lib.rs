//! # helpdesk-cli
//!
//! The `helpdesk` binary: serve the HTTP API, ask one-off questions, and
//! manage the vector index.

pub mod chunks;
pub mod cli;
pub mod commands;

pub use cli::{Cli, Command};
pub use commands::run;
