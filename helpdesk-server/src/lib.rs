//! # helpdesk-server
//!
//! HTTP surface for the helpdesk assistant.
//!
//! | route | purpose |
//! |---|---|
//! | `POST /api/chat` | retrieval-first answer with sources |
//! | `POST /api/assistant` | tool-calling reply |
//! | `GET /api/health` | liveness |
//! | `GET /api/debug/trace/{request_id}` | captured pipeline spans of one request |
//!
//! Request bodies are validated here and never reach the orchestrators when
//! malformed. Failures map to `400`, `429` or `500` with a body of the form
//! `{ "error": "..." }`.

pub mod config;
pub mod error;
pub mod rest;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::ApiError;
pub use rest::{REQUEST_ID_HEADER, app_router};
pub use server::run_server;
pub use state::AppState;
