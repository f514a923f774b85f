//! # helpdesk-telemetry
//!
//! Tracing setup for the helpdesk binaries.
//!
//! Log output goes through `tracing-subscriber` as human-readable or JSON
//! lines, filtered by `RUST_LOG` (default `info`). An optional
//! [`InMemoryTraceLayer`] keeps the spans of recent requests so the server
//! can expose a per-request pipeline trace.
//!
//! ```rust,ignore
//! let storage = Arc::new(SharedTraceStorage::new());
//! helpdesk_telemetry::init_with_storage("helpdesk", LogFormat::Json, storage.clone())?;
//! ```

pub mod memory;

pub use memory::{InMemoryTraceLayer, REQUEST_ID_FIELDS, SharedTraceStorage, SpanData, SpanStatus};

use std::sync::Arc;

use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, layer::SubscriberExt};

/// Log line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

fn fmt_layer(format: LogFormat) -> Box<dyn Layer<Registry> + Send + Sync> {
    match format {
        LogFormat::Pretty => fmt::layer().with_target(false).boxed(),
        LogFormat::Json => fmt::layer().json().with_current_span(true).boxed(),
    }
}

fn init(
    service_name: &str,
    format: LogFormat,
    storage: Option<Arc<SharedTraceStorage>>,
) -> Result<(), TryInitError> {
    tracing_subscriber::registry()
        .with(fmt_layer(format))
        .with(storage.map(InMemoryTraceLayer::new))
        .with(env_filter())
        .try_init()?;

    tracing::info!(service = service_name, ?format, "telemetry initialized");
    Ok(())
}

/// Install the global subscriber with log output only.
///
/// Fails if a global subscriber is already set.
pub fn init_telemetry(service_name: &str, format: LogFormat) -> Result<(), TryInitError> {
    init(service_name, format, None)
}

/// Install the global subscriber and capture request spans into `storage`.
pub fn init_with_storage(
    service_name: &str,
    format: LogFormat,
    storage: Arc<SharedTraceStorage>,
) -> Result<(), TryInitError> {
    init(service_name, format, Some(storage))
}
