use std::sync::Arc;

use helpdesk_agent::Assistant;
use helpdesk_telemetry::SharedTraceStorage;

/// Shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub assistant: Arc<Assistant>,
    pub traces: Arc<SharedTraceStorage>,
}

impl AppState {
    pub fn new(assistant: Arc<Assistant>, traces: Arc<SharedTraceStorage>) -> Self {
        Self { assistant, traces }
    }
}
