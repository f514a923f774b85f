use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, RwLock};
use std::time::SystemTime;
use tracing::{Id, Level, Subscriber};
use tracing_subscriber::{Layer, layer::Context, registry::LookupSpan};

/// Span fields that identify the request a span belongs to.
pub const REQUEST_ID_FIELDS: [&str; 2] = ["request.id", "request_id"];

/// Requests kept by [`SharedTraceStorage::new`] before the oldest is evicted.
pub const DEFAULT_TRACE_CAPACITY: usize = 256;

/// Data for a captured span
#[derive(Debug, Clone, Serialize)]
pub struct SpanData {
    pub span_id: String,
    /// The request id the span was recorded under.
    pub trace_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_span_id: Option<String>,

    /// Nanoseconds since the Unix epoch.
    pub start_time: u128,
    pub end_time: Option<u128>,

    pub attributes: HashMap<String, serde_json::Value>,
    pub status: SpanStatus,
}

impl SpanData {
    pub fn duration_nanos(&self) -> Option<u128> {
        self.end_time.map(|end| end.saturating_sub(self.start_time))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SpanStatus {
    Ok,
    /// An `ERROR`-level event was emitted inside the span.
    Error,
}

#[derive(Debug, Default)]
struct Traces {
    by_request: HashMap<String, Vec<SpanData>>,
    order: VecDeque<String>,
}

/// Spans of recent requests, keyed by request id.
///
/// Holds at most `capacity` requests; recording a span for a new request
/// beyond that evicts the oldest one.
#[derive(Debug, Clone)]
pub struct SharedTraceStorage {
    traces: Arc<RwLock<Traces>>,
    capacity: usize,
}

impl Default for SharedTraceStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedTraceStorage {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_TRACE_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { traces: Arc::new(RwLock::new(Traces::default())), capacity: capacity.max(1) }
    }

    /// Spans recorded for `request_id`, in closing order.
    pub fn get_trace(&self, request_id: &str) -> Option<Vec<SpanData>> {
        self.traces.read().ok()?.by_request.get(request_id).cloned()
    }

    pub fn add_span(&self, request_id: String, span: SpanData) {
        let Ok(mut traces) = self.traces.write() else {
            return;
        };

        if !traces.by_request.contains_key(&request_id) {
            while traces.order.len() >= self.capacity {
                match traces.order.pop_front() {
                    Some(oldest) => {
                        traces.by_request.remove(&oldest);
                    }
                    None => break,
                }
            }
            traces.order.push_back(request_id.clone());
        }
        traces.by_request.entry(request_id).or_default().push(span);
    }

    /// Number of requests currently held.
    pub fn len(&self) -> usize {
        self.traces.read().map(|t| t.by_request.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A tracing layer that captures request-scoped spans in memory.
///
/// A span is stored when it, or one of its ancestors, carries a
/// `request.id` / `request_id` field. Spans outside any request are ignored.
pub struct InMemoryTraceLayer {
    storage: Arc<SharedTraceStorage>,
}

impl InMemoryTraceLayer {
    pub fn new(storage: Arc<SharedTraceStorage>) -> Self {
        Self { storage }
    }
}

#[derive(Clone)]
struct SpanFields(HashMap<String, serde_json::Value>);

struct StartTime(u128);

struct Failed;

fn now_nanos() -> u128 {
    SystemTime::now().duration_since(SystemTime::UNIX_EPOCH).unwrap_or_default().as_nanos()
}

fn request_id(fields: &HashMap<String, serde_json::Value>) -> Option<String> {
    REQUEST_ID_FIELDS.iter().find_map(|key| fields.get(*key)?.as_str().map(str::to_string))
}

impl<S> Layer<S> for InMemoryTraceLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &tracing::span::Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };

        let mut visitor = JsonVisitor::default();
        attrs.record(&mut visitor);
        let mut fields = visitor.0;

        // Child spans inherit the request id of their parent.
        if let Some(parent) = span.parent() {
            if let Some(parent_fields) = parent.extensions().get::<SpanFields>() {
                for key in REQUEST_ID_FIELDS {
                    if !fields.contains_key(key) {
                        if let Some(value) = parent_fields.0.get(key) {
                            fields.insert(key.to_string(), value.clone());
                        }
                    }
                }
            }
        }

        let mut extensions = span.extensions_mut();
        extensions.insert(StartTime(now_nanos()));
        extensions.insert(SpanFields(fields));
    }

    fn on_record(&self, id: &Id, values: &tracing::span::Record<'_>, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };
        let mut extensions = span.extensions_mut();
        if let Some(fields) = extensions.get_mut::<SpanFields>() {
            let mut visitor = JsonVisitor::default();
            values.record(&mut visitor);
            fields.0.extend(visitor.0);
        }
    }

    fn on_event(&self, event: &tracing::Event<'_>, ctx: Context<'_, S>) {
        if *event.metadata().level() != Level::ERROR {
            return;
        }
        if let Some(span) = ctx.event_span(event) {
            span.extensions_mut().insert(Failed);
        }
    }

    fn on_close(&self, id: Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(&id) else {
            return;
        };
        let extensions = span.extensions();

        let Some(fields) = extensions.get::<SpanFields>().map(|f| f.0.clone()) else {
            return;
        };
        let Some(request_id) = request_id(&fields) else {
            return;
        };

        let status =
            if extensions.get::<Failed>().is_some() { SpanStatus::Error } else { SpanStatus::Ok };

        let span_data = SpanData {
            span_id: format!("{:016x}", id.into_u64()),
            trace_id: request_id.clone(),
            name: span.metadata().name().to_string(),
            parent_span_id: span.parent().map(|p| format!("{:016x}", p.id().into_u64())),
            start_time: extensions.get::<StartTime>().map(|s| s.0).unwrap_or(0),
            end_time: Some(now_nanos()),
            attributes: fields,
            status,
        };

        self.storage.add_span(request_id, span_data);
    }
}

#[derive(Default)]
struct JsonVisitor(HashMap<String, serde_json::Value>);

impl tracing::field::Visit for JsonVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.insert(field.name().to_string(), serde_json::Value::String(format!("{:?}", value)));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.insert(field.name().to_string(), serde_json::Value::String(value.to_string()));
    }

    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.0.insert(field.name().to_string(), serde_json::Value::Bool(value));
    }

    fn record_i64(&mut self, field: &tracing::field::Field, value: i64) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_f64(&mut self, field: &tracing::field::Field, value: f64) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(name: &str) -> SpanData {
        SpanData {
            span_id: "0000000000000001".to_string(),
            trace_id: "req".to_string(),
            name: name.to_string(),
            parent_span_id: None,
            start_time: 10,
            end_time: Some(25),
            attributes: HashMap::new(),
            status: SpanStatus::Ok,
        }
    }

    #[test]
    fn storage_evicts_oldest_request() {
        let storage = SharedTraceStorage::with_capacity(2);
        storage.add_span("a".into(), span("one"));
        storage.add_span("b".into(), span("two"));
        storage.add_span("a".into(), span("three"));
        storage.add_span("c".into(), span("four"));

        assert_eq!(storage.len(), 2);
        assert!(storage.get_trace("a").is_none());
        assert_eq!(storage.get_trace("b").map(|s| s.len()), Some(1));
        assert_eq!(storage.get_trace("c").map(|s| s.len()), Some(1));
    }

    #[test]
    fn span_data_serialization() {
        let json = serde_json::to_value(span("rag.retrieve")).unwrap();

        assert_eq!(json["span_id"], "0000000000000001");
        assert_eq!(json["trace_id"], "req");
        assert_eq!(json["status"], "ok");
        assert!(json.get("parent_span_id").is_none());
        assert_eq!(span("x").duration_nanos(), Some(15));
    }
}
