use std::sync::Arc;

use helpdesk_telemetry::{InMemoryTraceLayer, SharedTraceStorage, SpanStatus};
use tracing::{error, info, info_span};
use tracing_subscriber::layer::SubscriberExt;

fn capture<F: FnOnce()>(storage: &Arc<SharedTraceStorage>, work: F) {
    let subscriber = tracing_subscriber::registry().with(InMemoryTraceLayer::new(storage.clone()));
    tracing::subscriber::with_default(subscriber, work);
}

#[test]
fn child_spans_inherit_request_id() {
    let storage = Arc::new(SharedTraceStorage::new());

    capture(&storage, || {
        let request = info_span!("http.request", request_id = "req-123", method = "POST");
        let _request = request.enter();
        {
            let retrieve = info_span!("rag.retrieve", top_k = 10u64);
            let _retrieve = retrieve.enter();
            info!("retrieving");
        }
        info_span!("rag.generate", model = "gpt-5-mini").in_scope(|| {});
    });

    let spans = storage.get_trace("req-123").expect("spans for request");
    let names: Vec<&str> = spans.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["rag.retrieve", "rag.generate", "http.request"]);

    let retrieve = &spans[0];
    assert_eq!(retrieve.trace_id, "req-123");
    assert_eq!(retrieve.attributes["top_k"], 10);
    assert_eq!(retrieve.attributes["request_id"], "req-123");
    assert_eq!(retrieve.parent_span_id.as_deref(), Some(spans[2].span_id.as_str()));
    assert!(retrieve.end_time.is_some());
    assert!(retrieve.start_time > 0);
}

#[test]
fn dotted_request_field_is_recognised() {
    let storage = Arc::new(SharedTraceStorage::new());

    capture(&storage, || {
        info_span!("cli.ask", request.id = "cli-1").in_scope(|| {});
    });

    assert_eq!(storage.get_trace("cli-1").map(|s| s.len()), Some(1));
}

#[test]
fn spans_outside_requests_are_not_stored() {
    let storage = Arc::new(SharedTraceStorage::new());

    capture(&storage, || {
        info_span!("startup").in_scope(|| info!("ready"));
    });

    assert!(storage.is_empty());
}

#[test]
fn error_events_mark_the_span_failed() {
    let storage = Arc::new(SharedTraceStorage::new());

    capture(&storage, || {
        let request = info_span!("http.request", request_id = "req-err");
        let _request = request.enter();
        info_span!("rag.generate")
            .in_scope(|| error!(error = "upstream timeout", "generation failed"));
    });

    let spans = storage.get_trace("req-err").expect("spans for request");
    assert_eq!(spans[0].name, "rag.generate");
    assert_eq!(spans[0].status, SpanStatus::Error);
    assert_eq!(spans[1].status, SpanStatus::Ok);
}

#[test]
fn recorded_fields_are_captured() {
    let storage = Arc::new(SharedTraceStorage::new());

    capture(&storage, || {
        let span =
            info_span!("http.request", request_id = "req-rec", status = tracing::field::Empty);
        span.record("status", 200u64);
    });

    let spans = storage.get_trace("req-rec").expect("spans for request");
    assert_eq!(spans[0].attributes["status"], 200);
}
