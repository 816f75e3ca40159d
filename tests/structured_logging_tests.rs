//! Tests that verify structured logging fields are emitted by resolver
//! construction and ad-hoc caching.
//!
//! Uses `tracing-subscriber` with a custom in-memory layer to capture events
//! without relying on global subscriber state.

mod utils;

use mimetable::{MimeRecord, Overrides, Resolver, ResolverOptions};
use std::sync::{Arc, Mutex};
use tracing::Level;
use tracing_subscriber::Layer;
use tracing_subscriber::layer::SubscriberExt;
use utils::private_resolver;

// ---------------------------------------------------------------------------
// In-memory log capture layer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct CapturedEvent {
    level: Level,
    message: String,
    fields: Vec<(String, String)>,
}

struct CaptureLayer {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl<S: tracing::Subscriber> Layer<S> for CaptureLayer {
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let mut fields = Vec::new();
        let mut visitor = FieldVisitor(&mut fields);
        event.record(&mut visitor);

        let message = fields
            .iter()
            .find(|(k, _)| k == "message")
            .map(|(_, v)| v.clone())
            .unwrap_or_default();

        if let Ok(mut events) = self.events.lock() {
            events.push(CapturedEvent {
                level: *event.metadata().level(),
                message,
                fields,
            });
        }
    }
}

struct FieldVisitor<'a>(&'a mut Vec<(String, String)>);

impl tracing::field::Visit for FieldVisitor<'_> {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.push((field.name().to_string(), format!("{:?}", value)));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
}

fn with_captured_logs<F: FnOnce()>(f: F) -> Vec<CapturedEvent> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let layer = CaptureLayer {
        events: events.clone(),
    };
    let subscriber = tracing_subscriber::registry().with(layer);
    tracing::subscriber::with_default(subscriber, f);
    Arc::try_unwrap(events)
        .expect("events arc should be unique")
        .into_inner()
        .expect("events mutex not poisoned")
}

fn events_with_name<'a>(events: &'a [CapturedEvent], event_name: &str) -> Vec<&'a CapturedEvent> {
    events
        .iter()
        .filter(|e| e.fields.iter().any(|(k, v)| k == "event" && v == event_name))
        .collect()
}

fn get_field<'a>(event: &'a CapturedEvent, field_name: &str) -> Option<&'a str> {
    event
        .fields
        .iter()
        .find(|(k, _)| k == field_name)
        .map(|(_, v)| v.as_str())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn test_adhoc_caching_emits_one_event() {
    let resolver = private_resolver();
    let events = with_captured_logs(|| {
        resolver.mime_type("Application/X-Logged-Type");
        resolver.mime_type("application/x-logged-type");
    });

    let cached = events_with_name(&events, "adhoc_type_cached");
    assert_eq!(cached.len(), 1, "events: {:?}", events);
    let event = cached[0];
    assert_eq!(event.level, Level::DEBUG);
    assert_eq!(get_field(event, "mime_type"), Some("application/x-logged-type"));
    assert_eq!(get_field(event, "compressible"), Some("false"));
    assert_eq!(event.message, "cached unknown MIME type");
}

#[test]
fn test_known_type_lookup_emits_no_cache_event() {
    let resolver = private_resolver();
    let events = with_captured_logs(|| {
        resolver.mime_type("text/html");
        resolver.path("index.html");
    });
    assert!(events_with_name(&events, "adhoc_type_cached").is_empty());
}

#[test]
fn test_override_application_is_logged() {
    let events = with_captured_logs(|| {
        Resolver::new(ResolverOptions::new().overrides(
            Overrides::new()
                .with("text/html", MimeRecord::new().with_compressible(false))
                .with("text/css", MimeRecord::new().with_predicate(|e| e)),
        ));
    });

    let applied: Vec<&CapturedEvent> = events
        .iter()
        .filter(|e| e.message == "applied MIME override")
        .collect();
    assert_eq!(applied.len(), 2);
    assert_eq!(get_field(applied[0], "mime_type"), Some("text/html"));
    assert_eq!(get_field(applied[1], "has_predicate"), Some("true"));

    let summary = events
        .iter()
        .find(|e| e.message == "built resolver with overrides")
        .expect("summary event");
    assert_eq!(summary.level, Level::INFO);
    assert_eq!(get_field(summary, "overrides"), Some("2"));
}
