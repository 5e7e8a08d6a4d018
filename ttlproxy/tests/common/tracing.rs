//! Capture `ttlproxy.*` spans and `ttlproxy` events so tests can assert on them.

use std::sync::{Arc, Mutex};

use tracing::span::{Attributes, Id, Record};
use tracing::{Dispatch, Event, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::Registry;
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;

/// Captured span information.
#[derive(Debug, Clone)]
pub struct CapturedSpan {
    pub id: u64,
    pub name: String,
    pub fields: Vec<(String, String)>,
}

impl CapturedSpan {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

struct FieldVisitor {
    fields: Vec<(String, String)>,
}

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.fields
            .push((field.name().to_string(), format!("{:?}", value)));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.fields
            .push((field.name().to_string(), value.to_string()));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.fields
            .push((field.name().to_string(), value.to_string()));
    }
}

struct SpanCaptureLayer {
    spans: Arc<Mutex<Vec<CapturedSpan>>>,
    events: Arc<Mutex<Vec<String>>>,
}

impl<S> Layer<S> for SpanCaptureLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, _ctx: Context<'_, S>) {
        if !attrs.metadata().name().starts_with("ttlproxy.") {
            return;
        }
        let mut visitor = FieldVisitor { fields: Vec::new() };
        attrs.record(&mut visitor);

        self.spans.lock().unwrap().push(CapturedSpan {
            id: id.into_u64(),
            name: attrs.metadata().name().to_string(),
            fields: visitor.fields,
        });
    }

    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if !event.metadata().target().starts_with("ttlproxy") {
            return;
        }
        let mut visitor = FieldVisitor { fields: Vec::new() };
        event.record(&mut visitor);

        if let Some((_, message)) = visitor.fields.into_iter().find(|(key, _)| key == "message") {
            self.events.lock().unwrap().push(message);
        }
    }

    fn on_record(&self, id: &Id, values: &Record<'_>, _ctx: Context<'_, S>) {
        let mut visitor = FieldVisitor { fields: Vec::new() };
        values.record(&mut visitor);

        let span_id = id.into_u64();
        let mut spans = self.spans.lock().unwrap();
        // The registry reuses ids of closed spans, so match the most recent one.
        if let Some(captured) = spans.iter_mut().rev().find(|s| s.id == span_id) {
            for (key, value) in visitor.fields {
                if let Some(existing) = captured.fields.iter_mut().find(|(k, _)| k == &key) {
                    existing.1 = value;
                } else {
                    captured.fields.push((key, value));
                }
            }
        }
    }
}

/// Collector for captured spans and event messages.
#[derive(Clone)]
pub struct SpanCollector {
    spans: Arc<Mutex<Vec<CapturedSpan>>>,
    events: Arc<Mutex<Vec<String>>>,
    dispatch: Dispatch,
}

impl SpanCollector {
    pub fn new() -> Self {
        let spans = Arc::new(Mutex::new(Vec::new()));
        let events = Arc::new(Mutex::new(Vec::new()));
        let layer = SpanCaptureLayer {
            spans: Arc::clone(&spans),
            events: Arc::clone(&events),
        };
        let dispatch = Dispatch::new(Registry::default().with(layer));
        Self {
            spans,
            events,
            dispatch,
        }
    }

    /// Messages of all captured events, in emission order.
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    /// Get the dispatch to install with `tracing::dispatcher::set_default`.
    pub fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }

    /// All captured spans with the given name, in creation order.
    pub fn spans_named(&self, name: &str) -> Vec<CapturedSpan> {
        self.spans
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.name == name)
            .cloned()
            .collect()
    }
}
