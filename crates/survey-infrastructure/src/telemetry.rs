//! In-memory telemetry capture.
//!
//! `TelemetryLayer` turns every `tracing` event aimed at one of the survey
//! categories into a `LogEntry` and keeps the most recent ones in a
//! `LogBuffer`. The buffer can be exported as JSON for offline analysis.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use survey_core::error::Result;
use tracing::{Event, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::layer::Context;

/// Entries kept before the oldest is evicted.
pub const LOG_BUFFER_CAPACITY: usize = 100;

/// Event targets captured by the layer.
pub const CATEGORIES: [&str; 4] = ["survey", "navigation", "form", "analytics"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub level: String,
    pub category: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Bounded, shared ring of recent entries.
#[derive(Debug, Clone)]
pub struct LogBuffer {
    entries: Arc<Mutex<VecDeque<LogEntry>>>,
    capacity: usize,
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::with_capacity(LOG_BUFFER_CAPACITY)
    }
}

impl LogBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    pub fn push(&self, entry: LogEntry) {
        let Ok(mut entries) = self.entries.lock() else {
            return;
        };
        while entries.len() >= self.capacity.max(1) {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    /// Oldest first.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .map(|entries| entries.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }

    pub fn export_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.entries())?)
    }
}

/// Tracing layer feeding a `LogBuffer`.
pub struct TelemetryLayer {
    buffer: LogBuffer,
}

impl TelemetryLayer {
    pub fn new(buffer: LogBuffer) -> Self {
        Self { buffer }
    }

    /// Per-layer filter passing every level of the survey categories, so
    /// the buffer does not depend on the log file's verbosity.
    pub fn category_filter() -> Targets {
        Targets::new().with_targets(CATEGORIES.map(|category| (category, LevelFilter::TRACE)))
    }
}

impl<S> Layer<S> for TelemetryLayer
where
    S: Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let category = metadata.target();
        if !CATEGORIES.contains(&category) {
            return;
        }

        let mut fields = Map::new();
        let mut visitor = FieldVisitor(&mut fields);
        event.record(&mut visitor);

        let message = match fields.remove("message") {
            Some(Value::String(s)) => s,
            Some(other) => other.to_string(),
            None => String::new(),
        };

        self.buffer.push(LogEntry {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            level: metadata.level().as_str().to_lowercase(),
            category: category.to_string(),
            message,
            data: (!fields.is_empty()).then_some(Value::Object(fields)),
        });
    }
}

/// Collects event fields as JSON values
struct FieldVisitor<'a>(&'a mut Map<String, Value>);

impl<'a> tracing::field::Visit for FieldVisitor<'a> {
    fn record_f64(&mut self, field: &tracing::field::Field, value: f64) {
        self.0
            .insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_i64(&mut self, field: &tracing::field::Field, value: i64) {
        self.0
            .insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0
            .insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.0
            .insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0
            .insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.insert(
            field.name().to_string(),
            serde_json::json!(format!("{:?}", value)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::layer::SubscriberExt;

    fn entry(message: &str) -> LogEntry {
        LogEntry {
            timestamp: "2026-03-01T12:00:00.000Z".to_string(),
            level: "info".to_string(),
            category: "survey".to_string(),
            message: message.to_string(),
            data: None,
        }
    }

    fn capture<F: FnOnce()>(f: F) -> LogBuffer {
        let buffer = LogBuffer::new();
        let subscriber =
            tracing_subscriber::registry().with(TelemetryLayer::new(buffer.clone()));
        tracing::subscriber::with_default(subscriber, f);
        buffer
    }

    #[test]
    fn test_buffer_evicts_oldest() {
        let buffer = LogBuffer::new();
        for i in 0..LOG_BUFFER_CAPACITY + 5 {
            buffer.push(entry(&format!("event {}", i)));
        }

        let entries = buffer.entries();
        assert_eq!(entries.len(), LOG_BUFFER_CAPACITY);
        assert_eq!(entries[0].message, "event 5");
        assert_eq!(entries.last().unwrap().message, "event 104");
    }

    #[test]
    fn test_clear() {
        let buffer = LogBuffer::with_capacity(2);
        buffer.push(entry("a"));
        buffer.clear();
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_layer_records_category_and_fields() {
        let buffer = capture(|| {
            tracing::info!(
                target: "navigation",
                from = "Welcome",
                to = "Intake",
                time_on_screen = 12u64,
                "Navigate: Welcome -> Intake"
            );
        });

        let entries = buffer.entries();
        assert_eq!(entries.len(), 1);
        let e = &entries[0];
        assert_eq!(e.category, "navigation");
        assert_eq!(e.level, "info");
        assert_eq!(e.message, "Navigate: Welcome -> Intake");
        let data = e.data.as_ref().unwrap();
        assert_eq!(data["from"], "Welcome");
        assert_eq!(data["time_on_screen"], 12);
        assert!(data.get("message").is_none());
    }

    #[test]
    fn test_layer_ignores_other_targets() {
        let buffer = capture(|| {
            tracing::info!(target: "hyper::client", "connected");
            tracing::warn!(target: "survey", "Failed to save state");
        });

        let entries = buffer.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].level, "warn");
        assert!(entries[0].data.is_none());
    }

    #[test]
    fn test_category_filter_keeps_debug_events_beside_quieter_layers() {
        let buffer = LogBuffer::new();
        let subscriber = tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::sink)
                    .with_filter(LevelFilter::INFO),
            )
            .with(
                TelemetryLayer::new(buffer.clone())
                    .with_filter(TelemetryLayer::category_filter()),
            );
        tracing::subscriber::with_default(subscriber, || {
            tracing::debug!(target: "form", field = "consent", "Field updated: consent");
            tracing::trace!(target: "survey", "Record written");
            tracing::debug!(target: "hyper::client", "connected");
        });

        let categories: Vec<_> = buffer.entries().into_iter().map(|e| e.category).collect();
        assert_eq!(categories, vec!["form", "survey"]);
    }

    #[test]
    fn test_export_json() {
        let buffer = LogBuffer::new();
        buffer.push(entry("Survey initialized"));

        let json: Value = serde_json::from_str(&buffer.export_json().unwrap()).unwrap();
        assert_eq!(json[0]["message"], "Survey initialized");
        assert_eq!(json[0]["category"], "survey");
    }
}
