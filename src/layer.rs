//! The tracing layer behind every appender.

use std::backtrace::Backtrace;
use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use chrono::Local;
use serde_json::Value;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Metadata, Subscriber, span};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

use crate::encoder::{Record, RecordEncoder};
use crate::options::RecordSettings;

/// Key of the span duration attached to span close records.
pub const ELAPSED_KEY: &str = "elapsed";

/// A named output shared between an appender layer and its logger.
pub struct Sink {
    name: String,
    writer: Mutex<Box<dyn Write + Send>>,
}

impl Sink {
    pub fn new(name: impl Into<String>, writer: Box<dyn Write + Send>) -> Self {
        Self {
            name: name.into(),
            writer: Mutex::new(writer),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Write one encoded record in a single locked call.
    pub fn write_record(&self, record: &[u8]) -> io::Result<()> {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        writer.write_all(record)
    }

    pub fn flush(&self) -> io::Result<()> {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        writer.flush()
    }
}

impl fmt::Debug for Sink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sink").field("name", &self.name).finish()
    }
}

/// When a span was opened.
struct SpanStart(Instant);

/// Encodes events (and, in development mode, span closings) and writes them
/// to one sink.
///
/// Level filtering is left to the per-layer filter wrapped around it.
#[derive(Debug)]
pub struct AppenderLayer {
    sink: Arc<Sink>,
    encoder: RecordEncoder,
    settings: Arc<RecordSettings>,
}

impl AppenderLayer {
    pub fn new(sink: Arc<Sink>, encoder: RecordEncoder, settings: Arc<RecordSettings>) -> Self {
        Self {
            sink,
            encoder,
            settings,
        }
    }

    fn write(&self, metadata: &Metadata<'_>, message: &str, event_fields: Vec<(String, Value)>) {
        let level = *metadata.level();

        let (caller, function) = if self.settings.caller {
            (metadata.file().zip(metadata.line()), metadata.module_path())
        } else {
            (None, None)
        };

        let stacktrace = (self.settings.development && level <= Level::WARN)
            .then(|| Backtrace::force_capture().to_string());

        let mut fields: Vec<(String, Value)> = self
            .settings
            .fields
            .iter()
            .map(|(k, v)| (k.clone(), Value::from(v.as_str())))
            .collect();
        fields.extend(event_fields);

        let record = Record {
            time: Local::now(),
            level,
            name: metadata.target(),
            caller,
            function,
            message,
            fields,
            stacktrace,
        };

        // Delivery is best effort.
        let _ = self.sink.write_record(self.encoder.encode(&record).as_bytes());
    }
}

impl<S> Layer<S> for AppenderLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, _attrs: &span::Attributes<'_>, id: &span::Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };
        // Several appenders see the same span; the first one stamps it.
        let mut extensions = span.extensions_mut();
        if extensions.get_mut::<SpanStart>().is_none() {
            extensions.insert(SpanStart(Instant::now()));
        }
    }

    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut collector = FieldCollector::default();
        event.record(&mut collector);
        self.write(event.metadata(), &collector.message, collector.fields);
    }

    /// Span timings are only reported in development mode.
    fn on_close(&self, id: span::Id, ctx: Context<'_, S>) {
        if !self.settings.development {
            return;
        }
        let Some(span) = ctx.span(&id) else {
            return;
        };

        let elapsed = span.extensions().get::<SpanStart>().map(|s| s.0.elapsed());
        let fields = elapsed
            .map(|d| {
                vec![(
                    ELAPSED_KEY.to_string(),
                    self.encoder.config().encode_duration.encode(d),
                )]
            })
            .unwrap_or_default();

        self.write(span.metadata(), span.name(), fields);
    }
}

/// Splits an event into its message and the remaining fields.
#[derive(Debug, Default)]
struct FieldCollector {
    message: String,
    fields: Vec<(String, Value)>,
}

impl FieldCollector {
    fn push(&mut self, field: &Field, value: Value) {
        if field.name() == "message" {
            self.message = match value {
                Value::String(s) => s,
                other => other.to_string(),
            };
        } else {
            self.fields.push((field.name().to_string(), value));
        }
    }
}

impl Visit for FieldCollector {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.push(field, Value::from(format!("{:?}", value)));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.push(field, Value::from(value));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.push(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.push(field, Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.push(field, Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.push(field, Value::from(value));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.push(field, Value::from(value.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::{EncoderConfig, EncoderKind};
    use tracing_subscriber::layer::SubscriberExt;

    /// Collects everything written into a shared buffer.
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn lines(&self) -> Vec<Value> {
            String::from_utf8(self.0.lock().unwrap().clone())
                .unwrap()
                .lines()
                .map(|l| serde_json::from_str(l).unwrap())
                .collect()
        }
    }

    fn dispatch_with(settings: RecordSettings, config: EncoderConfig) -> (tracing::Dispatch, Captured) {
        let captured = Captured::default();
        let sink = Arc::new(Sink::new("test", Box::new(captured.clone())));
        let layer = AppenderLayer::new(
            sink,
            RecordEncoder::new(EncoderKind::Json, config),
            Arc::new(settings),
        );
        let subscriber = tracing_subscriber::registry().with(layer);
        (tracing::Dispatch::new(subscriber), captured)
    }

    #[test]
    fn test_event_fields_and_message() {
        let (dispatch, captured) = dispatch_with(RecordSettings::default(), EncoderConfig::default());

        tracing::dispatcher::with_default(&dispatch, || {
            tracing::info!(user = "alice", attempts = 3, ok = true, "User logged in");
        });

        let lines = captured.lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["msg"], "User logged in");
        assert_eq!(lines[0]["user"], "alice");
        assert_eq!(lines[0]["attempts"], 3);
        assert_eq!(lines[0]["ok"], true);
        assert!(lines[0].get("caller").is_none());
    }

    #[test]
    fn test_settings_applied() {
        let settings = RecordSettings {
            caller: true,
            development: true,
            fields: vec![("app".to_string(), "demo".to_string())],
        };
        let config = EncoderConfig {
            function_key: "func".to_string(),
            ..EncoderConfig::default()
        };
        let (dispatch, captured) = dispatch_with(settings, config);

        tracing::dispatcher::with_default(&dispatch, || {
            tracing::info!("plain");
            tracing::warn!("careful");
        });

        let lines = captured.lines();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["app"], "demo");
        assert!(lines[0]["caller"].as_str().unwrap().contains("layer.rs:"));
        assert!(lines[0]["func"].as_str().unwrap().contains("layer"));
        assert!(lines[0].get("stacktrace").is_none());
        assert!(lines[1]["stacktrace"].is_string());
    }

    #[test]
    fn test_span_close_reports_elapsed() {
        let config = EncoderConfig {
            encode_duration: crate::encoder::DurationEncoding::Nanos,
            ..EncoderConfig::default()
        };
        let settings = RecordSettings {
            development: true,
            ..RecordSettings::default()
        };
        let (dispatch, captured) = dispatch_with(settings, config);

        tracing::dispatcher::with_default(&dispatch, || {
            let span = tracing::info_span!("request");
            span.in_scope(|| tracing::info!("inside"));
        });

        let lines = captured.lines();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["msg"], "inside");
        assert_eq!(lines[1]["msg"], "request");
        assert!(lines[1][ELAPSED_KEY].is_u64());
    }

    #[test]
    fn test_span_close_silent_outside_development() {
        let (dispatch, captured) = dispatch_with(RecordSettings::default(), EncoderConfig::default());

        tracing::dispatcher::with_default(&dispatch, || {
            let span = tracing::info_span!("request");
            span.in_scope(|| tracing::info!("inside"));
        });

        let lines = captured.lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["msg"], "inside");
    }
}
