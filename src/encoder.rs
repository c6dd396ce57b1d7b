//! Record encoders.
//!
//! An appender renders each record through a [`RecordEncoder`]: either one
//! JSON object per line or a separator-delimited console line. The
//! [`EncoderConfig`] decides key names, line endings and how levels, times,
//! durations, callers and logger names are rendered.

use std::fmt::Write as _;
use std::time::Duration;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local, SecondsFormat};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::Level;

/// Output format of an appender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncoderKind {
    #[default]
    Json,
    Console,
}

impl EncoderKind {
    /// `console` (any case) selects the console encoder, everything else JSON.
    pub fn from_text(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("console") {
            Self::Console
        } else {
            Self::Json
        }
    }
}

/// How levels are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LevelEncoding {
    /// `info`
    #[default]
    Lowercase,
    /// `info` in ANSI color
    LowercaseColor,
    /// `INFO`
    Capital,
    /// `INFO` in ANSI color
    CapitalColor,
}

impl LevelEncoding {
    pub fn from_text(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "capital" => Self::Capital,
            "capitalcolor" => Self::CapitalColor,
            "color" => Self::LowercaseColor,
            _ => Self::Lowercase,
        }
    }

    fn encode(self, level: Level) -> String {
        let name = level_name(level);
        match self {
            Self::Lowercase => name.to_string(),
            Self::Capital => name.to_ascii_uppercase(),
            Self::LowercaseColor => paint(level, name),
            Self::CapitalColor => paint(level, &name.to_ascii_uppercase()),
        }
    }
}

fn level_name(level: Level) -> &'static str {
    match level {
        Level::TRACE => "trace",
        Level::DEBUG => "debug",
        Level::INFO => "info",
        Level::WARN => "warn",
        _ => "error",
    }
}

fn paint(level: Level, text: &str) -> String {
    match level {
        Level::TRACE => text.cyan().to_string(),
        Level::DEBUG => text.magenta().to_string(),
        Level::INFO => text.blue().to_string(),
        Level::WARN => text.yellow().to_string(),
        _ => text.red().to_string(),
    }
}

/// How timestamps are rendered.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TimeEncoding {
    /// Floating point seconds since the Unix epoch.
    #[default]
    Epoch,
    /// Floating point milliseconds since the Unix epoch.
    EpochMillis,
    /// Integer nanoseconds since the Unix epoch.
    EpochNanos,
    /// `2026-01-09T15:04:05.000+0800`
    Iso8601,
    /// `2026-01-09T15:04:05+08:00`
    Rfc3339,
    /// RFC 3339 with nanoseconds.
    Rfc3339Nano,
    /// A strftime pattern such as `%Y-%m-%d %H:%M:%S`.
    Pattern(String),
}

impl TimeEncoding {
    /// Values starting with `%` are strftime patterns; an invalid pattern
    /// falls back to the default.
    pub fn from_text(s: &str) -> Self {
        let s = s.trim();
        if s.starts_with('%') {
            if StrftimeItems::new(s).any(|item| matches!(item, Item::Error)) {
                return Self::default();
            }
            return Self::Pattern(s.to_string());
        }

        match s.to_ascii_lowercase().as_str() {
            "rfc3339nano" => Self::Rfc3339Nano,
            "rfc3339" => Self::Rfc3339,
            "iso8601" => Self::Iso8601,
            "millis" => Self::EpochMillis,
            "nanos" => Self::EpochNanos,
            _ => Self::Epoch,
        }
    }

    fn encode(&self, time: &DateTime<Local>) -> Value {
        match self {
            Self::Epoch => Value::from(time.timestamp_micros() as f64 / 1e6),
            Self::EpochMillis => Value::from(time.timestamp_micros() as f64 / 1e3),
            Self::EpochNanos => time
                .timestamp_nanos_opt()
                .map(Value::from)
                .unwrap_or_else(|| Value::from(time.timestamp_micros().saturating_mul(1000))),
            Self::Iso8601 => Value::from(time.format("%Y-%m-%dT%H:%M:%S%.3f%z").to_string()),
            Self::Rfc3339 => Value::from(time.to_rfc3339_opts(SecondsFormat::Secs, true)),
            Self::Rfc3339Nano => Value::from(time.to_rfc3339_opts(SecondsFormat::Nanos, true)),
            Self::Pattern(pattern) => {
                let mut out = String::new();
                // Patterns are validated when parsed.
                let _ = write!(out, "{}", time.format(pattern));
                Value::from(out)
            }
        }
    }
}

/// How durations are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DurationEncoding {
    /// Floating point seconds.
    #[default]
    Seconds,
    /// Integer nanoseconds.
    Nanos,
    /// Floating point milliseconds.
    Millis,
    /// Human readable, e.g. `1.5ms`.
    String,
}

impl DurationEncoding {
    pub fn from_text(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "string" => Self::String,
            "nanos" => Self::Nanos,
            "ms" => Self::Millis,
            _ => Self::Seconds,
        }
    }

    pub fn encode(self, duration: Duration) -> Value {
        match self {
            Self::Seconds => Value::from(duration.as_secs_f64()),
            Self::Nanos => Value::from(u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)),
            Self::Millis => Value::from(duration.as_secs_f64() * 1e3),
            Self::String => Value::from(format!("{:?}", duration)),
        }
    }
}

/// How the caller location is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CallerEncoding {
    /// Last directory and file name: `src/lib.rs:42`.
    #[default]
    Short,
    /// Full path as recorded at compile time.
    Full,
}

impl CallerEncoding {
    pub fn from_text(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("full") {
            Self::Full
        } else {
            Self::Short
        }
    }

    fn encode(self, file: &str, line: u32) -> String {
        let file = match self {
            Self::Full => file,
            Self::Short => trim_path(file),
        };
        format!("{}:{}", file, line)
    }
}

fn trim_path(file: &str) -> &str {
    let normalized = file.rfind(['/', '\\']);
    let Some(last) = normalized else {
        return file;
    };
    match file[..last].rfind(['/', '\\']) {
        Some(second) => &file[second + 1..],
        None => file,
    }
}

/// How logger names are rendered. Only the full name is supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NameEncoding {
    #[default]
    Full,
}

impl NameEncoding {
    pub fn from_text(_s: &str) -> Self {
        Self::Full
    }
}

/// Key names and renderers used by an encoder. An empty key omits the entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderConfig {
    pub message_key: String,
    pub level_key: String,
    pub time_key: String,
    pub name_key: String,
    pub caller_key: String,
    pub function_key: String,
    pub stacktrace_key: String,
    pub line_ending: String,
    pub console_separator: String,
    pub encode_level: LevelEncoding,
    pub encode_time: TimeEncoding,
    pub encode_duration: DurationEncoding,
    pub encode_caller: CallerEncoding,
    pub encode_name: NameEncoding,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            message_key: "msg".to_string(),
            level_key: "level".to_string(),
            time_key: "ts".to_string(),
            name_key: "logger".to_string(),
            caller_key: "caller".to_string(),
            function_key: String::new(),
            stacktrace_key: "stacktrace".to_string(),
            line_ending: "\n".to_string(),
            console_separator: "\t".to_string(),
            encode_level: LevelEncoding::Lowercase,
            encode_time: TimeEncoding::Epoch,
            encode_duration: DurationEncoding::Seconds,
            encode_caller: CallerEncoding::Short,
            encode_name: NameEncoding::Full,
        }
    }
}

impl EncoderConfig {
    /// Human oriented settings used by the fallback logger.
    pub fn development() -> Self {
        Self {
            message_key: "M".to_string(),
            level_key: "L".to_string(),
            time_key: "T".to_string(),
            name_key: "N".to_string(),
            caller_key: "C".to_string(),
            function_key: String::new(),
            stacktrace_key: "S".to_string(),
            encode_level: LevelEncoding::Capital,
            encode_time: TimeEncoding::Iso8601,
            encode_duration: DurationEncoding::String,
            ..Self::default()
        }
    }

    fn line_ending(&self) -> &str {
        if self.line_ending.is_empty() {
            "\n"
        } else {
            &self.line_ending
        }
    }

    fn console_separator(&self) -> &str {
        if self.console_separator.is_empty() {
            "\t"
        } else {
            &self.console_separator
        }
    }
}

/// One log record, ready to be encoded.
#[derive(Debug)]
pub(crate) struct Record<'a> {
    pub time: DateTime<Local>,
    pub level: Level,
    pub name: &'a str,
    pub caller: Option<(&'a str, u32)>,
    pub function: Option<&'a str>,
    pub message: &'a str,
    pub fields: Vec<(String, Value)>,
    pub stacktrace: Option<String>,
}

/// Renders records with a fixed kind and config.
#[derive(Debug, Clone)]
pub struct RecordEncoder {
    kind: EncoderKind,
    config: EncoderConfig,
}

impl RecordEncoder {
    pub fn new(kind: EncoderKind, config: EncoderConfig) -> Self {
        Self { kind, config }
    }

    pub fn kind(&self) -> EncoderKind {
        self.kind
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    /// Render one record, including the line ending.
    pub(crate) fn encode(&self, record: &Record<'_>) -> String {
        match self.kind {
            EncoderKind::Json => self.encode_json(record),
            EncoderKind::Console => self.encode_console(record),
        }
    }

    /// Header entries in output order, with empty keys skipped. JSON leads
    /// with the level, console lines with the time.
    fn header(&self, record: &Record<'_>) -> Vec<(&str, Value)> {
        let c = &self.config;
        let mut entries = Vec::with_capacity(6);

        let level = (!c.level_key.is_empty())
            .then(|| (c.level_key.as_str(), Value::from(c.encode_level.encode(record.level))));
        let time = (!c.time_key.is_empty())
            .then(|| (c.time_key.as_str(), c.encode_time.encode(&record.time)));
        match self.kind {
            EncoderKind::Json => entries.extend(level.into_iter().chain(time)),
            EncoderKind::Console => entries.extend(time.into_iter().chain(level)),
        }
        if !c.name_key.is_empty() && !record.name.is_empty() {
            entries.push((c.name_key.as_str(), Value::from(record.name)));
        }
        if let Some((file, line)) = record.caller
            && !c.caller_key.is_empty()
        {
            entries.push((c.caller_key.as_str(), Value::from(c.encode_caller.encode(file, line))));
        }
        if let Some(function) = record.function
            && !c.function_key.is_empty()
        {
            entries.push((c.function_key.as_str(), Value::from(function)));
        }
        if !c.message_key.is_empty() {
            entries.push((c.message_key.as_str(), Value::from(record.message)));
        }
        entries
    }

    fn encode_json(&self, record: &Record<'_>) -> String {
        let mut out = String::from("{");
        let mut first = true;
        let mut push = |out: &mut String, key: &str, value: &Value| {
            if !first {
                out.push(',');
            }
            first = false;
            out.push_str(&Value::from(key).to_string());
            out.push(':');
            out.push_str(&value.to_string());
        };

        for (key, value) in self.header(record) {
            push(&mut out, key, &value);
        }
        if let Some(stack) = &record.stacktrace
            && !self.config.stacktrace_key.is_empty()
        {
            push(&mut out, &self.config.stacktrace_key, &Value::from(stack.as_str()));
        }
        for (key, value) in &record.fields {
            push(&mut out, key, value);
        }

        out.push('}');
        out.push_str(self.config.line_ending());
        out
    }

    fn encode_console(&self, record: &Record<'_>) -> String {
        let separator = self.config.console_separator();
        let mut parts: Vec<String> = self
            .header(record)
            .into_iter()
            .map(|(_, value)| match value {
                Value::String(s) => s,
                other => other.to_string(),
            })
            .collect();

        if !record.fields.is_empty() {
            let context: serde_json::Map<String, Value> = record.fields.iter().cloned().collect();
            parts.push(Value::Object(context).to_string());
        }

        let mut out = parts.join(separator);
        if let Some(stack) = &record.stacktrace
            && !self.config.stacktrace_key.is_empty()
        {
            out.push('\n');
            out.push_str(stack);
        }
        out.push_str(self.config.line_ending());
        out
    }
}
