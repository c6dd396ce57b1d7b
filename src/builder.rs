//! Builder pattern for assembling a [`Logger`].
//!
//! Appender specs and logger options are collected first and turned into a
//! single tracing dispatcher by [`LoggerBuilder::build`]. Every appender
//! becomes one layer with its own level filter, and all layers sit on one
//! registry, so a record is written to every appender whose level admits it.
//!
//! # Example
//!
//! ```rust
//! use cfglog::{AppenderSpec, EncoderConfig, EncoderKind, LoggerBuilder, LoggerOption, Target};
//!
//! let logger = LoggerBuilder::new()
//!     .with_appender(AppenderSpec {
//!         name: "console".to_string(),
//!         target: Target::Stderr,
//!         encoder_config: EncoderConfig::default(),
//!         encoder_kind: EncoderKind::Console,
//!         level: tracing::Level::DEBUG,
//!     })
//!     .with_option(LoggerOption::AddCaller)
//!     .build();
//!
//! logger.in_scope(|| tracing::info!("hello"));
//! ```

use std::sync::Arc;

use tracing::Dispatch;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::{Layer, SubscriberExt};
use tracing_subscriber::{EnvFilter, Registry};

use crate::appender::{AppenderSpec, Target};
use crate::encoder::{EncoderConfig, EncoderKind, RecordEncoder};
use crate::layer::{AppenderLayer, Sink};
use crate::options::{LoggerOption, RecordSettings};
use crate::Logger;

/// Level of the fallback logger when `RUST_LOG` is unset.
pub const FALLBACK_LEVEL: &str = "debug";

/// Name of the fallback logger's only appender.
pub const FALLBACK_APPENDER: &str = "fallback";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// A builder that combines appenders and options into one [`Logger`].
#[derive(Debug, Clone, Default)]
pub struct LoggerBuilder {
    appenders: Vec<AppenderSpec>,
    options: Vec<LoggerOption>,
}

impl LoggerBuilder {
    /// Create a builder with no appenders and no options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one appender.
    pub fn with_appender(mut self, spec: AppenderSpec) -> Self {
        self.appenders.push(spec);
        self
    }

    /// Add several appenders.
    pub fn with_appenders(mut self, specs: impl IntoIterator<Item = AppenderSpec>) -> Self {
        self.appenders.extend(specs);
        self
    }

    /// Add one logger-wide option.
    pub fn with_option(mut self, option: LoggerOption) -> Self {
        self.options.push(option);
        self
    }

    /// Add several logger-wide options.
    pub fn with_options(mut self, options: impl IntoIterator<Item = LoggerOption>) -> Self {
        self.options.extend(options);
        self
    }

    /// Assemble the logger. Writers are opened lazily, so this cannot fail.
    pub fn build(self) -> Logger {
        let settings = Arc::new(RecordSettings::from_options(&self.options));
        let mut sinks = Vec::with_capacity(self.appenders.len());
        let mut layers: Vec<BoxedLayer> = Vec::with_capacity(self.appenders.len());

        for spec in self.appenders {
            let sink = Arc::new(Sink::new(spec.name.as_str(), spec.target.open()));
            let layer = AppenderLayer::new(
                Arc::clone(&sink),
                RecordEncoder::new(spec.encoder_kind, spec.encoder_config),
                Arc::clone(&settings),
            )
            .with_filter(LevelFilter::from_level(spec.level));

            layers.push(Box::new(layer));
            sinks.push(sink);
        }

        let subscriber = Registry::default().with(layers);
        Logger::new(Dispatch::new(subscriber), sinks)
    }
}

/// Build the configuration-free logger used when no configured one exists:
/// development console records on stderr with caller and backtraces.
pub fn fallback_logger() -> Logger {
    let spec = fallback_log_spec(std::env::var("RUST_LOG").ok());
    let filter = EnvFilter::try_new(&spec).unwrap_or_else(|_| EnvFilter::new(FALLBACK_LEVEL));

    let settings = Arc::new(RecordSettings::from_options(&[
        LoggerOption::AddCaller,
        LoggerOption::Development,
    ]));
    let sink = Arc::new(Sink::new(FALLBACK_APPENDER, Target::Stderr.open()));
    let layer: BoxedLayer = Box::new(
        AppenderLayer::new(
            Arc::clone(&sink),
            RecordEncoder::new(EncoderKind::Console, EncoderConfig::development()),
            settings,
        )
        .with_filter(filter),
    );

    let subscriber = Registry::default().with(vec![layer]);
    Logger::new(Dispatch::new(subscriber), vec![sink])
}

/// `RUST_LOG` takes precedence when set and non-empty.
fn fallback_log_spec(rust_log: Option<String>) -> String {
    match rust_log {
        Some(spec) if !spec.trim().is_empty() => spec,
        _ => FALLBACK_LEVEL.to_string(),
    }
}
