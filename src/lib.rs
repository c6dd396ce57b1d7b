//! # cfglog
//!
//! Configuration driven loggers built on `tracing`.
//!
//! A configuration file names a set of appenders. Each appender writes to
//! stdout, stderr or a size-rotated file, with its own record layout and its
//! own minimum level. All appenders are combined into one [`Logger`], which is
//! cached and reused until the requested configuration changes.
//!
//! ## Features
//!
//! - Config files in JSON, TOML, YAML, properties, dotenv and INI
//! - JSON and console record encoders with configurable keys
//! - Size based file rotation with backup pruning and gzip compression
//! - A fallback logger on stderr whenever no configured logger can be built
//!
//! ## Example
//!
//! ```rust,no_run
//! use cfglog::{get_logger, ConfigOption};
//!
//! let option = ConfigOption::new()
//!     .with_file_base_name("app")
//!     .with_search_paths(["conf", "."]);
//!
//! let (logger, err) = get_logger(Some(&option));
//! if let Some(err) = err {
//!     eprintln!("running on the fallback logger: {}", err);
//! }
//!
//! logger.in_scope(|| tracing::info!(user = "alice", "logged in"));
//! ```

pub mod appender;
pub mod builder;
pub mod config;
pub mod document;
pub mod encoder;
pub mod error;
mod format;
pub mod layer;
pub mod logger;
pub mod options;
pub mod registry;
pub mod rotation;
pub mod source;
pub mod util;
pub mod writer;

pub use appender::{AppenderLoad, AppenderSpec, Target, load_appender, load_appenders};
pub use builder::{LoggerBuilder, fallback_logger};
pub use config::ConfigOption;
pub use document::Document;
pub use encoder::{
    CallerEncoding, DurationEncoding, EncoderConfig, EncoderKind, LevelEncoding, NameEncoding,
    TimeEncoding,
};
pub use error::{Error, Result};
pub use format::SUPPORTED_EXTENSIONS;
pub use logger::Logger;
pub use options::{LoggerOption, load_options};
pub use registry::{LoggerRegistry, RegistryStatus, get_logger};
pub use rotation::RotationPolicy;
pub use source::{ConfigSource, FileConfigSource};
pub use writer::RotatingWriter;
