use std::path::PathBuf;

use thiserror::Error as ThisError;

/// Errors that can occur while building a logger from configuration.
#[derive(ThisError, Debug)]
pub enum Error {
    /// I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// The requested config file extension is not supported.
    #[error("unsupported config type [{0}]")]
    UnsupportedConfigType(String),
    /// No config file was found under any search path.
    #[error("config file \"{name}\" not found in {paths:?}")]
    ConfigNotFound { name: String, paths: Vec<String> },
    /// The config file exists but could not be parsed.
    #[error("failed to parse config file {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },
    /// A required top level section is absent.
    #[error("missing section [{0}]")]
    MissingSection(String),
    /// The appender list is empty.
    #[error("no appender is defined in section [{0}]")]
    NoAppendersDefined(String),
    /// Every declared appender failed to load.
    #[error("failed to load all {0} appenders")]
    AllAppendersFailed(usize),
    /// An appender is declared but has no section of its own.
    #[error("cannot find the entry for appender [{0}]")]
    AppenderSectionMissing(String),
    /// A required key is absent.
    #[error("the key [{section}.{key}] does not exist")]
    RequiredKeyMissing { section: String, key: String },
    /// A required key is present but blank.
    #[error("the value of [{section}.{key}] is empty")]
    RequiredKeyEmpty { section: String, key: String },
    /// `target` names a section that does not exist.
    #[error("the value of [{appender}.target] is [{target}], but the entry was missing")]
    TargetSectionMissing { appender: String, target: String },
    /// `encoderConfig` names a section that does not exist.
    #[error("the value of [{appender}.encoderConfig] is [{section}], but the entry was missing")]
    EncoderConfigSectionMissing { appender: String, section: String },
    /// The directory for a log file could not be created.
    #[error("failed to create log directory {path}: {source}")]
    DirectoryCreateFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Installing a logger as the global default failed.
    #[error("Initialization error: {0}")]
    Init(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
