//! Appender loading.
//!
//! The `appenders` list names the appenders to build. Each name refers to a
//! section of its own, which in turn points at an encoder-config section and,
//! for file output, at a rotating-file section:
//!
//! ```yaml
//! appenders: [console, file]
//! console:
//!   target: stdout
//!   encoderConfig: plain
//!   encoderType: console
//!   logLevel: debug
//! file:
//!   target: rolling
//!   encoderConfig: plain
//! plain:
//!   timeKey: time
//!   encodeTime: iso8601
//! rolling:
//!   filename: logs/app.log
//!   maxSize: 10
//!   maxBackups: 3
//! ```
//!
//! A broken appender does not prevent the others from loading; its error is
//! reported next to the successfully built ones.

use std::collections::{HashMap, HashSet};
use std::io::{self, Write};
use std::path::PathBuf;

use tracing::Level;

use crate::document::Document;
use crate::encoder::{
    CallerEncoding, DurationEncoding, EncoderConfig, EncoderKind, LevelEncoding, NameEncoding,
    TimeEncoding,
};
use crate::{Error, Result, RotatingWriter, RotationPolicy};

/// Top level key listing the appender names.
pub const APPENDERS_SECTION: &str = "appenders";

/// Where an appender writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Stdout,
    Stderr,
    RotatingFile {
        path: PathBuf,
        policy: RotationPolicy,
    },
}

impl Target {
    /// Open a writer for this target.
    pub fn open(&self) -> Box<dyn Write + Send> {
        match self {
            Target::Stdout => Box::new(io::stdout()),
            Target::Stderr => Box::new(io::stderr()),
            Target::RotatingFile { path, policy } => {
                Box::new(RotatingWriter::new(path.clone(), policy.clone()))
            }
        }
    }
}

/// A fully validated appender description.
#[derive(Debug, Clone, PartialEq)]
pub struct AppenderSpec {
    pub name: String,
    pub target: Target,
    pub encoder_config: EncoderConfig,
    pub encoder_kind: EncoderKind,
    pub level: Level,
}

/// Outcome of loading every declared appender.
///
/// `fatal` being set means `built` is unusable; `failed` always carries the
/// per-appender errors.
#[derive(Debug, Default)]
pub struct AppenderLoad {
    pub built: HashMap<String, AppenderSpec>,
    pub failed: HashMap<String, Error>,
    pub fatal: Option<Error>,
}

impl AppenderLoad {
    fn fatal(error: Error) -> Self {
        Self {
            fatal: Some(error),
            ..Self::default()
        }
    }
}

/// Load all appenders listed under `appenders`.
pub fn load_appenders(doc: &Document) -> AppenderLoad {
    if !doc.has(APPENDERS_SECTION) {
        return AppenderLoad::fatal(Error::MissingSection(APPENDERS_SECTION.to_string()));
    }

    let declared = doc.get_string_list(APPENDERS_SECTION).unwrap_or_default();
    if declared.is_empty() {
        return AppenderLoad::fatal(Error::NoAppendersDefined(APPENDERS_SECTION.to_string()));
    }

    let names: HashSet<String> = declared
        .iter()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect();
    if names.is_empty() {
        return AppenderLoad::fatal(Error::NoAppendersDefined(APPENDERS_SECTION.to_string()));
    }

    let mut load = AppenderLoad::default();
    for name in names {
        match load_appender(doc, &name) {
            Ok(spec) => {
                load.built.insert(name, spec);
            }
            Err(e) => {
                load.failed.insert(name, e);
            }
        }
    }

    if load.built.is_empty() {
        load.fatal = Some(Error::AllAppendersFailed(load.failed.len()));
    }

    load
}

/// Build one appender from the section named `name`.
pub fn load_appender(doc: &Document, name: &str) -> Result<AppenderSpec> {
    let section = doc
        .subsection(name)
        .ok_or_else(|| Error::AppenderSectionMissing(name.to_string()))?;

    let encoder_config = load_encoder_config(doc, &section, name)?;
    let target = load_target(doc, &section, name)?;
    let level = parse_level(&section.get_string("logLevel"));
    let encoder_kind = EncoderKind::from_text(&section.get_string("encoderType"));

    Ok(AppenderSpec {
        name: name.to_string(),
        target,
        encoder_config,
        encoder_kind,
        level,
    })
}

fn load_target(doc: &Document, section: &Document, name: &str) -> Result<Target> {
    let value = required_string(section, name, "target")?;

    if value.eq_ignore_ascii_case("stdout") {
        return Ok(Target::Stdout);
    }
    if value.eq_ignore_ascii_case("stderr") {
        return Ok(Target::Stderr);
    }

    let file_section = doc
        .subsection(&value)
        .ok_or_else(|| Error::TargetSectionMissing {
            appender: name.to_string(),
            target: value.clone(),
        })?;
    load_rotating_file(&file_section, &value)
}

fn load_rotating_file(section: &Document, section_name: &str) -> Result<Target> {
    let policy = RotationPolicy::new()
        .with_compress(section.get_bool("compress"))
        .with_local_time(section.get_bool("localTime"))
        .with_max_age_days(non_negative(section.get_i64("maxAge")))
        .with_max_backups(usize::try_from(section.get_i64("maxBackups")).unwrap_or(0))
        .with_max_size_mb(non_negative(section.get_i64("maxSize")));

    let filename = required_string(section, section_name, "filename")?.replace('\\', "/");
    let path = PathBuf::from(filename);

    if let Some(dir) = path.parent()
        && !dir.as_os_str().is_empty()
    {
        std::fs::create_dir_all(dir).map_err(|source| Error::DirectoryCreateFailed {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    Ok(Target::RotatingFile { path, policy })
}

fn non_negative(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

fn load_encoder_config(doc: &Document, section: &Document, name: &str) -> Result<EncoderConfig> {
    let section_name = required_string(section, name, "encoderConfig")?;
    let enc = doc
        .subsection(&section_name)
        .ok_or_else(|| Error::EncoderConfigSectionMissing {
            appender: name.to_string(),
            section: section_name.clone(),
        })?;

    let mut config = EncoderConfig::default();

    for (key, slot) in [
        ("callerKey", &mut config.caller_key),
        ("functionKey", &mut config.function_key),
        ("levelKey", &mut config.level_key),
        ("messageKey", &mut config.message_key),
        ("nameKey", &mut config.name_key),
        ("stacktraceKey", &mut config.stacktrace_key),
        ("timeKey", &mut config.time_key),
        ("consoleSeparator", &mut config.console_separator),
        ("lineEnding", &mut config.line_ending),
    ] {
        if enc.has(key) {
            *slot = enc.get_string(key);
        }
    }

    // Always assigned, even when absent, so every appender ends up with a
    // defined caller rendering.
    config.encode_caller = CallerEncoding::from_text(
        &present(&enc, "encodeCaller", "callerEncoder").unwrap_or_default(),
    );

    if let Some(s) = present(&enc, "encodeDuration", "durationEncoder") {
        config.encode_duration = DurationEncoding::from_text(&s);
    }
    if let Some(s) = present(&enc, "encodeLevel", "levelEncoder") {
        config.encode_level = LevelEncoding::from_text(&s);
    }
    if let Some(s) = present(&enc, "encodeName", "nameEncoder") {
        config.encode_name = NameEncoding::from_text(&s);
    }
    if let Some(s) = present(&enc, "encodeTime", "timeEncoder") {
        config.encode_time = TimeEncoding::from_text(&s);
    }

    Ok(config)
}

/// Value of `key`, or of its alternative spelling, when either is set.
fn present(section: &Document, key: &str, alias: &str) -> Option<String> {
    [key, alias]
        .into_iter()
        .find(|k| section.has(k))
        .map(|k| section.get_string(k))
}

/// Parse a severity threshold; anything unrecognised is info.
pub fn parse_level(s: &str) -> Level {
    match s.trim().to_ascii_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" | "warning" => Level::WARN,
        "error" | "dpanic" | "panic" | "fatal" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Returns a non-empty, trimmed string, or an error naming the missing key.
fn required_string(section: &Document, section_name: &str, key: &str) -> Result<String> {
    if !section.has(key) {
        return Err(Error::RequiredKeyMissing {
            section: section_name.to_string(),
            key: key.to_string(),
        });
    }

    let value = section.get_string(key).trim().to_string();
    if value.is_empty() {
        return Err(Error::RequiredKeyEmpty {
            section: section_name.to_string(),
            key: key.to_string(),
        });
    }
    Ok(value)
}
