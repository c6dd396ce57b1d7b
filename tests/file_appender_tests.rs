use std::path::Path;

use cfglog::{ConfigOption, LoggerRegistry};
use serde_json::Value;

fn write_config(dir: &Path, log_path: &Path, extra: &str, development: bool) {
    let config = format!(
        r#"
appenders: [file, warnings]

options:
  caller: true
  development: {development}
  fields:
    service: billing

file:
  target: rolling
  encoderConfig: structured
  logLevel: debug

warnings:
  target: rolling_warn
  encoderConfig: plain
  encoderType: console
  logLevel: warn

structured:
  timeKey: time
  encodeTime: rfc3339
  encodeLevel: capital
{extra}

plain:
  consoleSeparator: " | "

rolling:
  filename: "{file}"
  maxSize: 1
  maxBackups: 2

rolling_warn:
  filename: "{warn}"
"#,
        extra = extra,
        development = development,
        file = log_path.display(),
        warn = log_path.with_extension("warn.log").display(),
    );
    std::fs::write(dir.join("app.yaml"), config).unwrap();
}

fn option(dir: &Path) -> ConfigOption {
    ConfigOption::new()
        .with_file_base_name("app")
        .with_search_paths([dir.to_string_lossy().to_string()])
}

#[test]
fn test_records_reach_each_file_by_level() {
    let dir = tempfile::tempdir().expect("tempdir");
    let log_path = dir.path().join("logs").join("app.log");
    write_config(dir.path(), &log_path, "", false);

    let registry = LoggerRegistry::new();
    let (logger, err) = registry.get_logger(Some(&option(dir.path())));
    assert!(err.is_none(), "unexpected error: {:?}", err);

    logger.in_scope(|| {
        tracing::info!(invoice = 42, "invoice sent");
        tracing::warn!("payment late");
    });
    logger.sync().unwrap();

    let content = std::fs::read_to_string(&log_path).unwrap();
    let records: Vec<Value> = content
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["level"], "INFO");
    assert_eq!(records[0]["msg"], "invoice sent");
    assert_eq!(records[0]["invoice"], 42);
    assert_eq!(records[0]["service"], "billing");
    assert!(records[0]["time"].is_string());
    assert!(
        records[0]["caller"]
            .as_str()
            .unwrap()
            .contains("file_appender_tests.rs:")
    );
    assert_eq!(records[1]["level"], "WARN");

    let warnings = std::fs::read_to_string(log_path.with_extension("warn.log")).unwrap();
    assert!(!warnings.contains("invoice sent"));
    assert!(warnings.contains(" | payment late"));
}

#[test]
fn test_directories_are_created() {
    let dir = tempfile::tempdir().expect("tempdir");
    let log_path = dir.path().join("a").join("b").join("c").join("app.log");
    write_config(dir.path(), &log_path, "", false);

    let registry = LoggerRegistry::new();
    let (_, err) = registry.get_logger(Some(&option(dir.path())));

    assert!(err.is_none());
    assert!(log_path.parent().unwrap().is_dir());
    // Files are opened on first write.
    assert!(!log_path.exists());
}

#[test]
fn test_custom_keys() {
    let dir = tempfile::tempdir().expect("tempdir");
    let log_path = dir.path().join("app.log");
    write_config(
        dir.path(),
        &log_path,
        "  messageKey: message\n  levelKey: severity\n  encodeDuration: ms",
        true,
    );

    let registry = LoggerRegistry::new();
    let (logger, _) = registry.get_logger(Some(&option(dir.path())));
    logger.in_scope(|| {
        let span = tracing::info_span!("checkout");
        let _guard = span.enter();
        tracing::error!("declined");
    });
    logger.sync().unwrap();

    let content = std::fs::read_to_string(&log_path).unwrap();
    let records: Vec<Value> = content
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(records[0]["severity"], "ERROR");
    assert_eq!(records[0]["message"], "declined");
    assert!(records[0].get("msg").is_none());
    assert_eq!(records[1]["message"], "checkout");
    assert!(records[1]["elapsed"].is_number());
}

#[test]
fn test_force_new_reopens_files() {
    let dir = tempfile::tempdir().expect("tempdir");
    let log_path = dir.path().join("app.log");
    write_config(dir.path(), &log_path, "", false);

    let registry = LoggerRegistry::new();
    let (first, _) = registry.get_logger(Some(&option(dir.path())));
    first.in_scope(|| tracing::info!("before"));

    let (second, err) = registry.get_logger(Some(&option(dir.path()).with_force_new(true)));
    assert!(err.is_none());
    second.in_scope(|| tracing::info!("after"));
    second.sync().unwrap();

    let content = std::fs::read_to_string(&log_path).unwrap();
    assert!(content.contains("before"));
    assert!(content.contains("after"));
}
