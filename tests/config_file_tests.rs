use std::path::PathBuf;
use std::sync::Arc;

use cfglog::{ConfigOption, Error, LoggerRegistry, RegistryStatus};

fn fixtures() -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .to_string_lossy()
        .to_string()
}

fn option(name: &str) -> ConfigOption {
    ConfigOption::new()
        .with_file_base_name(name)
        .with_search_paths([fixtures()])
}

#[test]
fn test_yaml_config_builds_every_appender() {
    let registry = LoggerRegistry::new();
    let (logger, err) = registry.get_logger(Some(&option("stdout").with_file_extension("yaml")));

    assert!(err.is_none(), "unexpected error: {:?}", err);
    assert_eq!(logger.appender_names(), vec!["console", "errors"]);
    assert_eq!(registry.status(), RegistryStatus::Ready);

    logger.in_scope(|| {
        tracing::debug!(attempt = 1, "yaml fixture");
        tracing::error!("yaml fixture failure");
    });
    assert!(logger.sync().is_ok());
}

#[test]
fn test_bare_name_prefers_json() {
    let registry = LoggerRegistry::new();
    let (logger, err) = registry.get_logger(Some(&option("stdout")));

    assert!(err.is_none());
    // stdout.json declares a single appender, stdout.yaml two.
    assert_eq!(logger.appender_names(), vec!["console"]);
}

#[test]
fn test_each_format_loads() {
    for ext in ["json", "toml", "yaml", "properties"] {
        let registry = LoggerRegistry::new();
        let (logger, err) = registry.get_logger(Some(&option("stdout").with_file_extension(ext)));
        assert!(err.is_none(), "{}: {:?}", ext, err);
        assert!(!logger.appender_names().is_empty(), "{}", ext);
    }
}

#[test]
fn test_name_with_extension() {
    let registry = LoggerRegistry::new();
    let (logger, err) =
        registry.get_logger(Some(&option("stdout.toml").with_file_extension("toml")));

    assert!(err.is_none());
    assert_eq!(logger.appender_names(), vec!["console"]);
}

#[test]
fn test_missing_file_returns_fallback() {
    let registry = LoggerRegistry::new();
    let (logger, err) = registry.get_logger(Some(&option("does_not_exist")));

    assert!(matches!(err, Some(Error::ConfigNotFound { .. })));
    assert!(Arc::ptr_eq(&logger, &registry.fallback().unwrap()));
    assert!(registry.current().is_none());
}

#[test]
fn test_unsupported_extension() {
    let registry = LoggerRegistry::new();
    let (_, err) = registry.get_logger(Some(&option("stdout").with_file_extension("xml")));

    let err = err.expect("error");
    assert_eq!(err.to_string(), "unsupported config type [xml]");
}

#[test]
fn test_broken_document_is_a_parse_error() {
    let registry = LoggerRegistry::new();
    let (_, err) = registry.get_logger(Some(&option("broken").with_file_extension("yaml")));

    assert!(matches!(err, Some(Error::ConfigParse { .. })));
}

#[test]
fn test_fatal_appender_configs() {
    let registry = LoggerRegistry::new();

    let (_, err) = registry.get_logger(Some(&option("no_appenders").with_file_extension("yaml")));
    assert!(matches!(err, Some(Error::NoAppendersDefined(_))));

    let (_, err) = registry.get_logger(Some(&option("missing_section").with_file_extension("json")));
    assert!(matches!(err, Some(Error::MissingSection(_))));

    assert_eq!(registry.status(), RegistryStatus::FallbackOnly);
}

#[test]
fn test_partial_config_keeps_good_appenders() {
    let registry = LoggerRegistry::new();
    let (logger, err) = registry.get_logger(Some(&option("partial").with_file_extension("yaml")));

    assert!(err.is_none());
    assert_eq!(logger.appender_names(), vec!["console"]);
}

#[test]
fn test_failed_config_keeps_previous_logger() {
    let registry = LoggerRegistry::new();
    let (good, _) = registry.get_logger(Some(&option("stdout").with_file_extension("json")));
    let (_, err) = registry.get_logger(Some(&option("no_appenders").with_file_extension("yaml")));

    assert!(err.is_some());
    assert!(Arc::ptr_eq(&registry.current().unwrap(), &good));
}

#[test]
fn test_search_path_order() {
    let first = tempfile::tempdir().expect("tempdir");
    std::fs::write(
        first.path().join("ordered.json"),
        r#"{"appenders": ["first"], "first": {"target": "stdout", "encoderConfig": "e"}, "e": {}}"#,
    )
    .unwrap();
    let second = tempfile::tempdir().expect("tempdir");
    std::fs::write(
        second.path().join("ordered.json"),
        r#"{"appenders": ["second"], "second": {"target": "stdout", "encoderConfig": "e"}, "e": {}}"#,
    )
    .unwrap();

    let option = ConfigOption::new().with_file_base_name("ordered").with_search_paths([
        first.path().to_string_lossy().to_string(),
        second.path().to_string_lossy().to_string(),
    ]);

    let registry = LoggerRegistry::new();
    let (logger, _) = registry.get_logger(Some(&option));
    assert_eq!(logger.appender_names(), vec!["first"]);
}
