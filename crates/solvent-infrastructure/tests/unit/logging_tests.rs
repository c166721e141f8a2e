//! Logging Tests

use solvent_domain::Error;
use solvent_infrastructure::constants::{DEFAULT_LOG_LEVEL, LOG_MAX_FILES};
use solvent_infrastructure::logging::{LoggingConfig, init_logging, parse_log_level};
use tracing::Level;

#[test]
fn test_parse_log_level() {
    assert_eq!(parse_log_level("trace").expect("level"), Level::TRACE);
    assert_eq!(parse_log_level("debug").expect("level"), Level::DEBUG);
    assert_eq!(parse_log_level("INFO").expect("level"), Level::INFO);
    assert_eq!(parse_log_level("warn").expect("level"), Level::WARN);
    assert_eq!(parse_log_level("warning").expect("level"), Level::WARN);
    assert_eq!(parse_log_level("error").expect("level"), Level::ERROR);

    match parse_log_level("invalid") {
        Err(Error::Configuration { message, source }) => {
            assert!(message.contains("invalid"));
            assert!(source.is_none());
        }
        other => panic!("Expected Configuration error, got {other:?}"),
    }
}

#[test]
fn test_logging_config_default() {
    let config = LoggingConfig::default();
    assert_eq!(config.level, DEFAULT_LOG_LEVEL);
    assert!(!config.json_format);
    assert!(config.file_output.is_none());
    assert_eq!(config.max_files, LOG_MAX_FILES);
}

#[test]
fn test_init_logging_rejects_invalid_level() {
    let config = LoggingConfig {
        level: "chatty".to_string(),
        ..LoggingConfig::default()
    };
    assert!(init_logging(&config).is_err());
}

#[test]
fn test_init_logging_installs_once() {
    let temp_dir = tempfile::TempDir::new().expect("temp dir");
    let config = LoggingConfig {
        json_format: true,
        file_output: Some(temp_dir.path().join("solvent.log")),
        ..LoggingConfig::default()
    };

    init_logging(&config).expect("first subscriber installs");
    assert!(matches!(
        init_logging(&config),
        Err(Error::Configuration { .. })
    ));
}
