//! Tests for the logging system

use super::*;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_log_level_display() {
    assert_eq!(LogLevel::Trace.to_string(), "trace");
    assert_eq!(LogLevel::Debug.to_string(), "debug");
    assert_eq!(LogLevel::Info.to_string(), "info");
    assert_eq!(LogLevel::Warn.to_string(), "warn");
    assert_eq!(LogLevel::Error.to_string(), "error");
}

#[test]
fn test_reported_level_and_directory() {
    let file_system = LoggingSystem {
        config: LoggingConfig::new()
            .with_level(LogLevel::Warn)
            .with_output(LogOutput::File)
            .with_log_directory(PathBuf::from("/tmp/status-bridge-logs")),
        _guards: Vec::new(),
    };
    assert_eq!(file_system.log_level(), LogLevel::Warn);
    assert_eq!(
        file_system.log_directory(),
        Some(PathBuf::from("/tmp/status-bridge-logs"))
    );

    let console_system = LoggingSystem {
        config: LoggingConfig::new()
            .with_output(LogOutput::Console)
            .with_log_directory(PathBuf::from("/tmp/status-bridge-logs")),
        _guards: Vec::new(),
    };
    assert_eq!(console_system.log_directory(), None);
}

#[test]
fn test_logging_config_default() {
    let config = LoggingConfig::default();
    assert_eq!(config.level, LogLevel::Info);
    assert_eq!(config.format, LogFormat::Text);
    assert_eq!(config.output, LogOutput::Both);
    assert!(config.include_target);
    assert!(!config.include_thread_id);
    assert!(!config.include_file_info);
    assert_eq!(config.log_directory, Some(default_log_directory()));
}

#[test]
fn test_logging_config_builder() {
    let config = LoggingConfig::new()
        .with_level(LogLevel::Debug)
        .with_format(LogFormat::Json)
        .with_output(LogOutput::File)
        .with_target(false)
        .with_thread_id(true)
        .with_file_info(true)
        .with_module_level("status_bridge::severity", LogLevel::Trace)
        .with_log_directory(PathBuf::from("/var/log/status-bridge"));

    assert_eq!(config.level, LogLevel::Debug);
    assert_eq!(
        config.log_directory,
        Some(PathBuf::from("/var/log/status-bridge"))
    );
    assert_eq!(config.format, LogFormat::Json);
    assert_eq!(config.output, LogOutput::File);
    assert!(!config.include_target);
    assert!(config.include_thread_id);
    assert!(config.include_file_info);
    assert_eq!(
        config.module_levels.get("status_bridge::severity"),
        Some(&LogLevel::Trace)
    );
}

#[test]
fn test_logging_config_development() {
    let config = LoggingConfig::development();
    assert_eq!(config.level, LogLevel::Debug);
    assert_eq!(config.output, LogOutput::Console);
    assert!(config.include_file_info);
    assert_eq!(config.rotation.strategy, RotationStrategy::Never);
}

#[test]
fn test_logging_config_production() {
    let config = LoggingConfig::production();
    assert_eq!(config.level, LogLevel::Info);
    assert_eq!(config.format, LogFormat::Json);
    assert_eq!(config.output, LogOutput::Both);
    assert_eq!(config.rotation.max_files, 14);
    assert_eq!(config.module_levels.get("zbus"), Some(&LogLevel::Warn));
}

#[test]
fn test_logging_config_partial_json() {
    let config: LoggingConfig = serde_json::from_str(r#"{"level": "debug"}"#).unwrap();
    assert_eq!(config.level, LogLevel::Debug);
    assert_eq!(config.output, LogOutput::Both);
    assert_eq!(config.rotation, RotationConfig::default());
    assert!(config.include_target);
}

#[test]
fn test_rotation_strategy_serialization() {
    let json = serde_json::to_string(&RotationStrategy::Hourly).unwrap();
    assert_eq!(json, "\"hourly\"");

    let config: RotationConfig = serde_json::from_str(r#"{"strategy": "never"}"#).unwrap();
    assert_eq!(config.strategy, RotationStrategy::Never);
    assert_eq!(config.max_files, 7);
}

#[test]
fn test_env_filter_with_module_levels() {
    let config = LoggingConfig::new()
        .with_level(LogLevel::Warn)
        .with_module_level("status_bridge::supervisor", LogLevel::Debug);

    let filter = LoggingSystem::build_env_filter(&config).to_string();
    assert!(filter.contains("status_bridge::supervisor=debug"));
    assert!(filter.contains("warn"));
}

#[test]
fn test_file_appender_writes_into_directory() {
    use std::io::Write;

    let temp_dir = TempDir::new().unwrap();
    let config = LoggingConfig::new().with_rotation(RotationConfig::development());

    let mut appender = LoggingSystem::file_appender(&config, temp_dir.path()).unwrap();
    appender.write_all(b"hello\n").unwrap();
    appender.flush().unwrap();

    let files: Vec<_> = std::fs::read_dir(temp_dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().to_string())
        .collect();
    assert!(files.iter().any(|f| f.starts_with(LOG_FILE_NAME)));
}
