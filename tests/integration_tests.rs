//! Integration tests for the appender registry
//!
//! These tests verify:
//! - Registration, lookup and removal of real file and console appenders
//! - Reset closing every registered appender
//! - Factory construction from JSON configuration
//! - Syslog factory argument validation

use appender_registry::appenders::{
    ConsoleAppender, FileAppender, StringIoAppender, SyslogOptions,
};
use appender_registry::core::{
    AppenderConfig, AppenderRegistry, LogEntry, LogLevel, LoggerError, SharedAppender,
    SyslogSupport,
};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_console_and_file_scenario() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("e.log");

    let registry = AppenderRegistry::new();
    let console = SharedAppender::new(ConsoleAppender::stdout());
    let errors = SharedAppender::new(
        FileAppender::new("errors", &log_file).expect("Failed to create appender"),
    );

    registry.set("console", console.clone());
    registry.set("errors", errors.clone());

    let mut visited = Vec::new();
    registry.each(|appender| visited.push(appender.name()));
    assert_eq!(visited, vec!["stdout", "errors"]);
    assert_eq!(registry.names(), vec!["console", "errors"]);

    assert!(registry.remove("console"));
    assert_eq!(registry.names(), vec!["errors"]);
    assert!(!console.is_closed(), "remove must not close");

    errors
        .append(&LogEntry::new(LogLevel::Error, "app", "disk almost full"))
        .expect("Failed to append");

    registry.reset().expect("Failed to reset");

    assert!(errors.is_closed());
    assert!(registry.is_empty());
    assert!(registry.get("errors").is_none());

    // reset flushed the buffered line before releasing the file
    let content = fs::read_to_string(&log_file).expect("Failed to read log file");
    assert!(content.contains("disk almost full"));
}

#[test]
fn test_replaced_appender_stays_open_until_caller_closes_it() {
    let registry = AppenderRegistry::new();
    let first = SharedAppender::new(StringIoAppender::new("first"));
    let second = SharedAppender::new(StringIoAppender::new("second"));

    registry.set("main", first.clone());
    registry.set("main", second.clone());

    assert!(registry.get("main").unwrap().ptr_eq(&second));
    assert!(!first.is_closed());

    registry.reset().expect("Failed to reset");
    assert!(second.is_closed());
    assert!(!first.is_closed(), "displaced appender is not owned by the registry");

    first.close().expect("Failed to close");
    assert!(first.is_closed());
}

#[test]
fn test_lookup_shares_state_with_caller() {
    let registry = AppenderRegistry::new();
    let memory = StringIoAppender::new("memory");
    let buffer = memory.buffer();
    registry.set("memory", SharedAppender::new(memory));

    let fetched = registry.get("memory").expect("appender registered");
    fetched
        .append(&LogEntry::new(LogLevel::Info, "svc", "through the registry"))
        .unwrap();

    assert_eq!(buffer.lines().len(), 1);
    assert!(buffer.contents().contains("svc : through the registry"));
}

#[test]
fn test_build_from_json_config() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("rolling").join("app.log");

    let raw = format!(
        r#"{{"kind": "rolling_file", "path": {}, "max_bytes": 64, "keep": 2, "layout": "json"}}"#,
        serde_json::to_string(&path).unwrap()
    );
    let config = AppenderConfig::from_json(&raw).expect("valid config");

    let registry = AppenderRegistry::new();
    let appender = registry.build("rolling", &config).expect("Failed to build");
    assert!(!registry.contains("rolling"), "build must not register");

    registry.set("rolling", appender.clone());
    for i in 0..6 {
        appender
            .append(&LogEntry::new(LogLevel::Info, "app", format!("entry {}", i)))
            .unwrap();
    }
    registry.reset().expect("Failed to reset");

    let current = fs::read_to_string(&path).expect("current file");
    for line in current.lines() {
        let value: serde_json::Value = serde_json::from_str(line).expect("json line");
        assert_eq!(value["logger"], "app");
    }
    assert!(temp_dir.path().join("rolling").join("app.log.1").exists());
    assert!(!temp_dir.path().join("rolling").join("app.log.3").exists());
}

#[test]
fn test_build_file_appender_truncates() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("app.log");
    fs::write(&path, "old content\n").unwrap();

    let registry = AppenderRegistry::new();
    let appender = registry
        .build(
            "file",
            &AppenderConfig::File {
                path: path.clone(),
                truncate: true,
                auto_flush: true,
                layout: Default::default(),
            },
        )
        .expect("Failed to build");

    appender
        .append(&LogEntry::new(LogLevel::Warn, "app", "new content"))
        .unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert!(!content.contains("old content"));
    assert!(content.contains("new content"));
}

#[test]
fn test_syslog_without_name_is_argument_error() {
    let registry = AppenderRegistry::new();

    let err = registry
        .syslog_appender(SyslogOptions::default())
        .unwrap_err();

    assert!(matches!(err, LoggerError::MissingArgument { .. }));
    assert!(!registry.syslog_resolved());
}

#[test]
fn test_syslog_appender_is_not_registered() {
    let registry = AppenderRegistry::new();

    match registry.syslog_appender(SyslogOptions::named("sys0")) {
        Ok(appender) => {
            assert_eq!(appender.name(), "sys0");
            assert!(registry.get("sys0").is_none());
            appender.close().expect("Failed to close");
        }
        Err(LoggerError::Unsupported { .. }) => {
            assert!(!cfg!(all(unix, feature = "syslog")));
        }
        Err(other) => panic!("unexpected error: {}", other),
    }
    assert!(registry.syslog_resolved());
    assert!(registry.is_empty());
}

#[test]
fn test_unsupported_platform() {
    let registry = AppenderRegistry::with_syslog_detector(|| {
        SyslogSupport::Unavailable("no native syslog facility".to_string())
    });

    let err = registry
        .build("sys", &AppenderConfig::Syslog {
            ident: None,
            facility: Default::default(),
            log_pid: false,
        })
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "syslog is not supported: no native syslog facility"
    );
}

#[test]
fn test_flush_all_skips_closed() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("flush.log");

    let registry = AppenderRegistry::new();
    let file = SharedAppender::new(FileAppender::new("file", &path).unwrap());
    let closed = SharedAppender::new(StringIoAppender::new("closed"));
    closed.close().unwrap();

    registry.set("file", file.clone());
    registry.set("closed", closed);

    file.append(&LogEntry::new(LogLevel::Info, "app", "buffered"))
        .unwrap();
    registry.flush_all().expect("Failed to flush");

    assert!(fs::read_to_string(&path).unwrap().contains("buffered"));
}
