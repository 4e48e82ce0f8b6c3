//! Log entry structure handed to appenders

use super::log_level::LogLevel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;

thread_local! {
    static THREAD_LABEL: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Thread name if set, otherwise its id; computed once per thread
fn current_thread_label() -> String {
    THREAD_LABEL.with(|cache| {
        cache
            .borrow_mut()
            .get_or_insert_with(|| {
                let current = std::thread::current();
                match current.name() {
                    Some(name) => name.to_string(),
                    None => format!("{:?}", current.id()),
                }
            })
            .clone()
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: LogLevel,
    /// Name of the logger that produced the entry
    pub logger: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub thread: String,
}

impl LogEntry {
    /// Replaces newlines, carriage returns and tabs with escape sequences so a
    /// single entry can never span several output lines.
    fn sanitize(text: &str) -> String {
        if !text.contains(['\n', '\r', '\t']) {
            return text.to_string();
        }
        text.replace('\n', "\\n")
            .replace('\r', "\\r")
            .replace('\t', "\\t")
    }

    /// Logger name and message are both sanitized
    pub fn new(level: LogLevel, logger: impl AsRef<str>, message: impl AsRef<str>) -> Self {
        Self {
            level,
            logger: Self::sanitize(logger.as_ref()),
            message: Self::sanitize(message.as_ref()),
            timestamp: Utc::now(),
            thread: current_thread_label(),
        }
    }

    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_is_sanitized() {
        let entry = LogEntry::new(LogLevel::Info, "app", "line one\nline two\r\tend");
        assert_eq!(entry.message, "line one\\nline two\\r\\tend");
        assert_eq!(entry.logger, "app");
    }

    #[test]
    fn test_logger_name_is_sanitized() {
        let entry = LogEntry::new(LogLevel::Info, "svc\nFAKE] ERROR forged", "hello");
        assert_eq!(entry.logger, "svc\\nFAKE] ERROR forged");
        assert!(!entry.logger.contains('\n'));
    }

    #[test]
    fn test_thread_label_uses_name() {
        let handle = std::thread::Builder::new()
            .name("worker-7".to_string())
            .spawn(|| LogEntry::new(LogLevel::Debug, "app", "hi").thread)
            .unwrap();
        assert_eq!(handle.join().unwrap(), "worker-7");
    }
}
