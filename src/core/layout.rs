//! Line layouts used by the bundled appenders
//!
//! - Basic: `[2025-01-08T10:30:45.123Z] INFO   app : Request processed`
//! - Json: `{"level":"INFO","logger":"app","message":"Request processed",...}`

use super::log_entry::LogEntry;
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// Human-readable single line (default)
    #[default]
    Basic,

    /// One JSON object per line
    Json,
}

impl Layout {
    /// Render an entry without a trailing newline
    pub fn format(&self, entry: &LogEntry) -> String {
        match self {
            Layout::Basic => self.format_basic(entry),
            Layout::Json => self.format_json(entry),
        }
    }

    fn format_basic(&self, entry: &LogEntry) -> String {
        format!(
            "[{}] {:<5}  {} : {}",
            Self::timestamp(entry),
            entry.level,
            entry.logger,
            entry.message
        )
    }

    fn format_json(&self, entry: &LogEntry) -> String {
        serde_json::json!({
            "timestamp": Self::timestamp(entry),
            "level": entry.level.as_str(),
            "logger": entry.logger,
            "message": entry.message,
            "thread": entry.thread,
        })
        .to_string()
    }

    fn timestamp(entry: &LogEntry) -> String {
        entry
            .timestamp
            .to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}
