//! Entry severities and their textual, syslog and console forms

use super::error::LoggerError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity of a [`LogEntry`](super::LogEntry), ordered from least to most
/// severe.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    #[serde(alias = "warning")]
    Warn,
    Error,
    Fatal,
}

impl LogLevel {
    const LEVELS: [LogLevel; 6] = [
        LogLevel::Trace,
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
        LogLevel::Fatal,
    ];

    /// Upper-case label used by every layout
    pub const fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Fatal => "FATAL",
        }
    }

    /// RFC 5424 severity code (0 = emergency, 7 = debug). Trace has no
    /// syslog counterpart and shares debug's code.
    pub const fn syslog_severity(self) -> u8 {
        match self {
            LogLevel::Trace | LogLevel::Debug => 7,
            LogLevel::Info => 6,
            LogLevel::Warn => 4,
            LogLevel::Error => 3,
            LogLevel::Fatal => 2,
        }
    }

    #[cfg(feature = "console")]
    pub(crate) fn color(self) -> colored::Color {
        match self {
            LogLevel::Trace => colored::Color::BrightBlack,
            LogLevel::Debug => colored::Color::Cyan,
            LogLevel::Info => colored::Color::Green,
            LogLevel::Warn => colored::Color::Yellow,
            LogLevel::Error | LogLevel::Fatal => colored::Color::Red,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = LoggerError;

    /// Case-insensitive; surrounding whitespace and `warning` are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim();
        if label.eq_ignore_ascii_case("warning") {
            return Ok(LogLevel::Warn);
        }

        Self::LEVELS
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(label))
            .ok_or_else(|| LoggerError::config("LogLevel", format!("unknown level '{}'", s)))
    }
}
