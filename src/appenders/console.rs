//! Console appender implementation

use crate::core::{Appender, Layout, LogEntry, LoggerError, Result};
#[cfg(feature = "console")]
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::io::Write;

/// Which process stream a [`ConsoleAppender`] writes to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsoleTarget {
    #[default]
    Stdout,
    Stderr,
}

pub struct ConsoleAppender {
    name: String,
    target: ConsoleTarget,
    #[cfg_attr(not(feature = "console"), allow(dead_code))]
    use_colors: bool,
    layout: Layout,
    closed: bool,
}

impl ConsoleAppender {
    pub fn new(name: impl Into<String>, target: ConsoleTarget) -> Self {
        Self {
            name: name.into(),
            target,
            use_colors: false,
            layout: Layout::default(),
            closed: false,
        }
    }

    /// Appender named `stdout` writing to standard output
    pub fn stdout() -> Self {
        Self::new("stdout", ConsoleTarget::Stdout)
    }

    /// Appender named `stderr` writing to standard error
    pub fn stderr() -> Self {
        Self::new("stderr", ConsoleTarget::Stderr)
    }

    /// Colorize the level of basic-layout lines.
    ///
    /// Ignored when the crate is built without the `console` feature.
    #[must_use]
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    /// # Example
    ///
    /// ```
    /// use appender_registry::appenders::ConsoleAppender;
    /// use appender_registry::core::Layout;
    ///
    /// let appender = ConsoleAppender::stderr().with_layout(Layout::Json);
    /// ```
    #[must_use]
    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    pub fn target(&self) -> ConsoleTarget {
        self.target
    }

    fn render(&self, entry: &LogEntry) -> String {
        #[cfg(feature = "console")]
        if self.use_colors && self.layout == Layout::Basic {
            let level = format!("{:<5}", entry.level)
                .color(entry.level.color())
                .to_string();
            return format!(
                "[{}] {}  {} : {}",
                entry
                    .timestamp
                    .to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
                level,
                entry.logger,
                entry.message
            );
        }

        self.layout.format(entry)
    }

    fn write_line(&self, line: &str) -> std::io::Result<()> {
        match self.target {
            ConsoleTarget::Stdout => writeln!(std::io::stdout().lock(), "{}", line),
            ConsoleTarget::Stderr => writeln!(std::io::stderr().lock(), "{}", line),
        }
    }
}

impl Default for ConsoleAppender {
    fn default() -> Self {
        Self::stdout()
    }
}

impl Appender for ConsoleAppender {
    fn append(&mut self, entry: &LogEntry) -> Result<()> {
        if self.closed {
            return Err(LoggerError::closed(&self.name));
        }

        let line = self.render(entry);
        self.write_line(&line)
            .map_err(|e| LoggerError::io_operation("writing to console", self.name.clone(), e))
    }

    fn flush(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        match self.target {
            ConsoleTarget::Stdout => std::io::stdout().flush()?,
            ConsoleTarget::Stderr => std::io::stderr().flush()?,
        }
        Ok(())
    }

    // The process stream itself is never closed.
    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.flush()?;
        self.closed = true;
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LogLevel;

    #[test]
    fn test_named_constructors() {
        let out = ConsoleAppender::stdout();
        assert_eq!(out.name(), "stdout");
        assert_eq!(out.target(), ConsoleTarget::Stdout);

        let err = ConsoleAppender::stderr();
        assert_eq!(err.name(), "stderr");
        assert_eq!(err.target(), ConsoleTarget::Stderr);
    }

    #[test]
    fn test_plain_render_matches_layout() {
        let appender = ConsoleAppender::stdout();
        let entry = LogEntry::new(LogLevel::Info, "app", "hello");
        assert_eq!(appender.render(&entry), Layout::Basic.format(&entry));
    }

    #[test]
    fn test_close_is_idempotent_and_blocks_writes() {
        let mut appender = ConsoleAppender::stderr();
        appender
            .append(&LogEntry::new(LogLevel::Warn, "app", "before close"))
            .unwrap();

        appender.close().unwrap();
        appender.close().unwrap();
        appender.flush().unwrap();

        assert!(appender.is_closed());
        assert!(matches!(
            appender.append(&LogEntry::new(LogLevel::Warn, "app", "after close")),
            Err(LoggerError::AppenderClosed { .. })
        ));
    }
}
