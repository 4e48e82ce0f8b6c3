//! In-memory appender
//!
//! Collects formatted lines in a [`StringBuffer`] that can be read back by
//! any holder of the buffer handle. Mostly useful in tests.

use crate::core::{Appender, Layout, LogEntry, LoggerError, Result};
use parking_lot::Mutex;
use std::sync::Arc;

/// Cloneable handle to the text an [`StringIoAppender`] has written
#[derive(Debug, Clone, Default)]
pub struct StringBuffer {
    inner: Arc<Mutex<String>>,
}

impl StringBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written and not yet consumed
    pub fn contents(&self) -> String {
        self.inner.lock().clone()
    }

    pub fn lines(&self) -> Vec<String> {
        self.inner.lock().lines().map(str::to_string).collect()
    }

    /// Remove and return the oldest line, without its newline
    pub fn readline(&self) -> Option<String> {
        let mut buffer = self.inner.lock();
        if buffer.is_empty() {
            return None;
        }

        let end = buffer.find('\n').map_or(buffer.len(), |idx| idx + 1);
        let mut line: String = buffer.drain(..end).collect();
        if line.ends_with('\n') {
            line.pop();
        }
        Some(line)
    }

    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    fn push_line(&self, line: &str) {
        let mut buffer = self.inner.lock();
        buffer.push_str(line);
        buffer.push('\n');
    }
}

pub struct StringIoAppender {
    name: String,
    buffer: StringBuffer,
    layout: Layout,
    closed: bool,
}

impl StringIoAppender {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            buffer: StringBuffer::new(),
            layout: Layout::default(),
            closed: false,
        }
    }

    /// Write into an existing buffer instead of a fresh one
    #[must_use]
    pub fn with_buffer(mut self, buffer: StringBuffer) -> Self {
        self.buffer = buffer;
        self
    }

    #[must_use]
    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    pub fn buffer(&self) -> StringBuffer {
        self.buffer.clone()
    }
}

impl Appender for StringIoAppender {
    fn append(&mut self, entry: &LogEntry) -> Result<()> {
        if self.closed {
            return Err(LoggerError::closed(&self.name));
        }
        self.buffer.push_line(&self.layout.format(entry));
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    // The buffer is kept so its contents stay readable after close.
    fn close(&mut self) -> Result<()> {
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

    fn entry(message: &str) -> LogEntry {
        LogEntry::new(LogLevel::Info, "test", message)
    }

    #[test]
    fn test_append_and_read_back() {
        let mut appender = StringIoAppender::new("mem");
        let buffer = appender.buffer();

        appender.append(&entry("first")).unwrap();
        appender.append(&entry("second")).unwrap();

        let lines = buffer.lines();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("test : first"));
        assert!(lines[1].ends_with("test : second"));
    }

    #[test]
    fn test_readline_consumes_oldest() {
        let mut appender = StringIoAppender::new("mem");
        let buffer = appender.buffer();
        appender.append(&entry("one")).unwrap();
        appender.append(&entry("two")).unwrap();

        assert!(buffer.readline().unwrap().ends_with("one"));
        assert!(buffer.readline().unwrap().ends_with("two"));
        assert!(buffer.readline().is_none());
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_closed_rejects_writes_and_keeps_buffer() {
        let mut appender = StringIoAppender::new("mem");
        let buffer = appender.buffer();
        appender.append(&entry("kept")).unwrap();

        appender.close().unwrap();
        appender.close().unwrap();

        assert!(appender.is_closed());
        assert!(matches!(
            appender.append(&entry("dropped")),
            Err(LoggerError::AppenderClosed { .. })
        ));
        assert_eq!(buffer.lines().len(), 1);
    }

    #[test]
    fn test_shared_buffer_and_clear() {
        let shared = StringBuffer::new();
        let mut a = StringIoAppender::new("a").with_buffer(shared.clone());
        let mut b = StringIoAppender::new("b").with_buffer(shared.clone());

        a.append(&entry("from a")).unwrap();
        b.append(&entry("from b")).unwrap();
        assert_eq!(shared.lines().len(), 2);

        shared.clear();
        assert!(shared.contents().is_empty());
    }
}
