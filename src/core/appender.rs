//! Appender trait for log output destinations

use super::{error::Result, log_entry::LogEntry};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

/// A named sink for log entries.
///
/// Implementations must reject `append` once closed, and `close` must be
/// safe to call more than once: the second call does nothing and returns
/// `Ok(())`. Closing releases the underlying resource before returning.
pub trait Appender: Send {
    fn append(&mut self, entry: &LogEntry) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
    fn close(&mut self) -> Result<()>;
    fn is_closed(&self) -> bool;
    fn name(&self) -> &str;
}

/// Shared, lockable handle to an appender.
///
/// Cloning the handle shares the same appender instance; this is what the
/// registry stores and hands back from lookups.
///
/// # Example
///
/// ```
/// use appender_registry::appenders::StringIoAppender;
/// use appender_registry::core::SharedAppender;
///
/// let appender = SharedAppender::new(StringIoAppender::new("buffer"));
/// let alias = appender.clone();
/// assert!(alias.ptr_eq(&appender));
/// assert_eq!(alias.name(), "buffer");
/// ```
#[derive(Clone)]
pub struct SharedAppender {
    inner: Arc<Mutex<Box<dyn Appender>>>,
}

impl SharedAppender {
    pub fn new<A: Appender + 'static>(appender: A) -> Self {
        Self::from_boxed(Box::new(appender))
    }

    pub fn from_boxed(appender: Box<dyn Appender>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(appender)),
        }
    }

    pub fn name(&self) -> String {
        self.inner.lock().name().to_string()
    }

    pub fn append(&self, entry: &LogEntry) -> Result<()> {
        self.inner.lock().append(entry)
    }

    pub fn flush(&self) -> Result<()> {
        self.inner.lock().flush()
    }

    pub fn close(&self) -> Result<()> {
        self.inner.lock().close()
    }

    pub fn is_closed(&self) -> bool {
        self.inner.lock().is_closed()
    }

    /// Run `f` with exclusive access to the underlying appender
    pub fn with<R>(&self, f: impl FnOnce(&mut dyn Appender) -> R) -> R {
        let mut guard = self.inner.lock();
        f(&mut **guard)
    }

    /// Whether both handles point at the same appender instance
    pub fn ptr_eq(&self, other: &SharedAppender) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Number of live handles to this appender
    pub fn handle_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }
}

impl PartialEq for SharedAppender {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for SharedAppender {}

impl fmt::Debug for SharedAppender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.try_lock() {
            Some(guard) => f
                .debug_struct("SharedAppender")
                .field("name", &guard.name())
                .field("closed", &guard.is_closed())
                .finish(),
            None => f.write_str("SharedAppender { <locked> }"),
        }
    }
}

impl<A: Appender + 'static> From<A> for SharedAppender {
    fn from(appender: A) -> Self {
        Self::new(appender)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::appenders::StringIoAppender;
    use crate::core::{LogLevel, LoggerError};

    #[test]
    fn test_clone_preserves_identity() {
        let a = SharedAppender::new(StringIoAppender::new("a"));
        let b = SharedAppender::new(StringIoAppender::new("a"));

        assert!(a.ptr_eq(&a.clone()));
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
        assert_eq!(a.handle_count(), 1);
    }

    #[test]
    fn test_close_through_handle_is_shared() {
        let a = SharedAppender::new(StringIoAppender::new("a"));
        let alias = a.clone();

        alias.close().unwrap();
        assert!(a.is_closed());

        let err = a
            .append(&LogEntry::new(LogLevel::Info, "app", "late"))
            .unwrap_err();
        assert!(matches!(err, LoggerError::AppenderClosed { .. }));
    }

    #[test]
    fn test_with_exposes_trait_object() {
        let a: SharedAppender = StringIoAppender::new("mem").into();
        let name = a.with(|appender| {
            appender.close().unwrap();
            appender.name().to_uppercase()
        });

        assert_eq!(name, "MEM");
        assert!(a.is_closed());
    }

    #[test]
    fn test_debug_output() {
        let a = SharedAppender::new(StringIoAppender::new("mem"));
        let rendered = format!("{:?}", a);
        assert!(rendered.contains("mem"));
        assert!(rendered.contains("closed: false"));
    }
}
