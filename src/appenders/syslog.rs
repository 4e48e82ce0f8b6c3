//! Syslog appender (unix only)
//!
//! Entries are handed to the C library's `syslog(3)`. libc keeps a single
//! process-wide connection, so the crate tracks which appender last called
//! `openlog`: an appender reopens only when another ident took over, and
//! `close` calls `closelog` only while it still owns the connection.
//!
//! Construct it through [`AppenderRegistry::syslog_appender`] to get the
//! name validation and the memoized platform check.
//!
//! [`AppenderRegistry::syslog_appender`]: crate::core::AppenderRegistry::syslog_appender

use crate::core::{Appender, LogEntry, LoggerError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyslogFacility {
    #[default]
    User,
    Daemon,
    Auth,
    Local0,
    Local1,
    Local2,
    Local3,
    Local4,
    Local5,
    Local6,
    Local7,
}

impl SyslogFacility {
    /// Facility code as defined by RFC 5424 (already shifted left by 3)
    pub fn code(&self) -> i32 {
        let number = match self {
            SyslogFacility::User => 1,
            SyslogFacility::Daemon => 3,
            SyslogFacility::Auth => 4,
            SyslogFacility::Local0 => 16,
            SyslogFacility::Local1 => 17,
            SyslogFacility::Local2 => 18,
            SyslogFacility::Local3 => 19,
            SyslogFacility::Local4 => 20,
            SyslogFacility::Local5 => 21,
            SyslogFacility::Local6 => 22,
            SyslogFacility::Local7 => 23,
        };
        number << 3
    }
}

/// Construction arguments for [`SyslogAppender`]
///
/// `name` is required; [`SyslogOptions::default`] deliberately has none.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyslogOptions {
    pub name: Option<String>,
    /// Program identifier prepended by syslog; defaults to `name`
    pub ident: Option<String>,
    pub facility: SyslogFacility,
    pub log_pid: bool,
}

impl SyslogOptions {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_ident(mut self, ident: impl Into<String>) -> Self {
        self.ident = Some(ident.into());
        self
    }

    #[must_use]
    pub fn with_facility(mut self, facility: SyslogFacility) -> Self {
        self.facility = facility;
        self
    }

    #[must_use]
    pub fn with_log_pid(mut self, log_pid: bool) -> Self {
        self.log_pid = log_pid;
        self
    }
}

#[derive(Debug)]
pub struct SyslogAppender {
    name: String,
    facility: SyslogFacility,
    closed: bool,
    #[cfg(all(unix, feature = "syslog"))]
    backend: native::Connection,
}

impl SyslogAppender {
    /// # Errors
    ///
    /// `MissingArgument` without a name, `InvalidConfiguration` when the
    /// ident contains a NUL byte, `Unsupported` off unix or without the
    /// `syslog` feature.
    pub fn new(options: SyslogOptions) -> Result<Self> {
        let name = options
            .name
            .filter(|n| !n.is_empty())
            .ok_or_else(|| LoggerError::missing_argument("SyslogAppender", "name"))?;

        #[cfg(all(unix, feature = "syslog"))]
        {
            let ident = options.ident.unwrap_or_else(|| name.clone());
            let backend = native::Connection::new(&ident, options.facility, options.log_pid)?;
            Ok(Self {
                name,
                facility: options.facility,
                closed: false,
                backend,
            })
        }

        #[cfg(not(all(unix, feature = "syslog")))]
        {
            let _ = (name, options.ident, options.log_pid);
            Err(LoggerError::unsupported(
                "syslog",
                "no native syslog facility on this platform",
            ))
        }
    }

    pub fn facility(&self) -> SyslogFacility {
        self.facility
    }
}

impl Appender for SyslogAppender {
    fn append(&mut self, entry: &LogEntry) -> Result<()> {
        if self.closed {
            return Err(LoggerError::closed(&self.name));
        }

        #[cfg(all(unix, feature = "syslog"))]
        self.backend.send(
            entry.level.syslog_severity(),
            &format!("{} : {}", entry.logger, entry.message),
        )?;

        #[cfg(not(all(unix, feature = "syslog")))]
        let _ = entry;

        Ok(())
    }

    // syslog(3) writes straight through
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        #[cfg(all(unix, feature = "syslog"))]
        self.backend.close();

        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for SyslogAppender {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

#[cfg(all(unix, feature = "syslog"))]
mod native {
    use super::SyslogFacility;
    use crate::core::{LoggerError, Result};
    use once_cell::sync::Lazy;
    use parking_lot::Mutex;
    use std::ffi::CString;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    static NEXT_ID: AtomicU64 = AtomicU64::new(1);

    /// Connection that last called `openlog`, with the ident libc points at
    static OPENED: Lazy<Mutex<Option<Opened>>> = Lazy::new(|| Mutex::new(None));

    struct Opened {
        owner: u64,
        // libc keeps this pointer until the next openlog/closelog
        _ident: Arc<CString>,
    }

    #[derive(Debug)]
    pub(super) struct Connection {
        id: u64,
        ident: Arc<CString>,
        options: libc::c_int,
        facility: libc::c_int,
    }

    impl Connection {
        pub(super) fn new(ident: &str, facility: SyslogFacility, log_pid: bool) -> Result<Self> {
            let ident = CString::new(ident)
                .map_err(|_| LoggerError::config("SyslogAppender", "ident contains a NUL byte"))?;
            let options = if log_pid { libc::LOG_PID } else { 0 };
            Ok(Self {
                id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
                ident: Arc::new(ident),
                options,
                facility: facility.code(),
            })
        }

        pub(super) fn send(&self, severity: u8, message: &str) -> Result<()> {
            let message = CString::new(message.replace('\0', "\\0"))
                .map_err(|e| LoggerError::writer(e.to_string()))?;

            let mut opened = OPENED.lock();
            if opened.as_ref().map(|o| o.owner) != Some(self.id) {
                // SAFETY: the ident is kept alive in OPENED until libc is
                // pointed elsewhere, and both calls happen under the lock.
                unsafe { libc::openlog(self.ident.as_ptr(), self.options, self.facility) };
                *opened = Some(Opened {
                    owner: self.id,
                    _ident: Arc::clone(&self.ident),
                });
                log::trace!("syslog connection opened for {:?}", self.ident);
            }

            // SAFETY: both pointers come from live CStrings; the format
            // string consumes exactly one `char *` argument.
            unsafe {
                libc::syslog(
                    libc::c_int::from(severity) | self.facility,
                    c"%s".as_ptr(),
                    message.as_ptr(),
                );
            }
            Ok(())
        }

        /// Whether this connection's ident is the one libc is using
        #[cfg(test)]
        pub(super) fn is_current(&self) -> bool {
            OPENED.lock().as_ref().is_some_and(|o| o.owner == self.id)
        }

        pub(super) fn close(&self) {
            let mut opened = OPENED.lock();
            if opened.as_ref().is_some_and(|o| o.owner == self.id) {
                // SAFETY: closelog takes no arguments; libc drops the ident
                // pointer before OPENED releases it.
                unsafe { libc::closelog() };
                *opened = None;
            }
        }
    }
}
