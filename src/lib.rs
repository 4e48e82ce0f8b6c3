//! # Appender Registry
//!
//! A thread-safe registry of named log output destinations ("appenders")
//! with the appenders to go in it.
//!
//! ## Features
//!
//! - **Named lookup**: register, fetch, replace and remove appenders by name
//! - **Lifecycle**: `reset` closes every registered appender and empties the registry
//! - **Lazy syslog**: the platform syslog check runs only when a syslog appender is requested
//! - **Bundled outputs**: console, file, rolling file, in-memory buffer and syslog
//!
//! ## Example
//!
//! ```
//! use appender_registry::prelude::*;
//!
//! let registry = AppenderRegistry::new();
//! let memory = StringIoAppender::new("memory");
//! let buffer = memory.buffer();
//! registry.set("memory", SharedAppender::new(memory));
//!
//! registry.each(|appender| {
//!     appender.append(&LogEntry::new(LogLevel::Info, "app", "hello")).unwrap();
//! });
//! assert!(buffer.contents().ends_with("app : hello\n"));
//!
//! registry.reset().unwrap();
//! assert!(registry.get("memory").is_none());
//! ```

pub mod appenders;
pub mod core;

pub mod prelude {
    pub use crate::appenders::{
        ConsoleAppender, ConsoleTarget, FileAppender, RollPolicy, RollStrategy,
        RollingFileAppender, StringBuffer, StringIoAppender, SyslogAppender, SyslogFacility,
        SyslogOptions,
    };
    pub use crate::core::{
        Appender, AppenderConfig, AppenderRegistry, Layout, LogEntry, LogLevel, LoggerError,
        Result, SharedAppender, SyslogSupport,
    };
}

pub use appenders::{ConsoleAppender, FileAppender, StringIoAppender, SyslogOptions};
pub use core::{
    Appender, AppenderConfig, AppenderRegistry, CloseFailure, Layout, LogEntry, LogLevel,
    LoggerError, Result, SharedAppender, SyslogSupport,
};
