//! Core registry types and traits

pub mod appender;
pub mod error;
pub mod factory;
pub mod layout;
pub mod log_entry;
pub mod log_level;
pub mod registry;

pub use appender::{Appender, SharedAppender};
pub use error::{CloseFailure, LoggerError, Result};
pub use factory::{build_appender, detect_syslog, AppenderConfig, SyslogFactory, SyslogSupport};
pub use layout::Layout;
pub use log_entry::LogEntry;
pub use log_level::LogLevel;
pub use registry::AppenderRegistry;
