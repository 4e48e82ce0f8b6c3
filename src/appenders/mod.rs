//! Appender implementations

pub mod console;
pub mod file;
pub mod rolling_file;
pub mod string_io;
pub mod syslog;

pub use console::{ConsoleAppender, ConsoleTarget};
pub use file::FileAppender;
pub use rolling_file::{RollPolicy, RollStrategy, RollingFileAppender};
pub use string_io::{StringBuffer, StringIoAppender};
pub use syslog::{SyslogAppender, SyslogFacility, SyslogOptions};

pub use crate::core::Appender;
