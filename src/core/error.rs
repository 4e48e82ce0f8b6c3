//! Error types for the appender registry

use std::fmt;

pub type Result<T> = std::result::Result<T, LoggerError>;

/// A single `close()` failure collected by [`AppenderRegistry::reset_collecting`].
///
/// [`AppenderRegistry::reset_collecting`]: crate::core::AppenderRegistry::reset_collecting
#[derive(Debug)]
pub struct CloseFailure {
    /// Registry key the appender was stored under
    pub name: String,
    pub error: LoggerError,
}

impl fmt::Display for CloseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}': {}", self.name, self.error)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// A factory was invoked without a required argument
    #[error("{component} needs a {argument} as first argument")]
    MissingArgument {
        component: &'static str,
        argument: &'static str,
    },

    /// Capability not available on this platform
    #[error("{feature} is not supported: {reason}")]
    Unsupported {
        feature: &'static str,
        reason: String,
    },

    /// Write attempted after close()
    #[error("Appender '{name}' is closed")]
    AppenderClosed { name: String },

    /// One or more appenders failed to close during a collecting reset
    #[error("Reset failed to close {} appender(s): {}", failures.len(), join_failures(failures))]
    ResetFailed { failures: Vec<CloseFailure> },

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// File appender error with path
    #[error("File appender error for '{path}': {message}")]
    FileAppenderError { path: String, message: String },

    /// File rotation error
    #[error("File rotation failed for '{path}': {message}")]
    FileRotationError { path: String, message: String },

    /// Writer error (generic)
    #[error("Writer error: {0}")]
    WriterError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

fn join_failures(failures: &[CloseFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl LoggerError {
    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    /// Create a missing argument error
    pub fn missing_argument(component: &'static str, argument: &'static str) -> Self {
        LoggerError::MissingArgument {
            component,
            argument,
        }
    }

    /// Create an unsupported capability error
    pub fn unsupported(feature: &'static str, reason: impl Into<String>) -> Self {
        LoggerError::Unsupported {
            feature,
            reason: reason.into(),
        }
    }

    /// Create a closed appender error
    pub fn closed(name: impl Into<String>) -> Self {
        LoggerError::AppenderClosed { name: name.into() }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a file appender error
    pub fn file_appender(path: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FileAppenderError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a file rotation error
    pub fn file_rotation(path: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FileRotationError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a writer error (generic)
    pub fn writer<S: Into<String>>(msg: S) -> Self {
        LoggerError::WriterError(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        LoggerError::Other(msg.into())
    }

    /// Whether this is an argument validation failure
    pub fn is_missing_argument(&self) -> bool {
        matches!(self, LoggerError::MissingArgument { .. })
    }
}
