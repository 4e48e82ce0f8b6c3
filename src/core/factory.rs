//! Appender construction
//!
//! [`SyslogFactory`] defers the platform syslog capability check until the
//! first syslog appender is requested and memoizes the answer.
//! [`AppenderConfig`] describes any bundled appender in a serde-friendly way
//! and [`build_appender`] turns it into a [`SharedAppender`].

use super::{
    appender::SharedAppender,
    error::{LoggerError, Result},
    layout::Layout,
};
use crate::appenders::{
    ConsoleAppender, ConsoleTarget, FileAppender, RollPolicy, RollStrategy, RollingFileAppender,
    StringIoAppender, SyslogAppender, SyslogFacility, SyslogOptions,
};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Outcome of the syslog capability check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyslogSupport {
    Available,
    Unavailable(String),
}

/// Platform detector used by [`SyslogFactory::default`]
pub fn detect_syslog() -> SyslogSupport {
    if cfg!(all(unix, feature = "syslog")) {
        SyslogSupport::Available
    } else if cfg!(unix) {
        SyslogSupport::Unavailable("crate built without the `syslog` feature".to_string())
    } else {
        SyslogSupport::Unavailable("no native syslog facility on this platform".to_string())
    }
}

pub struct SyslogFactory {
    detect: fn() -> SyslogSupport,
    resolved: OnceCell<SyslogSupport>,
}

impl SyslogFactory {
    pub fn new(detect: fn() -> SyslogSupport) -> Self {
        Self {
            detect,
            resolved: OnceCell::new(),
        }
    }

    /// Build a syslog appender.
    ///
    /// The name is validated before the capability check runs, so a call
    /// without one never pays for resolution.
    ///
    /// # Errors
    ///
    /// `MissingArgument` without a name, `Unsupported` when the detector
    /// reported syslog as unavailable.
    pub fn create(&self, options: SyslogOptions) -> Result<SyslogAppender> {
        if options.name.as_deref().map_or(true, str::is_empty) {
            return Err(LoggerError::missing_argument("SyslogAppender", "name"));
        }

        match self.support() {
            SyslogSupport::Available => SyslogAppender::new(options),
            SyslogSupport::Unavailable(reason) => {
                Err(LoggerError::unsupported("syslog", reason.clone()))
            }
        }
    }

    /// Resolve the capability, running the detector on first use only
    pub fn support(&self) -> &SyslogSupport {
        self.resolved.get_or_init(|| {
            let support = (self.detect)();
            log::debug!("syslog capability resolved: {:?}", support);
            support
        })
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved.get().is_some()
    }
}

impl Default for SyslogFactory {
    fn default() -> Self {
        Self::new(detect_syslog)
    }
}

impl fmt::Debug for SyslogFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyslogFactory")
            .field("resolved", &self.resolved.get())
            .finish()
    }
}

/// Declarative description of a bundled appender.
///
/// # Example
///
/// ```
/// use appender_registry::core::AppenderConfig;
///
/// let config = AppenderConfig::from_json(
///     r#"{"kind": "rolling_file", "path": "/tmp/app.log", "max_bytes": 1048576, "keep": 3}"#,
/// ).unwrap();
/// assert!(matches!(config, AppenderConfig::RollingFile { keep: 3, .. }));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AppenderConfig {
    Console {
        #[serde(default)]
        target: ConsoleTarget,
        #[serde(default)]
        colors: bool,
        #[serde(default)]
        layout: Layout,
    },
    File {
        path: PathBuf,
        #[serde(default)]
        truncate: bool,
        #[serde(default)]
        auto_flush: bool,
        #[serde(default)]
        layout: Layout,
    },
    RollingFile {
        path: PathBuf,
        /// Roll once the file reaches this size
        #[serde(default)]
        max_bytes: Option<u64>,
        /// Roll once the file is this many seconds old
        #[serde(default)]
        max_age_secs: Option<u64>,
        #[serde(default)]
        daily: bool,
        #[serde(default = "default_keep")]
        keep: usize,
        #[serde(default)]
        compress: bool,
        #[serde(default)]
        layout: Layout,
    },
    StringIo {
        #[serde(default)]
        layout: Layout,
    },
    Syslog {
        #[serde(default)]
        ident: Option<String>,
        #[serde(default)]
        facility: SyslogFacility,
        #[serde(default)]
        log_pid: bool,
    },
}

fn default_keep() -> usize {
    RollPolicy::default().keep
}

impl AppenderConfig {
    /// Parse a config from its JSON form.
    ///
    /// # Errors
    ///
    /// `JsonError` for malformed JSON, an unknown `kind` or missing fields.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    fn roll_policy(&self) -> Result<RollPolicy> {
        let AppenderConfig::RollingFile {
            max_bytes,
            max_age_secs,
            daily,
            keep,
            compress,
            ..
        } = self
        else {
            return Err(LoggerError::config("RollingFileAppender", "not a rolling file config"));
        };

        let strategy = match (max_bytes, max_age_secs, daily) {
            (Some(bytes), None, false) => RollStrategy::size(*bytes),
            (None, Some(secs), false) => RollStrategy::age(Duration::from_secs(*secs)),
            (None, None, true) => RollStrategy::Daily,
            (None, None, false) => RollStrategy::Never,
            _ => {
                return Err(LoggerError::config(
                    "RollingFileAppender",
                    "choose only one of max_bytes, max_age_secs or daily",
                ))
            }
        };

        Ok(RollPolicy::new()
            .with_strategy(strategy)
            .with_keep(*keep)
            .with_compression(*compress))
    }
}

/// Construct the appender described by `config` under `name`.
///
/// The result is not registered anywhere.
///
/// # Errors
///
/// `MissingArgument` for an empty name, plus whatever the variant's
/// constructor reports (I/O, unsupported syslog, invalid rolling policy).
pub fn build_appender(
    name: &str,
    config: &AppenderConfig,
    syslog: &SyslogFactory,
) -> Result<SharedAppender> {
    if name.is_empty() {
        return Err(LoggerError::missing_argument("Appender", "name"));
    }

    let appender = match config {
        AppenderConfig::Console {
            target,
            colors,
            layout,
        } => SharedAppender::new(
            ConsoleAppender::new(name, *target)
                .with_colors(*colors)
                .with_layout(*layout),
        ),
        AppenderConfig::File {
            path,
            truncate,
            auto_flush,
            layout,
        } => {
            let file = if *truncate {
                FileAppender::truncating(name, path)?
            } else {
                FileAppender::new(name, path)?
            };
            SharedAppender::new(file.with_auto_flush(*auto_flush).with_layout(*layout))
        }
        AppenderConfig::RollingFile { path, layout, .. } => SharedAppender::new(
            RollingFileAppender::new(name, path, config.roll_policy()?)?.with_layout(*layout),
        ),
        AppenderConfig::StringIo { layout } => {
            SharedAppender::new(StringIoAppender::new(name).with_layout(*layout))
        }
        AppenderConfig::Syslog {
            ident,
            facility,
            log_pid,
        } => {
            let mut options = SyslogOptions::named(name)
                .with_facility(*facility)
                .with_log_pid(*log_pid);
            if let Some(ident) = ident {
                options = options.with_ident(ident.clone());
            }
            SharedAppender::new(syslog.create(options)?)
        }
    };

    log::debug!("built appender '{}' from config", name);
    Ok(appender)
}
