//! Named appender registry
//!
//! Maps names to [`SharedAppender`] handles and is the single place where
//! registered appenders get released in bulk. Registration order is kept, so
//! iteration and [`AppenderRegistry::reset`] visit appenders in the order
//! they were first stored.
//!
//! `set` and `remove` never close anything: an appender displaced or
//! removed that way stays open and the caller is responsible for closing it.
//! Use [`AppenderRegistry::replace_and_close`] or
//! [`AppenderRegistry::remove_and_close`] for the closing variants.

use super::{
    appender::SharedAppender,
    error::{CloseFailure, LoggerError, Result},
    factory::{build_appender, AppenderConfig, SyslogFactory, SyslogSupport},
};
use crate::appenders::SyslogOptions;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use parking_lot::{RwLock, RwLockUpgradableReadGuard};

static GLOBAL: Lazy<AppenderRegistry> = Lazy::new(AppenderRegistry::new);

/// Thread-safe registry of named appenders.
///
/// # Example
///
/// ```
/// use appender_registry::appenders::StringIoAppender;
/// use appender_registry::core::{AppenderRegistry, SharedAppender};
///
/// let registry = AppenderRegistry::new();
/// let buffer = SharedAppender::new(StringIoAppender::new("buffer"));
///
/// registry.set("buffer", buffer.clone());
/// assert!(registry.get("buffer").unwrap().ptr_eq(&buffer));
///
/// registry.reset().unwrap();
/// assert!(buffer.is_closed());
/// assert!(registry.is_empty());
/// ```
#[derive(Debug, Default)]
pub struct AppenderRegistry {
    appenders: RwLock<IndexMap<String, SharedAppender>>,
    syslog: SyslogFactory,
}

impl AppenderRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry whose syslog capability comes from `detect`
    #[must_use]
    pub fn with_syslog_detector(detect: fn() -> SyslogSupport) -> Self {
        Self {
            appenders: RwLock::new(IndexMap::new()),
            syslog: SyslogFactory::new(detect),
        }
    }

    /// Process-wide registry, created empty on first use
    pub fn global() -> &'static AppenderRegistry {
        &GLOBAL
    }

    /// Look up the appender stored under `name`
    pub fn get(&self, name: &str) -> Option<SharedAppender> {
        self.appenders.read().get(name).cloned()
    }

    /// Store `appender` under `name`, overwriting any previous mapping.
    ///
    /// The displaced appender, if any, is left open.
    pub fn set(&self, name: impl Into<String>, appender: SharedAppender) {
        self.replace(name, appender);
    }

    /// Like [`set`](Self::set), returning the displaced appender (still open)
    pub fn replace(
        &self,
        name: impl Into<String>,
        appender: SharedAppender,
    ) -> Option<SharedAppender> {
        let name = name.into();
        let displaced = self.appenders.write().insert(name.clone(), appender.clone());

        if left_open(displaced.as_ref(), &appender) {
            log::warn!("appender '{}' replaced while still open", name);
        } else {
            log::debug!("registered appender '{}'", name);
        }
        displaced
    }

    /// Store `appender` under `name` and close whatever it displaced.
    ///
    /// Re-storing the instance already registered under `name` closes nothing.
    ///
    /// # Errors
    ///
    /// Propagates the displaced appender's `close()` failure; the new mapping
    /// is in place either way.
    pub fn replace_and_close(
        &self,
        name: impl Into<String>,
        appender: SharedAppender,
    ) -> Result<Option<SharedAppender>> {
        let name = name.into();
        let displaced = self.appenders.write().insert(name.clone(), appender.clone());

        match displaced {
            Some(old) if !old.ptr_eq(&appender) => {
                log::debug!("closing appender displaced from '{}'", name);
                old.close()?;
                Ok(Some(old))
            }
            other => Ok(other),
        }
    }

    /// Delete the mapping for `name`, reporting whether one existed.
    ///
    /// The removed appender is not closed.
    pub fn remove(&self, name: &str) -> bool {
        self.take(name).is_some()
    }

    /// Remove and return the appender stored under `name`, without closing it
    pub fn take(&self, name: &str) -> Option<SharedAppender> {
        let removed = self.appenders.write().shift_remove(name);
        if removed.is_some() {
            log::debug!("removed appender '{}'", name);
        }
        removed
    }

    /// Remove the appender stored under `name` and close it.
    ///
    /// # Errors
    ///
    /// Propagates the `close()` failure; the mapping is already gone.
    pub fn remove_and_close(&self, name: &str) -> Result<bool> {
        match self.take(name) {
            Some(appender) => {
                appender.close()?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Visit every registered appender in registration order.
    ///
    /// Works on a snapshot taken when the call starts, so `visit` may use the
    /// registry without deadlocking; such changes do not affect this sweep.
    pub fn each<F>(&self, mut visit: F)
    where
        F: FnMut(&SharedAppender),
    {
        let snapshot = self.appenders();
        log::trace!("visiting {} appender(s)", snapshot.len());
        for appender in &snapshot {
            visit(appender);
        }
    }

    /// Close every appender, then clear the registry.
    ///
    /// Fails fast: the first `close()` error aborts the sweep and is returned
    /// with every mapping still in place. Appenders closed before the failure
    /// stay closed.
    ///
    /// The sweep runs under an upgradable read lock: lookups keep working
    /// (and see the full registry) while appenders close, but `set`, `remove`
    /// and other writers wait until the reset is done. Code holding an
    /// appender's lock, such as [`SharedAppender::with`] or an appender's own
    /// `append`, may read from the registry but must not write to it.
    ///
    /// # Errors
    ///
    /// The first `close()` failure, unmodified.
    pub fn reset(&self) -> Result<()> {
        let appenders = self.appenders.upgradable_read();
        for (name, appender) in appenders.iter() {
            appender.close().inspect_err(|e| {
                log::debug!("reset aborted while closing '{}': {}", name, e);
            })?;
        }

        let mut appenders = RwLockUpgradableReadGuard::upgrade(appenders);
        log::debug!("reset closed {} appender(s)", appenders.len());
        appenders.clear();
        Ok(())
    }

    /// Close every appender and clear the registry, even if some fail.
    ///
    /// Unlike [`reset`](Self::reset) this never stops early: all appenders get
    /// a `close()` call and the registry always ends up empty.
    ///
    /// # Errors
    ///
    /// `ResetFailed` listing every appender whose `close()` failed.
    pub fn reset_collecting(&self) -> Result<()> {
        let drained: Vec<(String, SharedAppender)> = self.appenders.write().drain(..).collect();

        let failures: Vec<CloseFailure> = drained
            .into_iter()
            .filter_map(|(name, appender)| {
                appender
                    .close()
                    .err()
                    .map(|error| CloseFailure { name, error })
            })
            .collect();

        if failures.is_empty() {
            Ok(())
        } else {
            log::warn!("reset failed to close {} appender(s)", failures.len());
            Err(LoggerError::ResetFailed { failures })
        }
    }

    /// Flush every open appender in registration order, stopping at the first error
    ///
    /// # Errors
    ///
    /// The first `flush()` failure.
    pub fn flush_all(&self) -> Result<()> {
        for appender in self.appenders() {
            if !appender.is_closed() {
                appender.flush()?;
            }
        }
        Ok(())
    }

    /// Build an unregistered syslog appender.
    ///
    /// # Errors
    ///
    /// `MissingArgument` when `options` carries no name (checked before the
    /// platform capability is resolved), `Unsupported` when this platform
    /// has no syslog.
    pub fn syslog_appender(&self, options: SyslogOptions) -> Result<SharedAppender> {
        self.syslog.create(options).map(SharedAppender::new)
    }

    /// Build an unregistered appender from `config`
    ///
    /// # Errors
    ///
    /// See [`build_appender`].
    pub fn build(&self, name: &str, config: &AppenderConfig) -> Result<SharedAppender> {
        build_appender(name, config, &self.syslog)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.appenders.read().contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.appenders.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.appenders.read().is_empty()
    }

    /// Registered names in registration order
    pub fn names(&self) -> Vec<String> {
        self.appenders.read().keys().cloned().collect()
    }

    /// Registered appenders in registration order
    pub fn appenders(&self) -> Vec<SharedAppender> {
        self.appenders.read().values().cloned().collect()
    }

    /// Whether the syslog capability check has already run
    pub fn syslog_resolved(&self) -> bool {
        self.syslog.is_resolved()
    }
}

/// Whether `displaced` is a different appender than `stored` and still open
fn left_open(displaced: Option<&SharedAppender>, stored: &SharedAppender) -> bool {
    displaced.is_some_and(|old| !old.ptr_eq(stored) && !old.is_closed())
}
