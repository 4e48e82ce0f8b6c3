//! Rolling file appender
//!
//! Writes to `path` and, when the configured [`RollStrategy`] says so, moves
//! the current file to `path.1` (shifting older backups to `path.2`, ...)
//! before starting a fresh file. At most `keep` backups are retained and
//! they can be gzip-compressed.

use crate::core::{Appender, Layout, LogEntry, LoggerError, Result};
use chrono::{DateTime, Local};
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// When to roll the current file over
///
/// # Examples
///
/// ```
/// use appender_registry::appenders::RollStrategy;
/// use std::time::Duration;
///
/// // Roll once the file exceeds 10 MB
/// let by_size = RollStrategy::size(10 * 1024 * 1024);
///
/// // Roll every six hours
/// let by_age = RollStrategy::age(Duration::from_secs(6 * 3600));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum RollStrategy {
    /// Roll when the file reaches `max_bytes`
    Size { max_bytes: u64 },

    /// Roll when the file is older than `interval`
    Age { interval: Duration },

    /// Roll on the first write of a new local calendar day
    Daily,

    /// Never roll (external rotation or tests)
    Never,
}

impl Default for RollStrategy {
    fn default() -> Self {
        RollStrategy::Size {
            max_bytes: 10 * 1024 * 1024,
        }
    }
}

impl RollStrategy {
    #[must_use]
    pub fn size(max_bytes: u64) -> Self {
        RollStrategy::Size { max_bytes }
    }

    #[must_use]
    pub fn age(interval: Duration) -> Self {
        RollStrategy::Age { interval }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RollPolicy {
    pub strategy: RollStrategy,
    /// Number of rolled files to retain
    pub keep: usize,
    /// Gzip rolled files
    pub compress: bool,
}

impl Default for RollPolicy {
    fn default() -> Self {
        Self {
            strategy: RollStrategy::default(),
            keep: 5,
            compress: false,
        }
    }
}

impl RollPolicy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_strategy(mut self, strategy: RollStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_keep(mut self, keep: usize) -> Self {
        self.keep = keep;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_compression(mut self, enabled: bool) -> Self {
        self.compress = enabled;
        self
    }
}

/// File appender that rolls over according to a [`RollPolicy`]
///
/// # Example
///
/// ```no_run
/// use appender_registry::appenders::{RollPolicy, RollStrategy, RollingFileAppender};
///
/// let policy = RollPolicy::new()
///     .with_strategy(RollStrategy::size(50 * 1024 * 1024))
///     .with_keep(7)
///     .with_compression(true);
/// let appender = RollingFileAppender::new("app", "/var/log/app.log", policy).unwrap();
/// ```
pub struct RollingFileAppender {
    name: String,
    path: PathBuf,
    policy: RollPolicy,
    writer: Option<BufWriter<File>>,
    current_size: u64,
    /// Start of the current file's lifetime, for age and daily strategies
    opened_at: SystemTime,
    layout: Layout,
    closed: bool,
}

impl RollingFileAppender {
    /// # Errors
    ///
    /// Returns error if the directory or file cannot be created or opened
    pub fn new(
        name: impl Into<String>,
        path: impl AsRef<Path>,
        policy: RollPolicy,
    ) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                LoggerError::io_operation(
                    "create log directory",
                    format!("Failed to create directory '{}'", parent.display()),
                    e,
                )
            })?;
        }

        let (file, current_size, opened_at) = Self::open_current(&path)?;

        Ok(Self {
            name: name.into(),
            path,
            policy,
            writer: Some(BufWriter::new(file)),
            current_size,
            opened_at,
            layout: Layout::default(),
            closed: false,
        })
    }

    #[must_use]
    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    fn open_current(path: &Path) -> Result<(File, u64, SystemTime)> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| {
                LoggerError::file_appender(path.display().to_string(), format!("Failed to open: {}", e))
            })?;

        let metadata = file.metadata().map_err(|e| {
            LoggerError::file_appender(
                path.display().to_string(),
                format!("Cannot access file metadata: {}", e),
            )
        })?;
        let opened_at = metadata.modified().unwrap_or_else(|_| SystemTime::now());
        Ok((file, metadata.len(), opened_at))
    }

    fn should_roll(&self) -> bool {
        match &self.policy.strategy {
            RollStrategy::Never => false,
            RollStrategy::Size { max_bytes } => self.current_size >= *max_bytes,
            RollStrategy::Age { interval } => {
                SystemTime::now()
                    .duration_since(self.opened_at)
                    .unwrap_or(Duration::ZERO)
                    >= *interval
            }
            RollStrategy::Daily => {
                let now: DateTime<Local> = SystemTime::now().into();
                let opened: DateTime<Local> = self.opened_at.into();
                now.date_naive() != opened.date_naive()
            }
        }
    }

    fn backup_path(&self, index: usize) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(format!(".{}", index));
        PathBuf::from(name)
    }

    fn compressed_path(path: &Path) -> PathBuf {
        let mut name = path.as_os_str().to_os_string();
        name.push(".gz");
        PathBuf::from(name)
    }

    /// Move the current file to `.1`, shift older backups and start afresh
    fn roll(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush().map_err(|e| {
                LoggerError::file_rotation(
                    self.path.display().to_string(),
                    format!("Failed to flush before rolling: {}", e),
                )
            })?;
        }

        if self.policy.keep == 0 {
            fs::remove_file(&self.path).map_err(|e| {
                LoggerError::file_rotation(self.path.display().to_string(), e.to_string())
            })?;
        } else {
            for candidate in [
                self.backup_path(self.policy.keep),
                Self::compressed_path(&self.backup_path(self.policy.keep)),
            ] {
                if candidate.exists() {
                    fs::remove_file(&candidate).map_err(|e| {
                        LoggerError::file_rotation(
                            candidate.display().to_string(),
                            format!("Failed to remove oldest backup: {}", e),
                        )
                    })?;
                }
            }

            for index in (1..self.policy.keep).rev() {
                for (from, to) in [
                    (self.backup_path(index), self.backup_path(index + 1)),
                    (
                        Self::compressed_path(&self.backup_path(index)),
                        Self::compressed_path(&self.backup_path(index + 1)),
                    ),
                ] {
                    if from.exists() {
                        fs::rename(&from, &to).map_err(|e| {
                            LoggerError::file_rotation(
                                from.display().to_string(),
                                format!("Failed to shift backup: {}", e),
                            )
                        })?;
                    }
                }
            }

            let first = self.backup_path(1);
            fs::rename(&self.path, &first).map_err(|e| {
                LoggerError::file_rotation(
                    self.path.display().to_string(),
                    format!("Failed to roll current file: {}", e),
                )
            })?;

            if self.policy.compress {
                Self::compress_file(&first)?;
            }
        }

        let (file, size, _) = Self::open_current(&self.path)?;
        self.writer = Some(BufWriter::new(file));
        self.current_size = size;
        self.opened_at = SystemTime::now();
        log::debug!("appender '{}' rolled {}", self.name, self.path.display());
        Ok(())
    }

    /// Gzip `path` into `path.gz`; the original is removed only once the
    /// compressed copy is complete.
    fn compress_file(path: &Path) -> Result<()> {
        let gz_path = Self::compressed_path(path);
        let mut tmp_name = gz_path.as_os_str().to_os_string();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);

        let compress = || -> std::io::Result<()> {
            let mut input = File::open(path)?;
            let output = BufWriter::new(File::create(&tmp_path)?);
            let mut encoder = flate2::write::GzEncoder::new(output, flate2::Compression::default());
            std::io::copy(&mut input, &mut encoder)?;
            encoder.finish()?.flush()?;
            fs::rename(&tmp_path, &gz_path)
        };

        compress().map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            LoggerError::io_operation(
                "compress rolled log",
                format!("Failed to compress '{}'", path.display()),
                e,
            )
        })?;

        if let Err(e) = fs::remove_file(path) {
            log::warn!(
                "compressed {} but could not remove the original: {}",
                path.display(),
                e
            );
        }
        Ok(())
    }

    #[must_use]
    pub fn current_size(&self) -> u64 {
        self.current_size
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn policy(&self) -> &RollPolicy {
        &self.policy
    }
}

impl Appender for RollingFileAppender {
    fn append(&mut self, entry: &LogEntry) -> Result<()> {
        if self.closed {
            return Err(LoggerError::closed(&self.name));
        }

        if self.should_roll() {
            if let Err(e) = self.roll() {
                log::warn!("rolling {} failed: {}; continuing with current file", self.path.display(), e);

                if self.writer.is_none() {
                    let (file, size, opened_at) = Self::open_current(&self.path).map_err(|reopen| {
                        log::error!("could not reopen {} after failed roll: {}", self.path.display(), reopen);
                        e
                    })?;
                    self.writer = Some(BufWriter::new(file));
                    self.current_size = size;
                    self.opened_at = opened_at;
                }

                // avoid retrying the roll on every write
                self.current_size = 0;
                self.opened_at = SystemTime::now();
            }
        }

        let mut line = self.layout.format(entry);
        line.push('\n');

        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| LoggerError::writer("Writer not initialized"))?;
        writer.write_all(line.as_bytes()).map_err(|e| {
            LoggerError::file_appender(
                self.path.display().to_string(),
                format!("Failed to write log entry: {}", e),
            )
        })?;
        self.current_size += line.len() as u64;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if let Some(ref mut writer) = self.writer {
            writer.flush().map_err(|e| {
                LoggerError::file_appender(
                    self.path.display().to_string(),
                    format!("Failed to flush: {}", e),
                )
            })?;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
        }
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for RollingFileAppender {
    fn drop(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            let _ = writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LogLevel;
    use std::io::Read;
    use tempfile::tempdir;

    fn entry(message: &str) -> LogEntry {
        LogEntry::new(LogLevel::Info, "roll", message)
    }

    #[test]
    fn test_policy_builder() {
        let policy = RollPolicy::new()
            .with_strategy(RollStrategy::size(1024))
            .with_keep(3)
            .with_compression(true);

        assert_eq!(policy.strategy, RollStrategy::Size { max_bytes: 1024 });
        assert_eq!(policy.keep, 3);
        assert!(policy.compress);
        assert_eq!(RollPolicy::default().keep, 5);
    }

    #[test]
    fn test_rolls_at_size_threshold() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.log");
        let policy = RollPolicy::new()
            .with_strategy(RollStrategy::size(100))
            .with_keep(3);

        let mut appender = RollingFileAppender::new("roll", &path, policy).unwrap();
        for i in 0..10 {
            appender.append(&entry(&format!("message number {}", i))).unwrap();
        }
        appender.close().unwrap();

        assert!(path.exists());
        assert!(dir.path().join("app.log.1").exists());
        assert!(dir.path().join("app.log.3").exists());
        assert!(!dir.path().join("app.log.4").exists());
    }

    #[test]
    fn test_never_strategy_keeps_single_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.log");
        let policy = RollPolicy::new().with_strategy(RollStrategy::Never);

        let mut appender = RollingFileAppender::new("roll", &path, policy).unwrap();
        for i in 0..50 {
            appender.append(&entry(&format!("line {}", i))).unwrap();
        }
        appender.close().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap().lines().count(), 50);
        assert!(!dir.path().join("app.log.1").exists());
    }

    #[test]
    fn test_age_strategy_rolls_after_interval() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.log");
        let policy = RollPolicy::new().with_strategy(RollStrategy::age(Duration::from_millis(50)));

        let mut appender = RollingFileAppender::new("roll", &path, policy).unwrap();
        appender.append(&entry("first")).unwrap();
        std::thread::sleep(Duration::from_millis(100));
        appender.append(&entry("second")).unwrap();
        appender.close().unwrap();

        let rolled = fs::read_to_string(dir.path().join("app.log.1")).unwrap();
        assert!(rolled.contains("first"));
        assert!(fs::read_to_string(&path).unwrap().contains("second"));
    }

    #[test]
    fn test_compressed_backups() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.log");
        let policy = RollPolicy::new()
            .with_strategy(RollStrategy::size(10))
            .with_keep(2)
            .with_compression(true);

        let mut appender = RollingFileAppender::new("roll", &path, policy).unwrap();
        appender.append(&entry("compress me")).unwrap();
        appender.append(&entry("trigger")).unwrap();
        appender.close().unwrap();

        let gz = dir.path().join("app.log.1.gz");
        assert!(gz.exists());
        assert!(!dir.path().join("app.log.1").exists());

        let mut decoded = String::new();
        flate2::read::GzDecoder::new(File::open(gz).unwrap())
            .read_to_string(&mut decoded)
            .unwrap();
        assert!(decoded.contains("compress me"));
    }

    #[test]
    fn test_closed_rejects_writes() {
        let dir = tempdir().unwrap();
        let mut appender =
            RollingFileAppender::new("roll", dir.path().join("app.log"), RollPolicy::default())
                .unwrap();

        appender.close().unwrap();
        appender.close().unwrap();
        assert!(appender.is_closed());
        assert!(matches!(
            appender.append(&entry("late")),
            Err(LoggerError::AppenderClosed { .. })
        ));
    }
}
