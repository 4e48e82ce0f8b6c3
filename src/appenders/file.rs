//! File appender implementation

use crate::core::{Appender, Layout, LogEntry, LoggerError, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub struct FileAppender {
    name: String,
    path: PathBuf,
    writer: Option<BufWriter<File>>,
    layout: Layout,
    auto_flush: bool,
}

impl FileAppender {
    /// Open `path` for appending, creating it and its parent directories
    ///
    /// # Errors
    ///
    /// Returns error if the directory or file cannot be created or opened
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Result<Self> {
        Self::open(name.into(), path.into(), false)
    }

    /// Like [`new`](Self::new) but discards any existing content
    ///
    /// # Errors
    ///
    /// Returns error if the directory or file cannot be created or opened
    pub fn truncating(name: impl Into<String>, path: impl Into<PathBuf>) -> Result<Self> {
        Self::open(name.into(), path.into(), true)
    }

    fn open(name: String, path: PathBuf, truncate: bool) -> Result<Self> {
        let writer = Some(BufWriter::new(Self::open_file(&path, truncate)?));
        Ok(Self {
            name,
            path,
            writer,
            layout: Layout::default(),
            auto_flush: false,
        })
    }

    fn open_file(path: &Path, truncate: bool) -> Result<File> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                LoggerError::io_operation(
                    "create log directory",
                    format!("Failed to create directory '{}'", parent.display()),
                    e,
                )
            })?;
        }

        let mut options = OpenOptions::new();
        options.create(true);
        if truncate {
            options.write(true).truncate(true);
        } else {
            options.append(true);
        }

        options.open(path).map_err(|e| {
            LoggerError::file_appender(path.display().to_string(), format!("Failed to open: {}", e))
        })
    }

    #[must_use]
    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    /// Flush after every entry instead of relying on the write buffer
    #[must_use]
    pub fn with_auto_flush(mut self, auto_flush: bool) -> Self {
        self.auto_flush = auto_flush;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush and reopen the file in append mode, e.g. after external rotation.
    ///
    /// Also reopens a closed appender.
    ///
    /// # Errors
    ///
    /// Returns error if the flush or the reopen fails
    pub fn reopen(&mut self) -> Result<()> {
        self.flush()?;
        self.writer = Some(BufWriter::new(Self::open_file(&self.path, false)?));
        Ok(())
    }
}

impl Appender for FileAppender {
    fn append(&mut self, entry: &LogEntry) -> Result<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| LoggerError::closed(&self.name))?;

        let mut output = self.layout.format(entry);
        output.push('\n');

        writer.write_all(output.as_bytes()).map_err(|e| {
            LoggerError::file_appender(
                self.path.display().to_string(),
                format!("Failed to write log entry: {}", e),
            )
        })?;

        if self.auto_flush {
            writer.flush()?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if let Some(ref mut writer) = self.writer {
            writer.flush()?;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush().map_err(|e| {
                LoggerError::io_operation(
                    "closing log file",
                    format!("Failed to flush '{}'", self.path.display()),
                    e,
                )
            })?;
            // dropping the writer releases the handle
        }
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.writer.is_none()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for FileAppender {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}
