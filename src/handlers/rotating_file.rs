//! Rotating file handler with size-based rotation
//!
//! The active file lives at the configured path; backups are `<path>.1`
//! (newest) through `<path>.<max_backup_count>` (oldest). Rotation runs
//! before a write that would push the file past its size limit.
//!
//! If a rotation fails, the error is reported on stderr and the active file
//! is reopened so logging continues. If that reopen also fails, rotation is
//! disabled for the lifetime of the handler and writes go straight to the
//! active path. A recovered failure leaves the size counter untouched, so the
//! next write tries to rotate again.

use super::file::FileSink;
use crate::core::{Handler, LogEntry, LoggerError, OutputFormat, Result};
use parking_lot::Mutex;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

struct RotationState {
    sink: FileSink,
    current_size: u64,
    max_size: u64,
    max_backups: usize,
    rotation_disabled: bool,
    rotation_count: u64,
}

impl RotationState {
    fn should_rotate(&self, entry_size: u64) -> bool {
        !self.rotation_disabled && self.current_size + entry_size > self.max_size
    }

    fn rotate(&mut self) {
        match self.try_rotate() {
            Ok(()) => self.rotation_count += 1,
            Err(e) => {
                eprintln!("[LOGGER ERROR] {}", e);

                // Keep logging to the active file if at all possible
                if let Err(reopen_err) = self.sink.reopen() {
                    eprintln!(
                        "[LOGGER CRITICAL] Failed to reopen '{}' after rotation failure: {}. \
                         Disabling file rotation.",
                        self.sink.path().display(),
                        reopen_err
                    );
                    self.rotation_disabled = true;
                }
            }
        }
    }

    fn try_rotate(&mut self) -> Result<()> {
        let path = self.sink.path().to_path_buf();
        let fail = |what: &str, e: &dyn std::fmt::Display| {
            LoggerError::file_rotation(path.display().to_string(), format!("{}: {}", what, e))
        };

        self.sink
            .close()
            .map_err(|e| fail("Failed to close active file", &e))?;

        if self.max_backups == 0 {
            // No backups are kept; the rotated content is discarded
            if path.exists() {
                fs::remove_file(&path).map_err(|e| fail("Failed to remove active file", &e))?;
            }
        } else {
            let oldest = backup_path(&path, self.max_backups);
            if oldest.exists() {
                fs::remove_file(&oldest).map_err(|e| fail("Failed to remove oldest backup", &e))?;
            }

            for i in (2..=self.max_backups).rev() {
                let src = backup_path(&path, i - 1);
                if src.exists() {
                    fs::rename(&src, backup_path(&path, i))
                        .map_err(|e| fail("Failed to shift backup files", &e))?;
                }
            }

            if path.exists() {
                fs::rename(&path, backup_path(&path, 1))
                    .map_err(|e| fail("Failed to rotate current log file", &e))?;
            }
        }

        self.current_size = 0;
        self.sink
            .reopen()
            .map_err(|e| fail("Failed to create new log file", &e))
    }
}

/// `<path>.<index>`
pub fn backup_path(path: &Path, index: usize) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(format!(".{}", index));
    PathBuf::from(name)
}

/// Size-rotated file writer
///
/// # Example
///
/// ```no_run
/// use rust_structured_logger::handlers::RotatingFileHandler;
///
/// // 10 MiB per file, keep app.log.1 .. app.log.5
/// let handler = RotatingFileHandler::new("/var/log/app.log", 10 * 1024 * 1024, 5).unwrap();
/// ```
pub struct RotatingFileHandler {
    state: Mutex<RotationState>,
    format: OutputFormat,
}

impl RotatingFileHandler {
    /// Open the active file. The size counter starts at the file's current size.
    pub fn new(path: impl Into<PathBuf>, max_size_bytes: u64, max_backup_count: usize) -> Result<Self> {
        let sink = FileSink::open(path)?;
        let current_size = fs::metadata(sink.path()).map(|m| m.len()).unwrap_or(0);

        Ok(Self {
            state: Mutex::new(RotationState {
                sink,
                current_size,
                max_size: max_size_bytes,
                max_backups: max_backup_count,
                rotation_disabled: false,
                rotation_count: 0,
            }),
            format: OutputFormat::Json,
        })
    }

    #[must_use]
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn path(&self) -> PathBuf {
        self.state.lock().sink.path().to_path_buf()
    }

    /// Bytes accounted to the active file
    pub fn current_size(&self) -> u64 {
        self.state.lock().current_size
    }

    pub fn max_size_bytes(&self) -> u64 {
        self.state.lock().max_size
    }

    pub fn max_backup_count(&self) -> usize {
        self.state.lock().max_backups
    }

    /// Completed rotations since construction
    pub fn rotation_count(&self) -> u64 {
        self.state.lock().rotation_count
    }

    /// True once an unrecoverable filesystem error has switched rotation off
    pub fn rotation_disabled(&self) -> bool {
        self.state.lock().rotation_disabled
    }
}

impl Handler for RotatingFileHandler {
    fn write(&self, entry: &LogEntry) -> Result<()> {
        let formatted = self.format.format(entry)?;
        let entry_size = formatted.len() as u64 + 1;

        let mut state = self.state.lock();
        if state.should_rotate(entry_size) {
            state.rotate();
        }

        state.sink.write_line(&formatted)?;
        state.current_size += entry_size;
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        self.state.lock().sink.flush()
    }

    fn close(&self) -> Result<()> {
        self.state.lock().sink.close()
    }

    fn name(&self) -> &str {
        "rotating_file"
    }
}
