//! File handler implementation

use crate::core::{Handler, LogEntry, LoggerError, OutputFormat, Result};
use parking_lot::Mutex;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Open `path` for appending, creating missing parent directories
pub(crate) fn open_append(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            LoggerError::io_operation(
                "create log directory",
                format!("Failed to create directory '{}'", parent.display()),
                e,
            )
        })?;
    }

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| LoggerError::file_handler(path.display().to_string(), format!("Failed to open: {}", e)))
}

/// Append-mode writer that reopens its file on demand
pub(crate) struct FileSink {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
}

impl FileSink {
    pub(crate) fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file = open_append(&path)?;
        Ok(Self {
            path,
            writer: Some(BufWriter::new(file)),
        })
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn is_open(&self) -> bool {
        self.writer.is_some()
    }

    /// Reopen the file if it was closed
    pub(crate) fn reopen(&mut self) -> Result<()> {
        if self.writer.is_none() {
            self.writer = Some(BufWriter::new(open_append(&self.path)?));
        }
        Ok(())
    }

    /// Write one record followed by a newline
    pub(crate) fn write_line(&mut self, line: &str) -> Result<()> {
        self.reopen()?;
        if let Some(writer) = self.writer.as_mut() {
            writer.write_all(line.as_bytes())?;
            writer.write_all(b"\n")?;
        }
        Ok(())
    }

    pub(crate) fn flush(&mut self) -> Result<()> {
        if let Some(ref mut writer) = self.writer {
            writer.flush()?;
        }
        Ok(())
    }

    /// Flush and release the file handle
    pub(crate) fn close(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush().map_err(|e| {
                LoggerError::io_operation(
                    "closing log file",
                    format!("Failed to flush '{}'", self.path.display()),
                    e,
                )
            })?;
        }
        Ok(())
    }
}

impl Drop for FileSink {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            eprintln!("[LOGGER ERROR] {}", e);
        }
    }
}

/// Single-file writer, one line per entry
///
/// # Example
///
/// ```no_run
/// use rust_structured_logger::handlers::FileHandler;
///
/// let handler = FileHandler::new("/var/log/orders/app.log").unwrap();
/// ```
pub struct FileHandler {
    sink: Mutex<FileSink>,
    format: OutputFormat,
}

impl FileHandler {
    /// Open `path` in append mode. Fails if the file cannot be created.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self {
            sink: Mutex::new(FileSink::open(path)?),
            format: OutputFormat::Json,
        })
    }

    #[must_use]
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn path(&self) -> PathBuf {
        self.sink.lock().path().to_path_buf()
    }

    pub fn is_open(&self) -> bool {
        self.sink.lock().is_open()
    }
}

impl Handler for FileHandler {
    fn write(&self, entry: &LogEntry) -> Result<()> {
        let formatted = self.format.format(entry)?;
        self.sink.lock().write_line(&formatted)
    }

    fn flush(&self) -> Result<()> {
        self.sink.lock().flush()
    }

    fn close(&self) -> Result<()> {
        self.sink.lock().close()
    }

    fn name(&self) -> &str {
        "file"
    }
}
