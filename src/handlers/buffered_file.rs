//! Buffered file handler with double buffering for high-throughput logging
//!
//! Callers append formatted lines to a front buffer under a short lock. A
//! dedicated thread swaps the front buffer with its own back buffer and
//! writes the back buffer to disk with the lock released, so `write` never
//! waits on file I/O.
//!
//! The thread wakes when the front buffer reaches `buffer_size` bytes, when
//! a flush is requested, when the flush interval elapses, or on shutdown.

use super::file::FileSink;
use crate::core::{Handler, LogEntry, LoggerError, OutputFormat, Result};
use parking_lot::{Condvar, Mutex};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_millis(100);

/// Upper bound on how long [`Handler::flush`] waits for the writer thread
pub const DEFAULT_FLUSH_TIMEOUT: Duration = Duration::from_secs(1);

const FLUSH_POLL_INTERVAL: Duration = Duration::from_millis(1);

struct Buffers {
    front: Vec<String>,
    front_bytes: usize,
    /// The writer thread holds a swapped-out batch it has not finished writing
    writing: bool,
    stop: bool,
}

struct Shared {
    buffers: Mutex<Buffers>,
    wakeup: Condvar,
    /// Cleared by the writer thread only while the front buffer is empty
    flush_requested: AtomicBool,
    sink: Mutex<FileSink>,
}

impl Shared {
    /// Write a batch and flush it to the OS. Errors are reported, not returned.
    fn write_batch(&self, batch: &mut Vec<String>) {
        let mut sink = self.sink.lock();

        let mut result = Ok(());
        for line in batch.iter() {
            result = sink.write_line(line);
            if result.is_err() {
                break;
            }
        }
        let result = result.and_then(|_| sink.flush());

        if let Err(e) = result {
            eprintln!(
                "[LOGGER ERROR] Buffered write to '{}' failed, {} entries lost: {}",
                sink.path().display(),
                batch.len(),
                e
            );
        }
        batch.clear();
    }

    fn run(&self, interval: Duration) {
        let mut back: Vec<String> = Vec::new();

        loop {
            {
                let mut buffers = self.buffers.lock();
                if !self.flush_requested.load(Ordering::Acquire) && !buffers.stop {
                    self.wakeup.wait_for(&mut buffers, interval);
                }

                if buffers.front.is_empty() {
                    self.flush_requested.store(false, Ordering::Release);
                    if buffers.stop {
                        break;
                    }
                    continue;
                }

                std::mem::swap(&mut buffers.front, &mut back);
                buffers.front_bytes = 0;
                buffers.writing = true;
            }

            self.write_batch(&mut back);

            let mut buffers = self.buffers.lock();
            buffers.writing = false;
            if buffers.front.is_empty() {
                self.flush_requested.store(false, Ordering::Release);
            }
        }
    }
}

/// Double-buffered file writer with a background flush thread
///
/// # Example
///
/// ```no_run
/// use rust_structured_logger::handlers::BufferedFileHandler;
/// use std::time::Duration;
///
/// let handler = BufferedFileHandler::new(
///     "/var/log/ingest/app.log",
///     256 * 1024,
///     Duration::from_millis(50),
/// )
/// .unwrap();
/// ```
pub struct BufferedFileHandler {
    shared: Arc<Shared>,
    worker: Mutex<Option<JoinHandle<()>>>,
    path: PathBuf,
    buffer_size: usize,
    flush_interval: Duration,
    entries_written: AtomicU64,
    format: OutputFormat,
}

impl BufferedFileHandler {
    /// Open the file and start the writer thread
    pub fn new(path: impl Into<PathBuf>, buffer_size: usize, flush_interval: Duration) -> Result<Self> {
        let path = path.into();
        let sink = FileSink::open(&path)?;

        let shared = Arc::new(Shared {
            buffers: Mutex::new(Buffers {
                front: Vec::with_capacity(buffer_size / 100),
                front_bytes: 0,
                writing: false,
                stop: false,
            }),
            wakeup: Condvar::new(),
            flush_requested: AtomicBool::new(false),
            sink: Mutex::new(sink),
        });

        let worker_shared = Arc::clone(&shared);
        let handle = thread::Builder::new()
            .name("buffered-file-flush".to_string())
            .spawn(move || worker_shared.run(flush_interval))
            .map_err(|e| {
                LoggerError::io_operation(
                    "starting flush thread",
                    format!("Failed to spawn writer for '{}'", path.display()),
                    e,
                )
            })?;

        Ok(Self {
            shared,
            worker: Mutex::new(Some(handle)),
            path,
            buffer_size,
            flush_interval,
            entries_written: AtomicU64::new(0),
            format: OutputFormat::Json,
        })
    }

    /// 64 KiB buffer, 100 ms flush interval
    pub fn with_defaults(path: impl Into<PathBuf>) -> Result<Self> {
        Self::new(path, DEFAULT_BUFFER_SIZE, DEFAULT_FLUSH_INTERVAL)
    }

    #[must_use]
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    pub fn flush_interval(&self) -> Duration {
        self.flush_interval
    }

    /// Entries accepted into the front buffer
    pub fn entries_written(&self) -> u64 {
        self.entries_written.load(Ordering::Relaxed)
    }

    /// Ask the writer thread to drain and wait up to `timeout` for it.
    ///
    /// Returns `false` if data was still pending when the wait ran out.
    pub fn flush_with_timeout(&self, timeout: Duration) -> bool {
        {
            let buffers = self.shared.buffers.lock();
            if buffers.front.is_empty() && !buffers.writing {
                return true;
            }
            if buffers.stop {
                // Writer thread is gone; close() drains what is left
                return buffers.front.is_empty();
            }
            self.shared.flush_requested.store(true, Ordering::Release);
            self.shared.wakeup.notify_one();
        }

        let deadline = Instant::now() + timeout;
        while self.shared.flush_requested.load(Ordering::Acquire) {
            if Instant::now() >= deadline {
                return false;
            }
            thread::sleep(FLUSH_POLL_INTERVAL);
        }
        true
    }
}

impl Handler for BufferedFileHandler {
    fn write(&self, entry: &LogEntry) -> Result<()> {
        let formatted = self.format.format(entry)?;
        let entry_size = formatted.len() + 1;

        let mut buffers = self.shared.buffers.lock();
        if buffers.stop {
            return Err(LoggerError::handler_closed(self.name()));
        }

        buffers.front.push(formatted);
        buffers.front_bytes += entry_size;
        self.entries_written.fetch_add(1, Ordering::Relaxed);

        if buffers.front_bytes >= self.buffer_size {
            self.shared.flush_requested.store(true, Ordering::Release);
            self.shared.wakeup.notify_one();
        }
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        if !self.flush_with_timeout(DEFAULT_FLUSH_TIMEOUT) {
            eprintln!(
                "[LOGGER WARNING] Buffered flush of '{}' did not complete within {:?}",
                self.path.display(),
                DEFAULT_FLUSH_TIMEOUT
            );
        }
        Ok(())
    }

    /// Stop and join the writer thread, drain the front buffer, close the file
    fn close(&self) -> Result<()> {
        {
            let mut buffers = self.shared.buffers.lock();
            buffers.stop = true;
        }
        self.shared.wakeup.notify_all();

        if let Some(handle) = self.worker.lock().take() {
            if handle.join().is_err() {
                eprintln!(
                    "[LOGGER CRITICAL] Flush thread for '{}' panicked during shutdown",
                    self.path.display()
                );
            }
        }

        let mut remaining = {
            let mut buffers = self.shared.buffers.lock();
            buffers.front_bytes = 0;
            std::mem::take(&mut buffers.front)
        };
        if !remaining.is_empty() {
            self.shared.write_batch(&mut remaining);
        }

        self.shared.sink.lock().close()
    }

    fn name(&self) -> &str {
        "buffered_file"
    }
}

impl Drop for BufferedFileHandler {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            eprintln!("[LOGGER ERROR] Failed to close buffered handler: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{LogLevel, SourceLocation};
    use std::fs;
    use tempfile::tempdir;

    fn entry(i: usize) -> LogEntry {
        LogEntry::new(
            LogLevel::Info,
            format!("ingested batch {}", i),
            SourceLocation::new("ingest.rs", 77, "ingest::push"),
        )
    }

    fn count_lines(path: &Path) -> usize {
        fs::read_to_string(path).map(|c| c.lines().count()).unwrap_or(0)
    }

    fn wait_for_lines(path: &Path, expected: usize) -> usize {
        let deadline = Instant::now() + Duration::from_secs(3);
        loop {
            let lines = count_lines(path);
            if lines >= expected || Instant::now() >= deadline {
                return lines;
            }
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_flush_persists_every_write() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.log");
        let handler = BufferedFileHandler::new(&path, 16 * 1024 * 1024, Duration::from_secs(10)).unwrap();

        for i in 0..1000 {
            handler.write(&entry(i)).unwrap();
        }
        assert!(handler.flush_with_timeout(Duration::from_secs(5)));

        assert_eq!(count_lines(&path), 1000);
        assert_eq!(handler.entries_written(), 1000);
    }

    #[test]
    fn test_threshold_wakes_writer() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.log");
        let handler = BufferedFileHandler::new(&path, 1, Duration::from_secs(10)).unwrap();

        for i in 0..10 {
            handler.write(&entry(i)).unwrap();
        }

        assert_eq!(wait_for_lines(&path, 10), 10);
    }

    #[test]
    fn test_interval_flushes_without_request() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.log");
        let handler = BufferedFileHandler::new(&path, DEFAULT_BUFFER_SIZE, Duration::from_millis(20)).unwrap();

        for i in 0..3 {
            handler.write(&entry(i)).unwrap();
        }

        assert_eq!(wait_for_lines(&path, 3), 3);
    }

    #[test]
    fn test_close_drains_and_rejects_later_writes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.log");
        let handler = BufferedFileHandler::new(&path, DEFAULT_BUFFER_SIZE, Duration::from_secs(10)).unwrap();

        for i in 0..5 {
            handler.write(&entry(i)).unwrap();
        }
        handler.close().unwrap();

        assert_eq!(count_lines(&path), 5);
        let err = handler.write(&entry(99)).unwrap_err();
        assert!(matches!(err, LoggerError::HandlerClosed { .. }));
        assert!(handler.flush().is_ok());
        assert!(handler.close().is_ok());
    }

    #[test]
    fn test_drop_drains() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.log");
        {
            let handler = BufferedFileHandler::with_defaults(&path).unwrap();
            for i in 0..20 {
                handler.write(&entry(i)).unwrap();
            }
        }
        assert_eq!(count_lines(&path), 20);
    }

    #[test]
    fn test_concurrent_writers() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.log");
        let handler = Arc::new(BufferedFileHandler::new(&path, 4096, Duration::from_millis(10)).unwrap());

        let threads: Vec<_> = (0..8)
            .map(|t| {
                let handler = Arc::clone(&handler);
                thread::spawn(move || {
                    for i in 0..500 {
                        handler.write(&entry(t * 1000 + i)).unwrap();
                    }
                })
            })
            .collect();
        for t in threads {
            t.join().unwrap();
        }
        assert!(handler.flush_with_timeout(Duration::from_secs(5)));

        let content = fs::read_to_string(&path).unwrap();
        let mut count = 0;
        for line in content.lines() {
            serde_json::from_str::<serde_json::Value>(line).unwrap();
            count += 1;
        }
        assert_eq!(count, 4000);
    }

    #[test]
    fn test_flush_on_empty_buffer_returns_immediately() {
        let dir = tempdir().unwrap();
        let handler = BufferedFileHandler::with_defaults(dir.path().join("app.log")).unwrap();
        assert!(handler.flush_with_timeout(Duration::ZERO));
        assert_eq!(handler.buffer_size(), DEFAULT_BUFFER_SIZE);
        assert_eq!(handler.flush_interval(), DEFAULT_FLUSH_INTERVAL);
    }
}
