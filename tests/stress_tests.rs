//! Stress tests for concurrent logging
//!
//! These tests verify:
//! - No entry is lost or torn when many threads share one logger
//! - Every file handler keeps lines whole under contention
//! - Timers emit at most once under concurrent transfer and cancel
//! - The registry stays consistent while being re-initialized

use rust_structured_logger::handlers::rotating_file::backup_path;
use rust_structured_logger::prelude::*;
use rust_structured_logger::{
    info, BufferedFileHandler, FileHandler, Registry, RotatingFileHandler,
};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

const THREADS: usize = 8;
const PER_THREAD: usize = 1_000;

/// Counts entries without storing them
#[derive(Default)]
struct CountingHandler {
    count: AtomicUsize,
}

impl Handler for CountingHandler {
    fn write(&self, _entry: &LogEntry) -> Result<()> {
        self.count.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "counting"
    }
}

/// Parse every line as JSON and return `(thread, seq)` pairs
fn collect_ids(path: &Path) -> Vec<(u64, u64)> {
    let content = std::fs::read_to_string(path).unwrap_or_default();
    content
        .lines()
        .map(|line| {
            let record: serde_json::Value =
                serde_json::from_str(line).unwrap_or_else(|e| panic!("torn line {:?}: {}", line, e));
            (
                record["context"]["thread"].as_u64().unwrap(),
                record["context"]["seq"].as_u64().unwrap(),
            )
        })
        .collect()
}

fn hammer(logger: &Logger) {
    let barrier = Arc::new(Barrier::new(THREADS));
    thread::scope(|s| {
        for t in 0..THREADS {
            let logger = logger.clone();
            let barrier = Arc::clone(&barrier);
            s.spawn(move || {
                barrier.wait();
                for i in 0..PER_THREAD {
                    info!(
                        logger,
                        ctx = LogContext::new().with_field("thread", t).with_field("seq", i);
                        "payload {}", "y".repeat(i % 64)
                    );
                }
            });
        }
    });
}

/// Entries from one thread appear in that thread's order
fn assert_complete_and_ordered(mut ids: Vec<(u64, u64)>) {
    assert_eq!(ids.len(), THREADS * PER_THREAD);

    for t in 0..THREADS as u64 {
        let seqs: Vec<u64> = ids.iter().filter(|(id, _)| *id == t).map(|(_, s)| *s).collect();
        let expected: Vec<u64> = (0..PER_THREAD as u64).collect();
        assert_eq!(seqs, expected, "thread {} out of order", t);
    }

    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), THREADS * PER_THREAD);
}

#[test]
fn test_concurrent_plain_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("plain.log");

    let logger = Logger::builder()
        .config(Config::new("stress"))
        .handler(FileHandler::new(&log_file).unwrap())
        .build();

    hammer(&logger);
    logger.flush();

    assert_complete_and_ordered(collect_ids(&log_file));
    assert_eq!(logger.metrics().total_logged(), (THREADS * PER_THREAD) as u64);
    assert_eq!(logger.metrics().dropped_count(), 0);
}

#[test]
fn test_concurrent_rotating_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("rotating.log");

    // Enough backups that nothing is deleted
    let handler = Arc::new(RotatingFileHandler::new(&log_file, 64 * 1024, 10_000).unwrap());
    let logger = Logger::builder()
        .config(Config::new("stress"))
        .shared_handler(handler.clone())
        .build();

    hammer(&logger);
    logger.flush();

    let rotations = handler.rotation_count() as usize;
    assert!(rotations > 0);

    let mut ids = Vec::new();
    for i in (1..=rotations).rev() {
        let backup = backup_path(&log_file, i);
        assert!(std::fs::metadata(&backup).unwrap().len() <= 64 * 1024);
        ids.extend(collect_ids(&backup));
    }
    ids.extend(collect_ids(&log_file));

    assert_complete_and_ordered(ids);
    assert!(!backup_path(&log_file, rotations + 1).exists());
}

#[test]
fn test_concurrent_buffered_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("buffered.log");

    let handler = Arc::new(
        BufferedFileHandler::new(&log_file, 16 * 1024, Duration::from_millis(20)).unwrap(),
    );
    let logger = Logger::builder()
        .config(Config::new("stress"))
        .shared_handler(handler.clone())
        .build();

    hammer(&logger);
    assert!(handler.flush_with_timeout(Duration::from_secs(10)));

    assert_complete_and_ordered(collect_ids(&log_file));
    assert_eq!(handler.entries_written(), (THREADS * PER_THREAD) as u64);
}

#[test]
fn test_concurrent_flush_while_writing() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("flush_race.log");

    let handler = Arc::new(
        BufferedFileHandler::new(&log_file, 4 * 1024, Duration::from_secs(5)).unwrap(),
    );
    let logger = Logger::builder()
        .config(Config::new("stress"))
        .shared_handler(handler.clone())
        .build();

    thread::scope(|s| {
        for t in 0..4usize {
            let logger = logger.clone();
            s.spawn(move || {
                for i in 0..500usize {
                    logger.log_with_context(
                        LogLevel::Info,
                        "tick",
                        LogContext::new().with_field("thread", t).with_field("seq", i),
                    );
                    if i % 50 == 0 {
                        logger.flush();
                    }
                }
            });
        }
    });
    logger.flush();

    assert_eq!(collect_ids(&log_file).len(), 4 * 500);
}

#[test]
fn test_concurrent_timer_transfers_emit_once() {
    let counter = Arc::new(CountingHandler::default());
    let logger = Logger::builder()
        .config(Config::new("stress"))
        .shared_handler(counter.clone())
        .build();

    for _ in 0..50 {
        let before = counter.count.load(Ordering::Relaxed);
        let timer = logger.timer("contended", LogContext::new(), SourceLocation::caller());

        thread::scope(|s| {
            for _ in 0..THREADS {
                s.spawn(|| {
                    let moved = timer.transfer();
                    drop(moved);
                });
            }
        });
        drop(timer);

        assert_eq!(counter.count.load(Ordering::Relaxed), before + 1);
    }
}

#[test]
fn test_concurrent_timer_cancel_races_transfer() {
    let counter = Arc::new(CountingHandler::default());
    let logger = Logger::builder()
        .config(Config::new("stress"))
        .shared_handler(counter.clone())
        .build();

    for _ in 0..50 {
        let before = counter.count.load(Ordering::Relaxed);
        let timer = logger.timer("racy", LogContext::new(), SourceLocation::caller());

        thread::scope(|s| {
            s.spawn(|| timer.cancel());
            for _ in 0..4 {
                s.spawn(|| drop(timer.transfer()));
            }
        });
        drop(timer);

        let emitted = counter.count.load(Ordering::Relaxed) - before;
        assert!(emitted <= 1, "timer emitted {} times", emitted);
    }
}

#[test]
fn test_reinitialize_under_load() {
    let registry = Registry::new();
    let first = Arc::new(CountingHandler::default());
    let second = Arc::new(CountingHandler::default());
    let quiet = || Config::new("stress").with_console(false).with_file(false);

    registry
        .initialize_with_handlers(quiet(), vec![first.clone() as Arc<dyn Handler>])
        .unwrap();

    let written = AtomicUsize::new(0);
    thread::scope(|s| {
        for _ in 0..THREADS {
            s.spawn(|| {
                for i in 0..500 {
                    let logger = registry.get_logger(if i % 2 == 0 { "even" } else { "odd" });
                    logger.info("load");
                    written.fetch_add(1, Ordering::Relaxed);
                }
            });
        }
        s.spawn(|| {
            thread::sleep(Duration::from_millis(1));
            registry
                .initialize_with_handlers(quiet(), vec![second.clone() as Arc<dyn Handler>])
                .unwrap();
        });
    });

    let total = first.count.load(Ordering::Relaxed) + second.count.load(Ordering::Relaxed);
    assert_eq!(total, written.load(Ordering::Relaxed));
    assert_eq!(total, THREADS * 500);
    registry.shutdown();
}
