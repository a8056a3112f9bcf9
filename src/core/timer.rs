//! Scoped duration recorder
//!
//! A [`Timer`] emits one Info entry when dropped: the message is the
//! operation name and `duration_ms` the time since it was started. The
//! context is the one captured when the timer was created.

use super::{log_context::LogContext, log_level::LogLevel, logger::Logger, source_location::SourceLocation};
use parking_lot::Mutex;
use std::time::{Duration, Instant};

struct TimerState {
    operation: String,
    context: LogContext,
    location: SourceLocation,
    start: Instant,
    cancelled: bool,
}

/// Scoped guard returned by [`Logger::timer`] and the `timer!` macro.
///
/// Armed timers emit on drop. [`Timer::cancel`] and [`Timer::transfer`]
/// take the same per-instance lock as the drop path, so at most one of a
/// source and its transfer target ever emits.
///
/// # Example
/// ```
/// use rust_structured_logger::prelude::*;
///
/// let logger = Logger::builder().config(Config::new("svc")).build();
/// {
///     let _timer = logger.timer("load_catalog", LogContext::new(), SourceLocation::caller());
///     // work
/// } // one INFO entry with duration_ms
///
/// let timer = logger.timer("aborted", LogContext::new(), SourceLocation::caller());
/// timer.cancel(); // nothing is logged
/// ```
pub struct Timer {
    logger: Logger,
    state: Mutex<TimerState>,
}

impl Timer {
    pub(crate) fn start(
        logger: Logger,
        operation: String,
        context: LogContext,
        location: SourceLocation,
    ) -> Self {
        Self {
            logger,
            state: Mutex::new(TimerState {
                operation,
                context,
                location,
                start: Instant::now(),
                cancelled: false,
            }),
        }
    }

    /// Suppress the entry. Idempotent.
    pub fn cancel(&self) {
        self.state.lock().cancelled = true;
    }

    /// Whether this instance will emit when dropped
    pub fn is_armed(&self) -> bool {
        !self.state.lock().cancelled
    }

    pub fn elapsed(&self) -> Duration {
        self.state.lock().start.elapsed()
    }

    pub fn operation(&self) -> String {
        self.state.lock().operation.clone()
    }

    /// Move the armed state into a new timer and disarm this one.
    ///
    /// The new timer keeps the original start instant. Transferring a
    /// cancelled timer yields a cancelled timer.
    #[must_use = "the returned Timer carries the armed state"]
    pub fn transfer(&self) -> Timer {
        let mut state = self.state.lock();
        let moved = TimerState {
            operation: state.operation.clone(),
            context: state.context.clone(),
            location: state.location.clone(),
            start: state.start,
            cancelled: state.cancelled,
        };
        state.cancelled = true;

        Timer {
            logger: self.logger.clone(),
            state: Mutex::new(moved),
        }
    }

    /// Emit now instead of at end of scope
    pub fn finish(self) {
        // Drop does the work
    }

    fn emit(&self) {
        let mut state = self.state.lock();
        if state.cancelled {
            return;
        }
        // Only cancellation suppresses the entry; the level filter does not apply
        state.cancelled = true;

        let duration_ms = state.start.elapsed().as_micros() as f64 / 1000.0;
        let entry = self
            .logger
            .entry(LogLevel::Info, state.operation.clone(), state.location.clone())
            .with_context(std::mem::take(&mut state.context))
            .with_duration_ms(duration_ms);

        // Handlers run without the timer lock held
        drop(state);
        self.logger.dispatch(&entry);
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        self.emit();
    }
}

impl std::fmt::Debug for Timer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Timer")
            .field("logger", &self.logger.name())
            .field("operation", &state.operation)
            .field("cancelled", &state.cancelled)
            .finish()
    }
}
