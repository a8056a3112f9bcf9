//! Handler trait for log output destinations

use super::{error::Result, log_entry::LogEntry};
use std::sync::Arc;

/// A sink that persists or displays entries.
///
/// Handlers are shared by every logger of an epoch and called concurrently,
/// so each one guards its own state. Errors returned here never reach
/// application code; the dispatch loop reports and counts them.
pub trait Handler: Send + Sync {
    fn write(&self, entry: &LogEntry) -> Result<()>;

    fn flush(&self) -> Result<()>;

    /// Release resources at shutdown. Loggers that outlive the epoch may
    /// still call `write` afterwards.
    fn close(&self) -> Result<()> {
        self.flush()
    }

    fn name(&self) -> &str;
}

/// Ordered handler list shared by all loggers of one epoch
pub type HandlerSet = Arc<Vec<Arc<dyn Handler>>>;

/// Run one handler operation, reporting an error or panic on stderr.
///
/// Returns `false` if the operation failed.
pub(crate) fn run_isolated<F>(handler: &dyn Handler, action: &str, op: F) -> bool
where
    F: FnOnce() -> Result<()>,
{
    match std::panic::catch_unwind(std::panic::AssertUnwindSafe(op)) {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            eprintln!("[LOGGER ERROR] Handler '{}' {} failed: {}", handler.name(), action, e);
            false
        }
        Err(panic_info) => {
            eprintln!(
                "[LOGGER CRITICAL] Handler '{}' panicked during {}: {}",
                handler.name(),
                action,
                panic_message(panic_info.as_ref())
            );
            false
        }
    }
}

pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
