//! Process-wide logging lifecycle
//!
//! A [`Registry`] owns the active config snapshot, the handler set built from
//! it and a name-keyed logger cache, all behind one lock. The lock covers
//! bookkeeping only; loggers hand entries to their handlers without it.
//!
//! Most programs use the process-wide registry through the free functions
//! [`initialize`], [`get_logger`], [`flush`] and [`shutdown`]. Tests and
//! embedders can create their own `Registry` values.

use super::{
    config::{Config, FileMode},
    error::{LoggerError, Result},
    handler::{run_isolated, Handler, HandlerSet},
    logger::Logger,
    metrics::LoggerMetrics,
};
use crate::handlers::{BufferedFileHandler, ConsoleHandler, FileHandler, RotatingFileHandler};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

/// Service name recorded by loggers obtained before `initialize`
pub const UNINITIALIZED_SERVICE: &str = "unknown";

struct RegistryState {
    config: Option<Arc<Config>>,
    handlers: HandlerSet,
    loggers: HashMap<String, Logger>,
    metrics: Arc<LoggerMetrics>,
}

impl RegistryState {
    fn empty() -> Self {
        Self {
            config: None,
            handlers: Arc::new(Vec::new()),
            loggers: HashMap::new(),
            metrics: Arc::new(LoggerMetrics::new()),
        }
    }
}

pub struct Registry {
    state: Mutex<RegistryState>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RegistryState::empty()),
        }
    }

    /// Start a new epoch from `config`.
    ///
    /// On failure the previous epoch stays active and no handler built for
    /// the rejected config is kept.
    pub fn initialize(&self, config: Config) -> Result<()> {
        self.initialize_with_handlers(config, Vec::new())
    }

    /// Like [`Registry::initialize`], with `extra` handlers appended after
    /// the configured console and file sinks
    pub fn initialize_with_handlers(&self, config: Config, extra: Vec<Arc<dyn Handler>>) -> Result<()> {
        config.validate()?;

        let previous = {
            let mut state = self.state.lock();

            let mut handlers = build_handlers(&config)?;
            handlers.extend(extra);

            let previous = std::mem::replace(&mut state.handlers, Arc::new(handlers));
            state.config = Some(Arc::new(config));
            state.loggers.clear();
            state.metrics = Arc::new(LoggerMetrics::new());
            previous
        };

        // Loggers from the old epoch may still write to these
        flush_all(&previous);
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.state.lock().config.is_some()
    }

    /// Active config snapshot, if initialized
    pub fn config(&self) -> Option<Arc<Config>> {
        self.state.lock().config.clone()
    }

    /// Metrics shared by every logger of the current epoch
    pub fn metrics(&self) -> Arc<LoggerMetrics> {
        Arc::clone(&self.state.lock().metrics)
    }

    pub fn handler_count(&self) -> usize {
        self.state.lock().handlers.len()
    }

    /// Cached logger for `name`, created on first use.
    ///
    /// Before `initialize` the logger has service name `unknown`, the
    /// default level and no handlers.
    pub fn get_logger(&self, name: &str) -> Logger {
        let mut state = self.state.lock();
        if let Some(logger) = state.loggers.get(name) {
            return logger.clone();
        }

        let config = match state.config {
            Some(ref config) => Arc::clone(config),
            None => Arc::new(Config::new(UNINITIALIZED_SERVICE).with_console(false).with_file(false)),
        };
        let logger = Logger::from_parts(
            name,
            config,
            Arc::clone(&state.handlers),
            Arc::clone(&state.metrics),
        );
        state.loggers.insert(name.to_string(), logger.clone());
        logger
    }

    /// Flush every handler of the current epoch. Best effort.
    pub fn flush(&self) {
        let handlers = Arc::clone(&self.state.lock().handlers);
        flush_all(&handlers);
    }

    /// Flush and close every handler and forget the epoch.
    ///
    /// Logging afterwards requires a new `initialize`; loggers still held
    /// by callers write to closed handlers, which reject or reopen per
    /// handler type.
    pub fn shutdown(&self) {
        let previous = {
            let mut state = self.state.lock();
            std::mem::replace(&mut *state, RegistryState::empty())
        };

        for handler in previous.handlers.iter() {
            run_isolated(handler.as_ref(), "flush", || handler.flush());
            run_isolated(handler.as_ref(), "close", || handler.close());
        }

        let dropped = previous.metrics.dropped_count();
        if dropped > 0 {
            eprintln!(
                "[LOGGER WARNING] Logger shutting down with {} dropped entries (drop rate: {:.2}%)",
                dropped,
                previous.metrics.drop_rate()
            );
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

fn flush_all(handlers: &HandlerSet) {
    for handler in handlers.iter() {
        run_isolated(handler.as_ref(), "flush", || handler.flush());
    }
}

/// Handlers for the sinks `config` enables, console first
fn build_handlers(config: &Config) -> Result<Vec<Arc<dyn Handler>>> {
    let mut handlers: Vec<Arc<dyn Handler>> = Vec::new();

    if config.console.enabled {
        handlers.push(Arc::new(
            ConsoleHandler::new(config.console.format).with_colors(config.console.colors),
        ));
    }

    if config.file.enabled {
        let path = config.file.path.clone();
        let init_error = |handler: &str, e: LoggerError| {
            LoggerError::initialization(handler, format!("cannot open '{}': {}", path.display(), e))
        };

        let handler: Arc<dyn Handler> = match config.file.mode {
            FileMode::Plain => {
                Arc::new(FileHandler::new(path.clone()).map_err(|e| init_error("file", e))?)
            }
            FileMode::Rotating => Arc::new(
                RotatingFileHandler::new(
                    path.clone(),
                    config.max_file_size_bytes(),
                    config.file.max_backup_count,
                )
                .map_err(|e| init_error("rotating_file", e))?,
            ),
            FileMode::Buffered => Arc::new(
                BufferedFileHandler::new(path.clone(), config.file.buffer_size, config.flush_interval())
                    .map_err(|e| init_error("buffered_file", e))?,
            ),
        };
        handlers.push(handler);
    }

    Ok(handlers)
}

static GLOBAL: OnceLock<Registry> = OnceLock::new();

/// The process-wide registry
pub fn global() -> &'static Registry {
    GLOBAL.get_or_init(Registry::new)
}

/// Initialize the process-wide registry.
///
/// This is the only logging call that reports failure to the application.
///
/// # Example
///
/// ```no_run
/// use rust_structured_logger::{get_logger, initialize, shutdown, Config};
///
/// initialize(Config::new("order-gateway").with_file_path("/var/log/gateway/app.log"))?;
/// get_logger("http").info("listening");
/// shutdown();
/// # Ok::<(), rust_structured_logger::LoggerError>(())
/// ```
pub fn initialize(config: Config) -> Result<()> {
    global().initialize(config)
}

pub fn get_logger(name: &str) -> Logger {
    global().get_logger(name)
}

pub fn flush() {
    global().flush()
}

pub fn shutdown() {
    global().shutdown()
}
