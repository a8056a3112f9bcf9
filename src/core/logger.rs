//! Main logger implementation

use super::{
    config::Config,
    handler::{panic_message, run_isolated, Handler, HandlerSet},
    log_context::LogContext,
    log_entry::{ExceptionInfo, LogEntry},
    log_level::LogLevel,
    metrics::LoggerMetrics,
    source_location::SourceLocation,
    timer::Timer,
};
use std::sync::Arc;

/// Named logging facade.
///
/// A `Logger` owns its name and bound context and shares the config snapshot,
/// handler set and metrics of the epoch it was created in. Cloning is cheap.
/// Loggers keep working against their own epoch's handlers after the
/// registry is re-initialized.
#[derive(Clone)]
pub struct Logger {
    name: String,
    config: Arc<Config>,
    context: LogContext,
    handlers: HandlerSet,
    metrics: Arc<LoggerMetrics>,
}

impl Logger {
    pub(crate) fn from_parts(
        name: impl Into<String>,
        config: Arc<Config>,
        handlers: HandlerSet,
        metrics: Arc<LoggerMetrics>,
    ) -> Self {
        Self {
            name: name.into(),
            config,
            context: LogContext::new(),
            handlers,
            metrics,
        }
    }

    /// Create a builder for a registry-free logger
    ///
    /// # Example
    /// ```
    /// use rust_structured_logger::prelude::*;
    ///
    /// let logger = Logger::builder()
    ///     .name("payments")
    ///     .config(Config::new("payments").with_level(LogLevel::Debug))
    ///     .build();
    /// assert!(logger.is_enabled(LogLevel::Debug));
    /// ```
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Bound context carried by this logger
    pub fn context(&self) -> &LogContext {
        &self.context
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }

    #[inline]
    pub fn is_enabled(&self, level: LogLevel) -> bool {
        level >= self.config.level
    }

    /// Filter, compose context, build the entry and fan it out.
    ///
    /// Never fails: handler errors and panics are reported on stderr and
    /// counted in [`LoggerMetrics`].
    pub fn log(
        &self,
        level: LogLevel,
        message: impl Into<String>,
        context: LogContext,
        location: SourceLocation,
        exception: Option<ExceptionInfo>,
    ) {
        if !self.is_enabled(level) {
            return;
        }

        let context = LogContext::compose(&self.config.default_context, &self.context, context);
        let mut entry = self.entry(level, message, location).with_context(context);
        entry.exception = exception;

        self.dispatch(&entry);
    }

    /// Log with call-site context; the location is the caller's file and line.
    ///
    /// Method calls cannot see the enclosing function, so it is recorded as
    /// `<unknown>`. The [`log!`](crate::log) family of macros records all
    /// three location fields and skips formatting for filtered levels.
    #[track_caller]
    pub fn log_with_context(&self, level: LogLevel, message: impl Into<String>, context: LogContext) {
        if !self.is_enabled(level) {
            return;
        }
        self.log(level, message, context, SourceLocation::caller(), None);
    }

    #[inline]
    #[track_caller]
    pub fn debug(&self, message: impl Into<String>) {
        self.log_with_context(LogLevel::Debug, message, LogContext::new());
    }

    /// Info-level entry. Records `<unknown>` as the function; use
    /// [`info!`](crate::info) to capture it.
    #[inline]
    #[track_caller]
    pub fn info(&self, message: impl Into<String>) {
        self.log_with_context(LogLevel::Info, message, LogContext::new());
    }

    #[inline]
    #[track_caller]
    pub fn warning(&self, message: impl Into<String>) {
        self.log_with_context(LogLevel::Warning, message, LogContext::new());
    }

    #[inline]
    #[track_caller]
    pub fn error(&self, message: impl Into<String>) {
        self.log_with_context(LogLevel::Error, message, LogContext::new());
    }

    #[inline]
    #[track_caller]
    pub fn critical(&self, message: impl Into<String>) {
        self.log_with_context(LogLevel::Critical, message, LogContext::new());
    }

    /// Error-level entry carrying the error's type name and message.
    ///
    /// Like the other methods, the function is recorded as `<unknown>`.
    #[track_caller]
    pub fn error_with_exception<E>(&self, message: impl Into<String>, error: &E, context: LogContext)
    where
        E: std::error::Error + ?Sized,
    {
        if !self.is_enabled(LogLevel::Error) {
            return;
        }
        self.log(
            LogLevel::Error,
            message,
            context,
            SourceLocation::caller(),
            Some(ExceptionInfo::from_error(error)),
        );
    }

    /// Child logger with `additional` overlaid on the bound context.
    ///
    /// The child shares this logger's name, config and handlers.
    #[must_use]
    pub fn with_context(&self, additional: LogContext) -> Logger {
        Logger {
            name: self.name.clone(),
            config: Arc::clone(&self.config),
            context: self.context.merged(&additional),
            handlers: Arc::clone(&self.handlers),
            metrics: Arc::clone(&self.metrics),
        }
    }

    /// Start a scoped timer; its entry carries the context composed now
    #[must_use = "dropping a Timer immediately records a near-zero duration"]
    pub fn timer(
        &self,
        operation: impl Into<String>,
        context: LogContext,
        location: SourceLocation,
    ) -> Timer {
        let context = LogContext::compose(&self.config.default_context, &self.context, context);
        Timer::start(self.clone(), operation.into(), context, location)
    }

    /// Flush every handler of this logger's epoch
    pub fn flush(&self) {
        for handler in self.handlers.iter() {
            run_isolated(handler.as_ref(), "flush", || handler.flush());
        }
    }

    pub(crate) fn entry(
        &self,
        level: LogLevel,
        message: impl Into<String>,
        location: SourceLocation,
    ) -> LogEntry {
        LogEntry::new(level, message, location)
            .with_logger_name(self.name.as_str())
            .with_service_metadata(&self.config)
    }

    /// Hand an entry to every handler with per-handler isolation
    pub(crate) fn dispatch(&self, entry: &LogEntry) {
        let mut has_error = false;

        for handler in self.handlers.iter() {
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| handler.write(entry)));

            match result {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    eprintln!("[LOGGER ERROR] Handler '{}' failed: {}", handler.name(), e);
                    self.metrics.record_handler_failure();
                    has_error = true;
                }
                Err(panic_info) => {
                    eprintln!(
                        "[LOGGER CRITICAL] Handler '{}' panicked: {}. \
                         Other handlers continue to function.",
                        handler.name(),
                        panic_message(panic_info.as_ref())
                    );
                    self.metrics.record_handler_panic();
                    has_error = true;
                }
            }
        }

        if has_error {
            self.metrics.record_dropped();
        } else {
            self.metrics.record_logged();
        }
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("level", &self.config.level)
            .field("context", &self.context)
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

/// Builder for constructing a Logger outside the registry
///
/// # Example
/// ```
/// use rust_structured_logger::prelude::*;
/// use rust_structured_logger::handlers::ConsoleHandler;
///
/// let logger = Logger::builder()
///     .name("api")
///     .config(Config::new("gateway").with_file(false))
///     .handler(ConsoleHandler::new(OutputFormat::Text))
///     .context(LogContext::new().with_field("region", "eu-west-1"))
///     .build();
/// assert_eq!(logger.name(), "api");
/// ```
pub struct LoggerBuilder {
    name: String,
    config: Config,
    handlers: Vec<Arc<dyn Handler>>,
    context: LogContext,
}

impl LoggerBuilder {
    pub fn new() -> Self {
        Self {
            name: "root".to_string(),
            config: Config::default(),
            handlers: Vec::new(),
            context: LogContext::new(),
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Config snapshot; the builder never creates handlers from it
    #[must_use = "builder methods return a new value"]
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn handler<H: Handler + 'static>(mut self, handler: H) -> Self {
        self.handlers.push(Arc::new(handler));
        self
    }

    /// Add a handler that the caller keeps a reference to
    #[must_use = "builder methods return a new value"]
    pub fn shared_handler(mut self, handler: Arc<dyn Handler>) -> Self {
        self.handlers.push(handler);
        self
    }

    /// Bound context of the built logger
    #[must_use = "builder methods return a new value"]
    pub fn context(mut self, context: LogContext) -> Self {
        self.context = context;
        self
    }

    pub fn build(self) -> Logger {
        let mut logger = Logger::from_parts(
            self.name,
            Arc::new(self.config),
            Arc::new(self.handlers),
            Arc::new(LoggerMetrics::new()),
        );
        logger.context = self.context;
        logger
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
