//! # Rust Structured Logger
//!
//! Structured, leveled logging for latency-sensitive services.
//!
//! ## Features
//!
//! - **Structured**: every entry carries key/value context and its source location
//! - **Never fails the caller**: handler errors and panics are contained and reported on stderr
//! - **Size-based rotation** with numbered backups and graceful degradation
//! - **Double-buffered file writer** that keeps disk I/O off the calling thread
//! - **Scoped timers** that log the duration of an operation
//!
//! ## Quick start
//!
//! ```no_run
//! use rust_structured_logger::prelude::*;
//! use rust_structured_logger::{info, timer};
//!
//! rust_structured_logger::initialize(
//!     Config::new("order-gateway")
//!         .with_file_path("/var/log/order-gateway/app.log")
//!         .with_file_mode(FileMode::Buffered),
//! )?;
//!
//! let logger = rust_structured_logger::get_logger("http")
//!     .with_context(LogContext::new().with_field("region", "eu-west-1"));
//!
//! info!(logger, "listening on port {}", 8080);
//! {
//!     let _t = timer!(logger, "warm_cache");
//! }
//!
//! rust_structured_logger::shutdown();
//! # Ok::<(), LoggerError>(())
//! ```

pub mod core;
pub mod handlers;
pub mod macros;

pub mod prelude {
    pub use crate::core::{
        Config, ExceptionInfo, FieldValue, FileMode, Handler, LogContext, LogEntry, LogLevel,
        Logger, LoggerBuilder, LoggerError, LoggerMetrics, OutputFormat, Result, SourceLocation,
        Timer,
    };
}

pub use crate::core::registry::{flush, get_logger, global, initialize, shutdown};
pub use crate::core::{
    Config, ConsoleConfig, ExceptionInfo, FieldValue, FileConfig, FileMode, Handler, HandlerSet,
    LogContext, LogEntry, LogLevel, Logger, LoggerBuilder, LoggerError, LoggerMetrics,
    OutputFormat, Registry, Result, SourceLocation, Timer,
};
pub use handlers::{BufferedFileHandler, ConsoleHandler, FileHandler, RotatingFileHandler};
