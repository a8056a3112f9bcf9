//! Core logger types and traits

pub mod config;
pub mod error;
pub mod handler;
pub mod log_context;
pub mod log_entry;
pub mod log_level;
pub mod logger;
pub mod metrics;
pub mod output_format;
pub mod registry;
pub mod source_location;
pub mod timer;

pub use config::{Config, ConsoleConfig, FileConfig, FileMode};
pub use error::{LoggerError, Result};
pub use handler::{Handler, HandlerSet};
pub use log_context::{FieldValue, LogContext};
pub use log_entry::{ExceptionInfo, LogEntry};
pub use log_level::LogLevel;
pub use logger::{Logger, LoggerBuilder};
pub use metrics::LoggerMetrics;
pub use output_format::OutputFormat;
pub use registry::Registry;
pub use source_location::SourceLocation;
pub use timer::Timer;
