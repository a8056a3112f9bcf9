//! Log entry structure

use super::config::Config;
use super::log_context::LogContext;
use super::log_level::LogLevel;
use super::source_location::SourceLocation;
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// Error details recorded on an entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExceptionInfo {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
}

impl ExceptionInfo {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// Record the concrete type name and display text of an error
    pub fn from_error<E>(error: &E) -> Self
    where
        E: std::error::Error + ?Sized,
    {
        Self {
            kind: std::any::type_name::<E>().to_string(),
            message: error.to_string(),
        }
    }
}

/// One logged event.
///
/// Handlers receive entries by shared reference only, so an entry is never
/// modified once dispatch starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
    pub logger_name: String,
    pub location: SourceLocation,
    pub context: LogContext,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exception: Option<ExceptionInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<f64>,
    pub service_name: String,
    pub environment: String,
    pub version: String,
}

impl LogEntry {
    /// Create an entry stamped with the current UTC time at microsecond resolution
    pub fn new(level: LogLevel, message: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            timestamp: Utc::now().trunc_subsecs(6),
            level,
            message: message.into(),
            logger_name: String::new(),
            location,
            context: LogContext::new(),
            exception: None,
            duration_ms: None,
            service_name: String::new(),
            environment: String::new(),
            version: String::new(),
        }
    }

    #[must_use]
    pub fn with_logger_name(mut self, name: impl Into<String>) -> Self {
        self.logger_name = name.into();
        self
    }

    #[must_use]
    pub fn with_context(mut self, context: LogContext) -> Self {
        self.context = context;
        self
    }

    #[must_use]
    pub fn with_exception(mut self, exception: ExceptionInfo) -> Self {
        self.exception = Some(exception);
        self
    }

    #[must_use]
    pub fn with_duration_ms(mut self, duration_ms: f64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    /// Copy service, environment and version from the active config
    #[must_use]
    pub fn with_service_metadata(mut self, config: &Config) -> Self {
        self.service_name = config.service_name.clone();
        self.environment = config.environment.clone();
        self.version = config.version.clone();
        self
    }
}
