//! Output format for log entries
//!
//! Formatting is a pure function of an entry. Neither format appends a line
//! terminator; handlers add their own.
//! - Json: one object per entry, for machine processing (default)
//! - Text: human-readable single line

use super::log_context::LogContext;
use super::log_entry::{ExceptionInfo, LogEntry};
use super::error::Result;
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::str::FromStr;

/// ISO 8601, UTC, microseconds, `Z` suffix
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

const TEXT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Output format for log entries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Example: `{"timestamp":"2025-01-08T10:30:45.123456Z","level":"INFO",...}`
    #[default]
    Json,

    /// Example: `[2025-01-08 10:30:45.123456] [INFO] [billing] Request processed (user=42)`
    Text,
}

/// Serialized shape of an entry; field order is the on-disk order
#[derive(Serialize)]
struct JsonRecord<'a> {
    timestamp: String,
    level: &'static str,
    message: &'a str,
    service: &'a str,
    environment: &'a str,
    version: &'a str,
    logger_name: &'a str,
    file: &'a str,
    line: u32,
    function: &'a str,
    #[serde(skip_serializing_if = "is_empty_context")]
    context: &'a LogContext,
    #[serde(skip_serializing_if = "Option::is_none")]
    exception: Option<&'a ExceptionInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_ms: Option<f64>,
}

fn is_empty_context(context: &&LogContext) -> bool {
    context.is_empty()
}

impl OutputFormat {
    /// Format a log entry according to this output format
    pub fn format(&self, entry: &LogEntry) -> Result<String> {
        match self {
            OutputFormat::Json => Self::format_json(entry),
            OutputFormat::Text => Ok(Self::format_text(entry)),
        }
    }

    fn format_json(entry: &LogEntry) -> Result<String> {
        let record = JsonRecord {
            timestamp: entry.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            level: entry.level.to_str(),
            message: &entry.message,
            service: &entry.service_name,
            environment: &entry.environment,
            version: &entry.version,
            logger_name: &entry.logger_name,
            file: &entry.location.file,
            line: entry.location.line,
            function: &entry.location.function,
            context: &entry.context,
            exception: entry.exception.as_ref(),
            duration_ms: entry.duration_ms,
        };

        Ok(serde_json::to_string(&record)?)
    }

    fn format_text(entry: &LogEntry) -> String {
        let local = entry.timestamp.with_timezone(&Local);
        let mut out = format!(
            "[{}] [{}] [{}] {}",
            local.format(TEXT_TIMESTAMP_FORMAT),
            entry.level.to_str(),
            entry.service_name,
            sanitize_message(&entry.message)
        );

        if !entry.context.is_empty() {
            let _ = write!(out, " ({})", sanitize_message(&entry.context.format_fields()));
        }
        if let Some(duration) = entry.duration_ms {
            let _ = write!(out, " [{:.3}ms]", duration);
        }
        if let Some(ref exception) = entry.exception {
            let _ = write!(
                out,
                " [{}: {}]",
                exception.kind,
                sanitize_message(&exception.message)
            );
        }

        out
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "text" => Ok(OutputFormat::Text),
            _ => Err(format!("Invalid output format: '{}'", s)),
        }
    }
}

/// Escape line breaks and tabs so one entry stays on one line
fn sanitize_message(message: &str) -> String {
    message
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}
