//! Logging configuration
//!
//! A [`Config`] is an immutable snapshot once handed to `initialize`; every
//! logger of that epoch shares it through an `Arc`.

use super::error::{LoggerError, Result};
use super::log_context::LogContext;
use super::log_level::LogLevel;
use super::output_format::OutputFormat;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Which handler backs the file sink
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileMode {
    /// Single file, no rotation
    Plain,
    /// Size-based rotation with numbered backups
    #[default]
    Rotating,
    /// Double-buffered writes flushed by a background thread
    Buffered,
}

impl FromStr for FileMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "plain" => Ok(FileMode::Plain),
            "rotating" => Ok(FileMode::Rotating),
            "buffered" => Ok(FileMode::Buffered),
            _ => Err(format!("Invalid file mode: '{}'", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub enabled: bool,
    pub format: OutputFormat,
    /// Colorize the level in text output
    pub colors: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            format: OutputFormat::Json,
            colors: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub enabled: bool,
    pub path: PathBuf,
    pub mode: FileMode,
    /// Fractional values are allowed for small test files
    pub max_file_size_mb: f64,
    pub max_backup_count: usize,
    /// Front-buffer threshold for buffered mode
    pub buffer_size: usize,
    /// Periodic flush interval for buffered mode
    pub flush_interval_ms: u64,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: PathBuf::from("logs/app.log"),
            mode: FileMode::Rotating,
            max_file_size_mb: 100.0,
            max_backup_count: 5,
            buffer_size: 64 * 1024,
            flush_interval_ms: 100,
        }
    }
}

/// Logging configuration
///
/// # Example
///
/// ```
/// use rust_structured_logger::{Config, FileMode, LogLevel};
///
/// let config = Config::new("order-gateway")
///     .with_environment("production")
///     .with_level(LogLevel::Debug)
///     .with_file_path("/tmp/order-gateway/app.log")
///     .with_file_mode(FileMode::Buffered);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub service_name: String,
    pub environment: String,
    pub version: String,
    pub level: LogLevel,
    pub console: ConsoleConfig,
    pub file: FileConfig,
    /// Included in every entry; overridden by logger and call-site context
    pub default_context: LogContext,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_name: "unknown".to_string(),
            environment: "development".to_string(),
            version: "0.0.0".to_string(),
            level: LogLevel::Info,
            console: ConsoleConfig::default(),
            file: FileConfig::default(),
            default_context: LogContext::new(),
        }
    }
}

impl Config {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = environment.into();
        self
    }

    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    #[must_use]
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    #[must_use]
    pub fn with_console(mut self, enabled: bool) -> Self {
        self.console.enabled = enabled;
        self
    }

    #[must_use]
    pub fn with_console_format(mut self, format: OutputFormat) -> Self {
        self.console.format = format;
        self
    }

    #[must_use]
    pub fn with_file(mut self, enabled: bool) -> Self {
        self.file.enabled = enabled;
        self
    }

    /// Set the file path; also enables the file sink
    #[must_use]
    pub fn with_file_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.file.path = path.into();
        self.file.enabled = true;
        self
    }

    #[must_use]
    pub fn with_file_mode(mut self, mode: FileMode) -> Self {
        self.file.mode = mode;
        self
    }

    #[must_use]
    pub fn with_max_file_size_mb(mut self, size_mb: f64) -> Self {
        self.file.max_file_size_mb = size_mb;
        self
    }

    #[must_use]
    pub fn with_max_backup_count(mut self, count: usize) -> Self {
        self.file.max_backup_count = count;
        self
    }

    #[must_use]
    pub fn with_buffer_size(mut self, bytes: usize) -> Self {
        self.file.buffer_size = bytes;
        self
    }

    #[must_use]
    pub fn with_flush_interval(mut self, interval: Duration) -> Self {
        self.file.flush_interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        self
    }

    #[must_use]
    pub fn with_default_context(mut self, context: LogContext) -> Self {
        self.default_context = context;
        self
    }

    /// Rotation threshold in bytes
    pub fn max_file_size_bytes(&self) -> u64 {
        (self.file.max_file_size_mb * 1024.0 * 1024.0) as u64
    }

    pub fn flush_interval(&self) -> Duration {
        Duration::from_millis(self.file.flush_interval_ms)
    }

    /// Reject values no handler can work with
    pub fn validate(&self) -> Result<()> {
        if self.service_name.trim().is_empty() {
            return Err(LoggerError::config("Config", "service_name must not be empty"));
        }

        if self.file.enabled {
            let size = self.file.max_file_size_mb;
            if self.file.mode == FileMode::Rotating && (!size.is_finite() || size <= 0.0) {
                return Err(LoggerError::config(
                    "FileConfig",
                    format!("max_file_size_mb must be a positive number, got {}", size),
                ));
            }
            if self.file.mode == FileMode::Rotating && self.max_file_size_bytes() == 0 {
                return Err(LoggerError::config(
                    "FileConfig",
                    "max_file_size_mb is smaller than one byte",
                ));
            }
            if self.file.mode == FileMode::Buffered {
                if self.file.buffer_size == 0 {
                    return Err(LoggerError::config("FileConfig", "buffer_size must be non-zero"));
                }
                if self.file.flush_interval_ms == 0 {
                    return Err(LoggerError::config(
                        "FileConfig",
                        "flush_interval_ms must be non-zero",
                    ));
                }
            }
            if self.file.path.as_os_str().is_empty() {
                return Err(LoggerError::config("FileConfig", "path must not be empty"));
            }
        }

        Ok(())
    }

    /// Build a config from `LOG_*` environment variables.
    ///
    /// Unset variables keep their defaults; unparsable ones are rejected.
    pub fn from_env(service_name: impl Into<String>) -> Result<Self> {
        Self::from_lookup(service_name, |key| std::env::var(key).ok())
    }

    /// Same as [`Config::from_env`] with an injectable variable source
    pub fn from_lookup<F>(service_name: impl Into<String>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::new(service_name);

        if let Some(value) = lookup("LOG_ENVIRONMENT") {
            config.environment = value;
        }
        if let Some(value) = lookup("LOG_VERSION") {
            config.version = value;
        }
        if let Some(value) = lookup("LOG_LEVEL") {
            config.level = parse_var("LOG_LEVEL", &value)?;
        }
        if let Some(value) = lookup("LOG_CONSOLE_ENABLED") {
            config.console.enabled = parse_bool("LOG_CONSOLE_ENABLED", &value)?;
        }
        if let Some(value) = lookup("LOG_CONSOLE_FORMAT") {
            config.console.format = parse_var("LOG_CONSOLE_FORMAT", &value)?;
        }
        if let Some(value) = lookup("LOG_CONSOLE_COLORS") {
            config.console.colors = parse_bool("LOG_CONSOLE_COLORS", &value)?;
        }
        if let Some(value) = lookup("LOG_FILE_ENABLED") {
            config.file.enabled = parse_bool("LOG_FILE_ENABLED", &value)?;
        }
        if let Some(value) = lookup("LOG_FILE_PATH") {
            config.file.path = PathBuf::from(value);
        }
        if let Some(value) = lookup("LOG_FILE_MODE") {
            config.file.mode = parse_var("LOG_FILE_MODE", &value)?;
        }
        if let Some(value) = lookup("LOG_MAX_FILE_SIZE_MB") {
            config.file.max_file_size_mb = parse_var("LOG_MAX_FILE_SIZE_MB", &value)?;
        }
        if let Some(value) = lookup("LOG_MAX_BACKUP_COUNT") {
            config.file.max_backup_count = parse_var("LOG_MAX_BACKUP_COUNT", &value)?;
        }
        if let Some(value) = lookup("LOG_BUFFER_SIZE") {
            config.file.buffer_size = parse_var("LOG_BUFFER_SIZE", &value)?;
        }
        if let Some(value) = lookup("LOG_FLUSH_INTERVAL_MS") {
            config.file.flush_interval_ms = parse_var("LOG_FLUSH_INTERVAL_MS", &value)?;
        }

        Ok(config)
    }
}

fn parse_var<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| LoggerError::config(key, format!("cannot parse '{}': {}", value, e)))
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(LoggerError::config(
            key,
            format!("expected a boolean, got '{}'", value),
        )),
    }
}
