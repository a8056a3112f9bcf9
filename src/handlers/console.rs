//! Console handler implementation

use crate::core::{Handler, LogEntry, LogLevel, OutputFormat, Result};
#[cfg(feature = "console")]
use colored::Colorize;
use std::io::Write;

/// Standard stream an entry is written to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleStream {
    Stdout,
    Stderr,
}

impl ConsoleStream {
    /// Error and Critical go to stderr, everything else to stdout
    pub fn for_level(level: LogLevel) -> Self {
        if level.is_error() {
            ConsoleStream::Stderr
        } else {
            ConsoleStream::Stdout
        }
    }
}

/// Writes entries to stdout, or to stderr for Error and Critical
pub struct ConsoleHandler {
    format: OutputFormat,
    use_colors: bool,
}

impl ConsoleHandler {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            use_colors: false,
        }
    }

    /// Colorize the level in text output. Has no effect on JSON, or without
    /// the `console` feature.
    #[must_use]
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    fn render(&self, entry: &LogEntry) -> Result<String> {
        let output = self.format.format(entry)?;

        #[cfg(feature = "console")]
        if self.use_colors && self.format == OutputFormat::Text {
            let plain = format!("[{}]", entry.level.to_str());
            let colored = format!("[{}]", entry.level.to_str().color(entry.level.color_code()));
            return Ok(output.replacen(&plain, &colored, 1));
        }

        Ok(output)
    }
}

impl Default for ConsoleHandler {
    fn default() -> Self {
        Self::new(OutputFormat::Json)
    }
}

impl Handler for ConsoleHandler {
    fn write(&self, entry: &LogEntry) -> Result<()> {
        let output = self.render(entry)?;

        match ConsoleStream::for_level(entry.level) {
            ConsoleStream::Stderr => writeln!(std::io::stderr().lock(), "{}", output)?,
            ConsoleStream::Stdout => writeln!(std::io::stdout().lock(), "{}", output)?,
        }
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        // Both streams may hold output
        std::io::stdout().flush()?;
        std::io::stderr().flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SourceLocation;

    fn entry(level: LogLevel) -> LogEntry {
        LogEntry::new(level, "console check", SourceLocation::new("main.rs", 3, "main"))
    }

    #[test]
    fn test_write_and_flush_succeed() {
        let handler = ConsoleHandler::new(OutputFormat::Text);
        assert!(handler.write(&entry(LogLevel::Info)).is_ok());
        assert!(handler.write(&entry(LogLevel::Critical)).is_ok());
        assert!(handler.flush().is_ok());
        assert_eq!(handler.name(), "console");
    }

    #[test]
    fn test_stream_follows_severity() {
        for level in LogLevel::ALL {
            let expected = match level {
                LogLevel::Error | LogLevel::Critical => ConsoleStream::Stderr,
                _ => ConsoleStream::Stdout,
            };
            assert_eq!(ConsoleStream::for_level(level), expected, "{}", level);
            assert_eq!(level.is_error(), expected == ConsoleStream::Stderr);
        }
    }

    #[test]
    fn test_render_without_colors_matches_formatter() {
        let handler = ConsoleHandler::new(OutputFormat::Text).with_colors(false);
        let e = entry(LogLevel::Warning);
        assert_eq!(handler.render(&e).unwrap(), OutputFormat::Text.format(&e).unwrap());
    }

    #[test]
    fn test_json_is_never_colored() {
        let handler = ConsoleHandler::new(OutputFormat::Json).with_colors(true);
        let rendered = handler.render(&entry(LogLevel::Error)).unwrap();
        assert!(serde_json::from_str::<serde_json::Value>(&rendered).is_ok());
    }
}
