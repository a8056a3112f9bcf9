//! Error types for the logger system
//!
//! Only [`LoggerError::Initialization`] and [`LoggerError::InvalidConfiguration`]
//! ever reach application code (through `initialize`). Every other variant is
//! produced at a handler boundary and contained by the dispatch loop.

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// A configured sink could not be created while initializing
    #[error("Failed to initialize {handler} handler: {message}")]
    Initialization { handler: String, message: String },

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// File handler error with path
    #[error("File handler error for '{path}': {message}")]
    FileHandlerError { path: String, message: String },

    /// File rotation error
    #[error("File rotation failed for '{path}': {message}")]
    FileRotationError { path: String, message: String },

    /// Write attempted after the handler was torn down
    #[error("Handler '{handler}' is closed")]
    HandlerClosed { handler: String },

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl LoggerError {
    /// Create an initialization error for the named handler
    pub fn initialization(handler: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::Initialization {
            handler: handler.into(),
            message: message.into(),
        }
    }

    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a file handler error
    pub fn file_handler(path: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FileHandlerError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a file rotation error
    pub fn file_rotation(path: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FileRotationError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a closed-handler error
    pub fn handler_closed(handler: impl Into<String>) -> Self {
        LoggerError::HandlerClosed {
            handler: handler.into(),
        }
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        LoggerError::Other(msg.into())
    }

    /// True for errors that `initialize` surfaces to its caller
    pub fn is_initialization(&self) -> bool {
        matches!(
            self,
            LoggerError::Initialization { .. } | LoggerError::InvalidConfiguration { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = LoggerError::initialization("file", "Permission denied");
        assert!(matches!(err, LoggerError::Initialization { .. }));
        assert!(err.is_initialization());

        let err = LoggerError::config("FileConfig", "max_file_size_mb must be positive");
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
        assert!(err.is_initialization());

        let err = LoggerError::file_handler("/var/log/app.log", "Permission denied");
        assert!(matches!(err, LoggerError::FileHandlerError { .. }));
        assert!(!err.is_initialization());
    }

    #[test]
    fn test_error_display() {
        let err = LoggerError::initialization("file", "cannot open '/nope/app.log'");
        assert_eq!(
            err.to_string(),
            "Failed to initialize file handler: cannot open '/nope/app.log'"
        );

        let err = LoggerError::file_rotation("/var/log/app.log", "Disk full");
        assert_eq!(
            err.to_string(),
            "File rotation failed for '/var/log/app.log': Disk full"
        );

        let err = LoggerError::handler_closed("buffered_file");
        assert_eq!(err.to_string(), "Handler 'buffered_file' is closed");
    }

    #[test]
    fn test_io_operation_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = LoggerError::io_operation("writing log file", "cannot write to file", io_err);

        assert!(matches!(err, LoggerError::IoOperation { .. }));
        assert!(err.to_string().contains("writing log file"));
        assert!(err.to_string().contains("cannot write to file"));
    }
}
