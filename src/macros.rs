//! Logging macros that capture the call site.
//!
//! Every macro records the file, line and enclosing function of the call
//! and formats its message like `format!`. The message is not formatted at
//! all when the level is filtered out.
//!
//! # Examples
//!
//! ```
//! use rust_structured_logger::prelude::*;
//! use rust_structured_logger::{info, error};
//!
//! let logger = Logger::builder().config(Config::new("gateway")).build();
//!
//! info!(logger, "Server started");
//!
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port);
//!
//! // Call-site context goes first, terminated by `;`
//! let ctx = LogContext::new().with_field("order_id", 991);
//! error!(logger, ctx = ctx; "Order rejected: {}", "insufficient margin");
//! ```

/// [`SourceLocation`](crate::SourceLocation) of the macro call site
#[macro_export]
macro_rules! location {
    () => {
        $crate::SourceLocation::new(file!(), line!(), $crate::function_name!())
    };
}

/// Path of the enclosing function, e.g. `my_crate::orders::submit`
#[macro_export]
macro_rules! function_name {
    () => {{
        fn __here() {}
        fn type_name_of<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        $crate::core::source_location::trim_function_path(type_name_of(__here))
    }};
}

/// Log at an explicit level.
///
/// # Examples
///
/// ```
/// # use rust_structured_logger::prelude::*;
/// # let logger = Logger::builder().build();
/// use rust_structured_logger::log;
/// log!(logger, LogLevel::Info, "Simple message");
/// log!(logger, LogLevel::Error, "Error code: {}", 500);
/// log!(logger, LogLevel::Warning, ctx = LogContext::new().with_field("retry", 3); "Retrying");
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, ctx = $ctx:expr; $($arg:tt)+) => {{
        let logger = &$logger;
        let level = $level;
        if logger.is_enabled(level) {
            logger.log(level, format!($($arg)+), $ctx, $crate::location!(), None);
        }
    }};
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $crate::log!($logger, $level, ctx = $crate::LogContext::new(); $($arg)+)
    };
}

/// Log a debug-level message.
///
/// ```
/// # use rust_structured_logger::prelude::*;
/// # let logger = Logger::builder().config(Config::new("svc").with_level(LogLevel::Debug)).build();
/// use rust_structured_logger::debug;
/// debug!(logger, "Counter value: {}", 10);
/// ```
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Debug, $($arg)+)
    };
}

/// Log an info-level message.
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Info, $($arg)+)
    };
}

/// Log a warning-level message.
///
/// ```
/// # use rust_structured_logger::prelude::*;
/// # let logger = Logger::builder().build();
/// use rust_structured_logger::warning;
/// warning!(logger, "Retry attempt {} of {}", 3, 5);
/// ```
#[macro_export]
macro_rules! warning {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Warning, $($arg)+)
    };
}

/// Alias of [`warning!`]
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Warning, $($arg)+)
    };
}

/// Log an error-level message.
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Error, $($arg)+)
    };
}

/// Log a critical-level message.
#[macro_export]
macro_rules! critical {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Critical, $($arg)+)
    };
}

/// Start a [`Timer`](crate::Timer) at the call site.
///
/// ```
/// # use rust_structured_logger::prelude::*;
/// # let logger = Logger::builder().build();
/// use rust_structured_logger::timer;
/// {
///     let _t = timer!(logger, "rebuild_index");
/// }
/// let _t = timer!(logger, "load", LogContext::new().with_field("table", "fills"));
/// ```
#[macro_export]
macro_rules! timer {
    ($logger:expr, $operation:expr) => {
        $logger.timer($operation, $crate::LogContext::new(), $crate::location!())
    };
    ($logger:expr, $operation:expr, $ctx:expr) => {
        $logger.timer($operation, $ctx, $crate::location!())
    };
}
