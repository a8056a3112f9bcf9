//! Source location attached to every log entry

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Recorded when the enclosing function cannot be determined
pub const UNKNOWN_FUNCTION: &str = "<unknown>";

/// File, line and function of a logging call.
///
/// All three fields are always present. `file` holds the basename only.
/// Prefer the [`location!`](crate::location) macro, which fills in all three
/// from the call site.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: Cow<'static, str>,
    pub line: u32,
    pub function: Cow<'static, str>,
}

impl SourceLocation {
    /// Build a location from a (possibly full) path, stripping directories
    pub fn new(
        file: impl Into<Cow<'static, str>>,
        line: u32,
        function: impl Into<Cow<'static, str>>,
    ) -> Self {
        let file = match file.into() {
            Cow::Borrowed(path) => Cow::Borrowed(basename(path)),
            Cow::Owned(path) => Cow::Owned(basename(&path).to_string()),
        };

        let mut function = function.into();
        if function.is_empty() {
            function = Cow::Borrowed(UNKNOWN_FUNCTION);
        }

        Self {
            file,
            line,
            function,
        }
    }

    /// Location of the caller, through `#[track_caller]` frames.
    ///
    /// File and line are exact; the function is recorded as `<unknown>`.
    /// [`location!`](crate::location) captures the function as well.
    #[track_caller]
    pub fn caller() -> Self {
        let location = std::panic::Location::caller();
        Self::new(location.file(), location.line(), UNKNOWN_FUNCTION)
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} ({})", self.file, self.line, self.function)
    }
}

/// Strip everything up to the last `/` or `\`
pub fn basename(path: &str) -> &str {
    path.rfind(['/', '\\'])
        .map_or(path, |pos| &path[pos + 1..])
}

/// Trim the helper suffixes `function_name!` leaves on a type name
#[doc(hidden)]
pub fn trim_function_path(raw: &'static str) -> &'static str {
    let mut name = raw.strip_suffix("::__here").unwrap_or(raw);
    while let Some(stripped) = name.strip_suffix("::{{closure}}") {
        name = stripped;
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basename_strips_directories() {
        assert_eq!(basename("src/core/logger.rs"), "logger.rs");
        assert_eq!(basename(r"C:\work\src\main.rs"), "main.rs");
        assert_eq!(basename("main.rs"), "main.rs");
    }

    #[test]
    fn test_new_normalizes_fields() {
        let loc = SourceLocation::new(String::from("/a/b/c.rs"), 7, "");
        assert_eq!(loc.file, "c.rs");
        assert_eq!(loc.line, 7);
        assert_eq!(loc.function, UNKNOWN_FUNCTION);
    }

    #[test]
    fn test_caller_points_here() {
        let line = line!() + 1;
        let loc = SourceLocation::caller();
        assert_eq!(loc.file, "source_location.rs");
        assert_eq!(loc.line, line);
    }

    #[test]
    fn test_trim_function_path() {
        assert_eq!(trim_function_path("app::handle::__here"), "app::handle");
        assert_eq!(
            trim_function_path("app::handle::{{closure}}::{{closure}}::__here"),
            "app::handle"
        );
    }
}
