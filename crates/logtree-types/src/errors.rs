//! Error types for logtree operations.

use thiserror::Error;

/// The main error type for logtree operations.
///
/// Emission itself never fails; these errors surface from the fallible
/// edges of the library: building sinks, writing to them, and loading
/// configuration.
#[derive(Error, Debug)]
pub enum LogtreeError {
    /// Configuration-related error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A sink could not deliver an event
    #[error("Sink error: {0}")]
    Sink(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Internal bug - should never happen in production
    #[error(
        "Bug detected: {0}\n\nThis is an internal error. Please report this issue at:\n\
         https://github.com/logtree/logtree/issues"
    )]
    Bug(String),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

/// A specialized Result type for logtree operations.
pub type Result<T> = std::result::Result<T, LogtreeError>;

/// Helper macro to create and return a LogtreeError::Bug
///
/// This should be used for conditions that should never occur
/// in normal operation and indicate a bug in logtree itself.
///
/// # Example
///
/// ```ignore
/// if some_impossible_condition {
///     bug!("This should never happen: {:?}", condition);
/// }
/// ```
#[macro_export]
macro_rules! bug {
    ($msg:expr) => {
        return Err($crate::LogtreeError::Bug($msg.to_string()))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::LogtreeError::Bug(format!($fmt, $($arg)*)))
    };
}

/// Helper macro to bail out with a LogtreeError
///
/// This is used for expected error conditions.
///
/// # Example
///
/// ```ignore
/// if !known {
///     bail!(Config, "unknown sink '{}'", name);
/// }
/// ```
#[macro_export]
macro_rules! bail {
    ($variant:ident, $msg:expr) => {
        return Err($crate::LogtreeError::$variant($msg.to_string()))
    };
    ($variant:ident, $fmt:expr, $($arg:tt)*) => {
        return Err($crate::LogtreeError::$variant(format!($fmt, $($arg)*)))
    };
    ($msg:expr) => {
        return Err($crate::LogtreeError::Other($msg.to_string()))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::LogtreeError::Other(format!($fmt, $($arg)*)))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reject(name: &str) -> Result<()> {
        bail!(Config, "unknown sink '{}'", name);
    }

    #[test]
    fn test_bail_builds_variant() {
        let err = reject("console").unwrap_err();
        assert!(matches!(err, LogtreeError::Config(_)));
        assert_eq!(err.to_string(), "Configuration error: unknown sink 'console'");
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err: LogtreeError = io.into();
        assert_eq!(err.to_string(), "IO error: pipe closed");
    }
}
