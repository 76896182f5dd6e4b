//! Error handling for the window engine

use thiserror::Error;

/// Main error type for window evaluation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WindowError {
    /// A ranking function was invoked on a window without ORDER BY
    #[error("Missing ordering: {0}")]
    MissingOrdering(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A caller supplied extractor failed or produced an unusable value
    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Numeric overflow: {0}")]
    Overflow(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for WindowError {
    fn from(err: serde_json::Error) -> Self {
        WindowError::Config(err.to_string())
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, WindowError>;

/// Result type alias for window operations (alias for Result)
pub type WindowResult<T> = std::result::Result<T, WindowError>;

/// Macro for creating internal errors
#[macro_export]
macro_rules! internal_err {
    ($msg:expr) => {
        $crate::common::error::WindowError::Internal($msg.to_string())
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::common::error::WindowError::Internal(format!($fmt, $($arg)*))
    };
}
