//! Unified error type for the mcaixi agent.
//!
//! Errors carry a stable numeric code grouped by category so that failures
//! can be classified without parsing messages:
//! - 10-19: configuration
//! - 20-29: protocol (environment channel)
//! - 30-39: search
//! - 60-69: I/O and serialization

use thiserror::Error;

/// Result type alias for mcaixi operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// CLI options and invalid option combinations.
    Config,
    /// Malformed traffic on the environment channel.
    Protocol,
    /// Planner failures (node pool exhaustion).
    Search,
    /// File I/O and agent serialization.
    Io,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Config => write!(f, "config"),
            ErrorCategory::Protocol => write!(f, "protocol"),
            ErrorCategory::Search => write!(f, "search"),
            ErrorCategory::Io => write!(f, "io"),
        }
    }
}

/// Unified error type.
#[derive(Debug, Error)]
pub enum Error {
    // Configuration errors (10-19)
    #[error("configuration error: {0}")]
    Config(String),

    // Protocol errors (20-29)
    //
    // The environment is trusted; a malformed percept aborts the session.
    #[error("malformed percept: {0:?}")]
    BadPercept(String),

    // Search errors (30-39)
    #[error("search error: {0}")]
    Search(String),

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("binary serialization error: {0}")]
    Binary(#[from] bincode::Error),
}

impl Error {
    /// Stable error code for this error kind.
    pub fn code(&self) -> u32 {
        match self {
            Error::Config(_) => 10,
            Error::BadPercept(_) => 20,
            Error::Search(_) => 30,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
            Error::Binary(_) => 62,
        }
    }

    /// Category for grouping and filtering.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Config(_) => ErrorCategory::Config,
            Error::BadPercept(_) => ErrorCategory::Protocol,
            Error::Search(_) => ErrorCategory::Search,
            Error::Io(_) | Error::Json(_) | Error::Binary(_) => ErrorCategory::Io,
        }
    }
}
