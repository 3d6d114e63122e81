//! Error types for Subjekt.
//!
//! Library crates use [`SubjektError`] via `thiserror`.
//! The server app wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;
use std::time::Duration;

/// Top-level error type for all Subjekt operations.
#[derive(Debug, thiserror::Error)]
pub enum SubjektError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Transport-level failure talking to an upstream service.
    #[error("network error: {0}")]
    Network(String),

    /// An upstream call exceeded its time budget.
    #[error("timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// Upstream answered with a non-success HTTP status.
    #[error("upstream {url} returned HTTP {status}")]
    UpstreamStatus { status: u16, url: String },

    /// Upstream payload (JSON body, embedded data block) could not be parsed.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Caller supplied missing or malformed input.
    #[error("invalid request: {message}")]
    InvalidRequest { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, SubjektError>;

impl SubjektError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create an invalid-request error from any displayable message.
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
