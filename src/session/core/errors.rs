//! Error types for the session subsystem.

use thiserror::Error;

/// Session subsystem error type.
///
/// Only construction paths return this error. Public engine operations
/// degrade every failure to a benign message or a no-op instead.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Invalid configuration or unsupported values.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// `SQLite` storage error.
    #[error("tokio-rusqlite error: {0}")]
    TokioSqlite(#[from] tokio_rusqlite::Error),
    /// URL parse error.
    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),
    /// Trigger pattern could not be compiled.
    #[error("regex error: {0}")]
    Regex(#[from] regex::Error),
    /// HTTP client could not be built.
    #[error("http client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Convenience result alias for session operations.
pub type SessionResult<T> = Result<T, SessionError>;
