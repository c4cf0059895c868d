//! Error types for the generation endpoint.

use thiserror::Error;

/// Failures talking to the generation endpoint.
///
/// These never leave the [`crate::llm::GenerationClient`]; they are turned
/// into fixed reply strings at its boundary.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Network or decoding failure.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Endpoint answered with a non-success status.
    #[error("endpoint returned HTTP {0}")]
    HttpStatus(u16),

    /// Response did not have the expected shape.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl GenerationError {
    /// Whether the failure happened before a usable response arrived.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::HttpStatus(_))
    }
}

/// Convenience result alias for generation calls.
pub type GenerationResult<T> = Result<T, GenerationError>;
