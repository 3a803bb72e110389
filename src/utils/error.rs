//! Error types for chunkview

use thiserror::Error;

/// Main error type for chunkview operations
#[derive(Debug, Error)]
pub enum ChunkviewError {
    /// Invalid top-level input (empty document, bad index, unreadable file)
    #[error("Input error: {0}")]
    Input(String),
    /// Parsing/sanitizing errors
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
    /// A chunk type outside the closed set
    #[error("Unsupported chunk type: {0}")]
    UnsupportedType(String),
    /// External formatting backend failed
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),
    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// JSON (de)serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Parsing-specific errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The HTML tree provider could not build a tree
    #[error("HTML parse failed: {0}")]
    Html(String),
    /// The parsed tree is missing a structure we rely on
    #[error("malformed fragment: {0}")]
    Fragment(String),
    /// Sanitizer or normalizer failure
    #[error("sanitize failed: {0}")]
    Sanitize(String),
}

/// Formatting backend errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// The backend did not answer in time
    #[error("request timed out")]
    Timeout,
    /// Transport failure
    #[error("network failure: {0}")]
    Network(String),
    /// The backend answered but refused the input
    #[error("request rejected: {0}")]
    Rejected(String),
}

impl BackendError {
    /// Whether the user may simply resubmit the same document
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout | Self::Network(_))
    }
}

/// Convenience Result type for chunkview operations
pub type Result<T> = std::result::Result<T, ChunkviewError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_converts() {
        let err: ChunkviewError = ParseError::Html("bad".into()).into();
        assert!(matches!(err, ChunkviewError::Parse(ParseError::Html(_))));
        assert_eq!(err.to_string(), "Parse error: HTML parse failed: bad");
    }

    #[test]
    fn test_backend_retryable() {
        assert!(BackendError::Timeout.is_retryable());
        assert!(BackendError::Network("reset".into()).is_retryable());
        assert!(!BackendError::Rejected("too long".into()).is_retryable());
    }
}
