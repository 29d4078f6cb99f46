//! Errors raised by input sources.

use crate::domain::foundation::{DomainError, ErrorCode};

/// Errors that can occur while loading collaborator input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    #[error("Source not found: {0}")]
    NotFound(String),

    #[error("Unsupported format for '{0}' (expected .json, .yaml or .yml)")]
    UnsupportedFormat(String),

    #[error("Failed to parse '{path}': {message}")]
    ParseFailed { path: String, message: String },

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Invalid input: {0}")]
    Invalid(String),
}

impl From<SourceError> for DomainError {
    fn from(err: SourceError) -> Self {
        let code = match err {
            SourceError::Invalid(_) => ErrorCode::ValidationFailed,
            _ => ErrorCode::SourceUnavailable,
        };
        DomainError::new(code, err.to_string())
    }
}
