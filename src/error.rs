//! Unified error handling for the trendscope crate
//!
//! This module provides a unified error type that consolidates the
//! domain-specific errors into a single `Error` enum, together with a
//! coarse [`ErrorCategory`] classification used to pick a handling
//! strategy (recover locally vs. fail the run).

use std::io;
use thiserror::Error;

// Re-export the domain-specific error for convenience
pub use crate::trends::FetchError;

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Network-related errors (HTTP, timeout, rate limit)
    Network,
    /// Embedding and scoring errors
    Scoring,
    /// Artifact writing and I/O errors
    Storage,
    /// Object-storage upload errors
    Upload,
    /// Configuration and validation errors
    Config,
}

/// Unified error type for the trendscope crate
#[derive(Error, Debug)]
pub enum Error {
    /// Trends provider errors
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Embedding model / scoring errors (fatal to a run)
    #[error("Scoring error: {0}")]
    Score(String),

    /// Artifact export errors
    #[error("Export error: {0}")]
    Export(String),

    /// Object-storage upload errors
    #[error("Upload error: {0}")]
    Upload(String),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a scoring error from any underlying cause
    pub fn score(err: impl std::fmt::Display) -> Self {
        Self::Score(err.to_string())
    }

    /// Check if this error is recoverable within a run
    ///
    /// Provider fetch failures and upload failures are recovered locally
    /// (empty region / missing public URL); everything else fails the run.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Fetch(_) | Self::Http(_) | Self::Upload(_) => true,
            Self::Score(_) | Self::Export(_) | Self::Config(_) => false,
            Self::Io(_) => true,
            Self::Json(_) => false,
        }
    }

    /// Get the error category for handling strategies
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Fetch(_) | Self::Http(_) => ErrorCategory::Network,
            Self::Score(_) => ErrorCategory::Scoring,
            Self::Export(_) | Self::Io(_) | Self::Json(_) => ErrorCategory::Storage,
            Self::Upload(_) => ErrorCategory::Upload,
            Self::Config(_) => ErrorCategory::Config,
        }
    }
}

// Conversion from anyhow::Error produced at the embedding boundary
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Score(format!("{err:#}"))
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_variant_maps_to_a_category() {
        let fetch_err = Error::Fetch(FetchError::Status(500));
        assert_eq!(fetch_err.category(), ErrorCategory::Network);

        let score_err = Error::score("model load failed");
        assert_eq!(score_err.category(), ErrorCategory::Scoring);

        let export_err = Error::Export("disk full".into());
        assert_eq!(export_err.category(), ErrorCategory::Storage);

        let io_err = Error::Io(io::Error::new(io::ErrorKind::NotFound, "gone"));
        assert_eq!(io_err.category(), ErrorCategory::Storage);

        let upload_err = Error::Upload("bucket not found".into());
        assert_eq!(upload_err.category(), ErrorCategory::Upload);
    }

    #[test]
    fn test_is_recoverable() {
        let fetch_err = Error::Fetch(FetchError::Status(503));
        assert!(fetch_err.is_recoverable());

        let score_err = Error::score("tokenizer missing");
        assert!(!score_err.is_recoverable());

        let upload_err = Error::Upload("bucket not found".into());
        assert!(upload_err.is_recoverable());
    }

    #[test]
    fn test_config_error() {
        let err = Error::config("Missing API key");
        assert_eq!(err.category(), ErrorCategory::Config);
        assert!(!err.is_recoverable());
    }
}
