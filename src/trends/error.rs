//! Error types for the trends provider client

use thiserror::Error;

/// Errors that can occur while talking to the trends provider
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP request error (network, timeout, body decode)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status code from the provider
    #[error("Provider returned status {0}")]
    Status(u16),
}

impl FetchError {
    /// Whether a later run could plausibly succeed
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Http(_) => true,
            // 4xx means a bad key or request shape; retrying won't help
            Self::Status(code) => *code >= 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_recoverability() {
        assert!(FetchError::Status(503).is_recoverable());
        assert!(!FetchError::Status(401).is_recoverable());
    }
}
