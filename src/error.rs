// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Error types for Kehys
//!
//! Only header-fetch failures are meant to reach the user. Anything that goes
//! wrong inside the framing probe is folded into the verdict instead, so the
//! frame and navigation variants below stay internal to the sandbox.

use thiserror::Error;

/// Result type alias for Kehys operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for Kehys
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Header fetch failed. `message` is what the user sees.
    #[error("{message}")]
    FetchFailed {
        message: String,
        url: Option<String>,
        status: Option<u16>,
    },

    /// Frame navigation or rendering error
    #[error("Frame error: {reason}")]
    Frame { reason: String },

    /// Timeout error
    #[error("Operation timed out after {duration_ms}ms: {operation}")]
    Timeout {
        operation: String,
        duration_ms: u64,
        url: Option<String>,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error with added context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a header fetch error
    pub fn fetch_failed(message: impl Into<String>) -> Self {
        Error::FetchFailed {
            message: message.into(),
            url: None,
            status: None,
        }
    }

    /// Create a header fetch error with target URL and collaborator status
    pub fn fetch_failed_with(
        message: impl Into<String>,
        url: impl Into<String>,
        status: Option<u16>,
    ) -> Self {
        Error::FetchFailed {
            message: message.into(),
            url: Some(url.into()),
            status,
        }
    }

    /// Create a frame error
    pub fn frame(reason: impl Into<String>) -> Self {
        Error::Frame {
            reason: reason.into(),
        }
    }

    /// Create a timeout error with URL
    pub fn timeout_with_url(
        operation: impl Into<String>,
        duration_ms: u64,
        url: impl Into<String>,
    ) -> Self {
        Error::Timeout {
            operation: operation.into(),
            duration_ms,
            url: Some(url.into()),
        }
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    /// Check if this is a header fetch failure
    pub fn is_fetch_failure(&self) -> bool {
        matches!(self, Error::FetchFailed { .. })
    }

    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        match self {
            Error::Timeout { .. } => true,
            Error::Http(e) => e.is_timeout(),
            _ => false,
        }
    }

    /// Get HTTP status code if available
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::FetchFailed { status, .. } => *status,
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Get URL if available
    pub fn url(&self) -> Option<&str> {
        match self {
            Error::FetchFailed { url: Some(u), .. } => Some(u),
            Error::Timeout { url: Some(u), .. } => Some(u),
            _ => None,
        }
    }
}

/// Helper trait for adding context to errors
pub trait ErrorContext<T> {
    /// Add operation context to error
    fn context(self, msg: &str) -> Result<T>;
}

impl<T, E: Into<Error>> ErrorContext<T> for std::result::Result<T, E> {
    fn context(self, msg: &str) -> Result<T> {
        self.map_err(|e| {
            let err = e.into();
            Error::Other(format!("{}: {}", msg, err))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_failure_displays_message_verbatim() {
        let err = Error::fetch_failed("DNS resolution failed");

        assert!(err.is_fetch_failure());
        assert_eq!(err.to_string(), "DNS resolution failed");
    }

    #[test]
    fn test_fetch_failure_context() {
        let err = Error::fetch_failed_with("Request failed", "https://example.com", Some(502));

        assert_eq!(err.status_code(), Some(502));
        assert_eq!(err.url(), Some("https://example.com"));
    }

    #[test]
    fn test_timeout_error() {
        let err = Error::timeout_with_url("navigation", 5000, "https://example.com");

        assert!(err.is_timeout());
        assert!(!err.is_fetch_failure());
        assert_eq!(err.url(), Some("https://example.com"));
    }

    #[test]
    fn test_context() {
        let res: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "missing",
        ));
        let err = res.context("writing report").unwrap_err();

        assert!(err.to_string().starts_with("writing report: "));
    }
}
