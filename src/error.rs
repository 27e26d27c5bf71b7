//! Error types for Pollbar
//!
//! This module defines all error types used throughout the poller.
//! Every poll failure is terminal for its session; the variants exist so
//! callers and logs can tell what ended it.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Main error type for Pollbar operations
#[derive(Error, Debug)]
pub enum PollerError {
    /// Transport-level failure while fetching a reading
    #[error("Request to '{url}' failed: {message}")]
    Request {
        /// Endpoint URL
        url: String,
        /// Transport error description
        message: String,
    },

    /// Progress endpoint answered with a non-success status
    #[error("Progress endpoint '{url}' returned HTTP {status}")]
    Status {
        /// Endpoint URL
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// Response body was not a valid progress reading
    #[error("Malformed progress reading: {0}")]
    Decode(String),

    /// Polling exceeded its attempt budget or deadline
    #[error("Polling timed out after {polls} polls ({elapsed:?})")]
    PollTimeout {
        /// Requests issued before giving up
        polls: u64,
        /// Time since the trigger
        elapsed: Duration,
    },

    /// Session was cancelled before completion
    #[error("Poll session cancelled")]
    Cancelled,

    /// A session is already running and the overlap policy rejects new ones
    #[error("A poll session is already active")]
    SessionActive,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error while reading configuration
    #[error("I/O error at '{path}': {source}")]
    Io {
        /// File being read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl PollerError {
    /// Create a request error
    pub fn request(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Request {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create a status error
    pub fn status(url: impl Into<String>, status: u16) -> Self {
        Self::Status {
            url: url.into(),
            status,
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create an I/O error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Check if this error came from a single poll (network, status or decode)
    pub fn is_poll_failure(&self) -> bool {
        matches!(
            self,
            Self::Request { .. } | Self::Status { .. } | Self::Decode(_)
        )
    }

    /// Check if this error is a poll timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::PollTimeout { .. })
    }
}

/// Result type alias for Pollbar operations
pub type Result<T> = std::result::Result<T, PollerError>;

impl From<serde_json::Error> for PollerError {
    fn from(err: serde_json::Error) -> Self {
        PollerError::Decode(err.to_string())
    }
}

/// Extension trait for adding path context to std::io::Result
pub trait IoResultExt<T> {
    /// Add path context to an I/O error
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|e| PollerError::io(path, e))
    }
}
