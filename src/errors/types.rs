//! Error type definitions for the favicon proxy
//!
//! This module defines the error types used throughout the application.
//! Most failures in the discovery pipeline are absorbed where they happen
//! (a failed fetch is just "no candidates"), so only the failures that
//! have no further fallback travel up as `AppError`.

use thiserror::Error;

/// Top-level application error type
///
/// This enum represents all errors that can escape a service call.
/// It uses `thiserror` to provide automatic error trait implementations and
/// proper error chaining.
#[derive(Error, Debug)]
pub enum AppError {
    /// Network-level failure while talking to a remote host
    #[error("Fetch failed: {url} - {message}")]
    Fetch { url: String, message: String },

    /// Remote host answered with a non-success status
    #[error("Upstream returned {status} for {url}")]
    Upstream { url: String, status: u16 },

    /// Image payload could not be decoded or embedded
    #[error("Decode error: {message}")]
    Decode { message: String },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Generic internal errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Convenience methods for creating common error types
impl AppError {
    /// Create a fetch error for the given URL
    pub fn fetch<U: Into<String>, M: Into<String>>(url: U, message: M) -> Self {
        Self::Fetch {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create a decode error
    pub fn decode<S: Into<String>>(message: S) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether the error came from the network rather than from local processing
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Fetch { .. } | Self::Upstream { .. })
    }
}
