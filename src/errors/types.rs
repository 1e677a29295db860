//! Error type definitions for the M3U aggregator

use thiserror::Error;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Source handling errors
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Configuration errors (fatal, raised before any fetching)
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Source handling specific errors
///
/// None of these abort a run. The aggregator logs them and moves on to the
/// next source.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// Network timeouts
    #[error("Connection timeout: {url}")]
    Timeout { url: String },

    /// Non-success HTTP status from the source
    #[error("HTTP error: {status} - {url}")]
    Http { status: u16, url: String },

    /// Connection refused, DNS failure, body read failure and similar
    #[error("Source unavailable: {url} - {message}")]
    Unavailable { url: String, message: String },

    /// Missing or invalid `#EXTM3U` header
    #[error("Malformed playlist: {message}")]
    MalformedPlaylist { message: String },
}

impl AppError {
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
}

impl SourceError {
    /// Create an unavailable-source error
    pub fn unavailable<U: Into<String>, M: Into<String>>(url: U, message: M) -> Self {
        Self::Unavailable {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create a malformed playlist error
    pub fn malformed<S: Into<String>>(message: S) -> Self {
        Self::MalformedPlaylist {
            message: message.into(),
        }
    }
}
