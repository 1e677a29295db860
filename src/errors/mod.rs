//! Centralized error handling for the M3U aggregator
//!
//! # Error Categories
//!
//! - **Source Errors**: playlist source connectivity and format problems.
//!   These are recoverable: the offending source is skipped and the run
//!   continues with the next one.
//! - **Configuration Errors**: missing or malformed config, channel list or
//!   source list. These abort the run before any fetching happens.
//! - **I/O Errors**: failures writing the generated playlist.
//!
//! # Usage
//!
//! ```rust
//! use m3u_aggregator::errors::{AppError, AppResult};
//!
//! fn example_function() -> AppResult<String> {
//!     Err(AppError::configuration("sources list is empty"))
//! }
//! ```

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Convenience type alias for Source Results
pub type SourceResult<T> = Result<T, SourceError>;
