#![warn(mismatched_lifetime_syntaxes)]
#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Error types for ksync
//!
//! This crate provides fine-grained error types organized by domain.
//! Every failure in ksync is recoverable and reported as a value; nothing
//! here is meant to abort the process.

use std::borrow::Cow;

use thiserror::Error;

pub mod config;
pub mod region;
pub mod semaphore;

// Re-export all error types at the root
pub use config::ConfigError;
pub use region::RegionError;
pub use semaphore::SemaphoreError;

/// Generic error type for cross-crate boundaries
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Error {
    #[error("semaphore error: {0}")]
    Semaphore(#[from] SemaphoreError),

    #[error("region error: {0}")]
    Region(#[from] RegionError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create an internal error with a message
    #[must_use]
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether the error is an unknown or deleted semaphore handle
    #[must_use]
    pub fn is_invalid_handle(&self) -> bool {
        matches!(self, Self::Semaphore(SemaphoreError::InvalidHandle { .. }))
    }

    /// Whether the error is an expired acquisition timeout
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Semaphore(SemaphoreError::TimeoutExpired { .. }))
    }

    /// Whether a region lookup found nothing
    #[must_use]
    pub fn is_region_not_found(&self) -> bool {
        matches!(self, Self::Region(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("JSON error: {err}"))
    }
}

/// Result type alias for ksync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Minimal interface for rendering user-facing error information without
/// requiring heavyweight envelopes.
pub trait UserFacingError {
    /// Short message suitable for CLI output.
    fn user_message(&self) -> Cow<'_, str>;

    /// Optional remediation hint.
    fn user_hint(&self) -> Option<&'static str> {
        None
    }

    /// Whether retrying the same operation is likely to succeed.
    fn is_retryable(&self) -> bool {
        false
    }

    /// Stable error code for analytics / structured reporting.
    fn user_code(&self) -> Option<&'static str> {
        None
    }
}

impl UserFacingError for Error {
    fn user_message(&self) -> Cow<'_, str> {
        match self {
            Error::Semaphore(err) => err.user_message(),
            Error::Region(err) => err.user_message(),
            Error::Config(err) => err.user_message(),
            Error::Internal(_) => Cow::Owned(self.to_string()),
        }
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Error::Semaphore(err) => err.user_hint(),
            Error::Region(err) => err.user_hint(),
            Error::Config(err) => err.user_hint(),
            Error::Internal(_) => None,
        }
    }

    fn is_retryable(&self) -> bool {
        match self {
            Error::Semaphore(err) => err.is_retryable(),
            _ => false,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        match self {
            Error::Semaphore(err) => err.user_code(),
            Error::Region(err) => err.user_code(),
            Error::Config(err) => err.user_code(),
            Error::Internal(_) => Some("error.internal"),
        }
    }
}
