//! Semaphore table and primitive error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum SemaphoreError {
    #[error("invalid semaphore handle: {handle}")]
    InvalidHandle { handle: u64 },

    #[error("timed out acquiring semaphore {handle} after {waited_ms}ms")]
    TimeoutExpired { handle: u64, waited_ms: u64 },

    #[error("semaphore {handle} was reset or deleted while waiting")]
    Abandoned { handle: u64 },

    #[error("invalid unit count {units} for semaphore {handle}")]
    InvalidUnits { handle: u64, units: u32 },
}

impl SemaphoreError {
    /// Handle the error refers to
    #[must_use]
    pub fn handle(&self) -> u64 {
        match self {
            Self::InvalidHandle { handle }
            | Self::TimeoutExpired { handle, .. }
            | Self::Abandoned { handle }
            | Self::InvalidUnits { handle, .. } => *handle,
        }
    }
}

impl UserFacingError for SemaphoreError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::InvalidHandle { .. } => {
                Some("Use a handle returned by create_semaphore that has not been deleted.")
            }
            Self::TimeoutExpired { .. } => {
                Some("Release the semaphore elsewhere or retry with a longer timeout.")
            }
            Self::Abandoned { .. } => Some("Look up the semaphore again before retrying."),
            Self::InvalidUnits { .. } => Some("Pass a unit count of at least 1."),
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(self, Self::TimeoutExpired { .. } | Self::Abandoned { .. })
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::InvalidHandle { .. } => "semaphore.invalid_handle",
            Self::TimeoutExpired { .. } => "semaphore.timeout_expired",
            Self::Abandoned { .. } => "semaphore.abandoned",
            Self::InvalidUnits { .. } => "semaphore.invalid_units",
        };
        Some(code)
    }
}
