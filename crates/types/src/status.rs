//! Binary operation status

use ksync_errors::Error;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of a manager operation as seen by status-code callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Failure,
}

impl Status {
    /// Collapse any operation result into a status
    #[must_use]
    pub fn of<T>(result: &Result<T, Error>) -> Self {
        if result.is_ok() {
            Self::Success
        } else {
            Self::Failure
        }
    }

    #[must_use]
    pub fn is_success(self) -> bool {
        self == Self::Success
    }
}

impl<T> From<&Result<T, Error>> for Status {
    fn from(result: &Result<T, Error>) -> Self {
        Self::of(result)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "SUCCESS"),
            Self::Failure => write!(f, "FAILURE"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ksync_errors::SemaphoreError;

    #[test]
    fn test_status_of_result() {
        let ok: Result<u64, Error> = Ok(3);
        assert_eq!(Status::of(&ok), Status::Success);

        let err: Result<(), Error> = Err(SemaphoreError::InvalidHandle { handle: 1 }.into());
        assert_eq!(Status::from(&err), Status::Failure);
        assert!(!Status::of(&err).is_success());
    }

    #[test]
    fn test_status_display() {
        assert_eq!(Status::Success.to_string(), "SUCCESS");
        assert_eq!(Status::Failure.to_string(), "FAILURE");
    }
}
