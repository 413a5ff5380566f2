use serde::{Deserialize, Serialize};

use crate::Correlation;
use ksync_errors::UserFacingError;

/// Why an operation failed, flattened from the error for consumers that
/// only see the event stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureContext {
    /// e.g. `semaphore.timeout_expired`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    pub retryable: bool,
}

impl FailureContext {
    #[must_use]
    pub fn from_error<E: UserFacingError + ?Sized>(error: &E) -> Self {
        Self {
            code: error.user_code().map(str::to_string),
            message: error.user_message().into_owned(),
            hint: error.user_hint().map(str::to_string),
            retryable: error.is_retryable(),
        }
    }
}

pub mod region;
pub mod semaphore;

pub use region::*;
pub use semaphore::*;

/// Every event the manager reports, tagged by domain
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event", rename_all = "snake_case")]
pub enum AppEvent {
    /// Semaphore table events (create, lock, unlock, reset, wake)
    Semaphore(SemaphoreEvent),

    /// Resource region registry events
    Region(RegionEvent),
}

impl AppEvent {
    /// The semaphore or region start this event is about
    #[must_use]
    pub fn correlation(&self) -> Correlation {
        match self {
            Self::Semaphore(event) => Correlation::Semaphore {
                handle: event.handle(),
            },
            Self::Region(event) => Correlation::Region {
                start: event.start(),
            },
        }
    }

    /// Determine the appropriate tracing log level for this event
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        use tracing::Level;

        match self {
            // Failed lookups and timeouts are expected outcomes, not faults
            Self::Semaphore(SemaphoreEvent::OperationFailed { .. })
            | Self::Region(RegionEvent::LookupFailed { .. }) => Level::WARN,

            Self::Semaphore(
                SemaphoreEvent::Locked { .. }
                | SemaphoreEvent::Unlocked { .. }
                | SemaphoreEvent::SleepFinished { .. },
            ) => Level::DEBUG,

            Self::Semaphore(SemaphoreEvent::WaitQueueNotified { .. }) => Level::TRACE,

            _ => Level::INFO,
        }
    }

    /// Get the log target for this event (for structured logging)
    #[must_use]
    pub fn log_target(&self) -> &'static str {
        match self {
            Self::Semaphore(_) => "ksync::events::semaphore",
            Self::Region(_) => "ksync::events::region",
        }
    }
}
