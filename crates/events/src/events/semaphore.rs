use ksync_types::{LockFlags, SemHandle};
use serde::{Deserialize, Serialize};

use super::FailureContext;

/// Semaphore table domain events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SemaphoreEvent {
    Created {
        handle: SemHandle,
        initial_count: u32,
    },

    Deleted {
        handle: SemHandle,
    },

    /// One physical acquire succeeded and the logical count dropped by `units`
    Locked {
        handle: SemHandle,
        units: u32,
        flags: LockFlags,
        logical_count: i64,
    },

    Unlocked {
        handle: SemHandle,
        units: u32,
        logical_count: i64,
    },

    /// Waiters on `wait_queue` were notified; `released` names the semaphore
    /// whose token was handed back in the same step, if any
    WaitQueueNotified {
        wait_queue: SemHandle,
        released: Option<SemHandle>,
    },

    Reset {
        handle: SemHandle,
        count: u32,
    },

    /// A sleep saw a token and passed it on
    SleepFinished {
        handle: SemHandle,
    },

    Woken {
        handle: SemHandle,
        wake_all: bool,
        releases: u64,
        logical_count: i64,
    },

    OperationFailed {
        operation: String,
        handle: SemHandle,
        failure: FailureContext,
    },
}

impl SemaphoreEvent {
    /// Handle the event is about
    #[must_use]
    pub fn handle(&self) -> SemHandle {
        match self {
            Self::Created { handle, .. }
            | Self::Deleted { handle }
            | Self::Locked { handle, .. }
            | Self::Unlocked { handle, .. }
            | Self::Reset { handle, .. }
            | Self::SleepFinished { handle }
            | Self::Woken { handle, .. }
            | Self::OperationFailed { handle, .. } => *handle,
            Self::WaitQueueNotified { wait_queue, .. } => *wait_queue,
        }
    }
}
