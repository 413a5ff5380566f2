use serde::{Deserialize, Serialize};

use super::FailureContext;

/// Resource region registry domain events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RegionEvent {
    Added { start: u64, size: u64, mask: u64 },

    /// Removed by its `(start, size)` key
    Released { start: u64, size: u64, mask: u64 },

    /// Removed by its `(start, mask)` key
    Freed { start: u64, size: u64, mask: u64 },

    /// No region matched; `start` is the start that was looked up
    LookupFailed {
        operation: String,
        start: u64,
        failure: FailureContext,
    },
}

impl RegionEvent {
    #[must_use]
    pub fn start(&self) -> u64 {
        match self {
            Self::Added { start, .. }
            | Self::Released { start, .. }
            | Self::Freed { start, .. }
            | Self::LookupFailed { start, .. } => *start,
        }
    }
}
