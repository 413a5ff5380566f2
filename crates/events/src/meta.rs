//! Envelope metadata attached to every emitted event

use std::fmt;

use chrono::{DateTime, Utc};
use ksync_types::SemHandle;
use serde::{Deserialize, Serialize};
use tracing::Level;
use uuid::Uuid;

/// The object an event is about. Consumers group on this to follow one
/// semaphore, or every region sharing a start, through a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Correlation {
    Semaphore { handle: SemHandle },
    Region { start: u64 },
}

impl fmt::Display for Correlation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Semaphore { handle } => write!(f, "sem:{handle}"),
            Self::Region { start } => write!(f, "region:{start}"),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventMeta {
    pub event_id: Uuid,
    pub correlation: Correlation,
    /// Captured at emission, not delivery
    pub timestamp: DateTime<Utc>,
    pub level: EventLevel,
}

impl EventMeta {
    #[must_use]
    pub fn new(level: impl Into<EventLevel>, correlation: Correlation) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            correlation,
            timestamp: Utc::now(),
            level: level.into(),
        }
    }
}

/// Serializable mirror of `tracing::Level`
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum EventLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<Level> for EventLevel {
    fn from(level: Level) -> Self {
        match level {
            Level::TRACE => EventLevel::Trace,
            Level::DEBUG => EventLevel::Debug,
            Level::INFO => EventLevel::Info,
            Level::WARN => EventLevel::Warn,
            Level::ERROR => EventLevel::Error,
        }
    }
}
