//! Acquisition timeouts

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};

/// How long a blocking acquisition may wait for a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Timeout {
    /// Block until a token arrives
    Infinite,
    /// Give up once the duration has elapsed; zero means try once
    After(Duration),
}

impl Timeout {
    /// Non-blocking attempt
    pub const IMMEDIATE: Self = Self::After(Duration::ZERO);

    #[must_use]
    pub fn from_millis(ms: u64) -> Self {
        Self::After(Duration::from_millis(ms))
    }

    #[must_use]
    pub fn from_secs(secs: u64) -> Self {
        Self::After(Duration::from_secs(secs))
    }

    /// Whether this timeout never blocks
    #[must_use]
    pub fn is_immediate(self) -> bool {
        matches!(self, Self::After(d) if d.is_zero())
    }

    /// Absolute deadline measured from `start`; `None` for infinite waits.
    /// Durations too large to represent are treated as infinite.
    #[must_use]
    pub fn deadline_from(self, start: Instant) -> Option<Instant> {
        match self {
            Self::Infinite => None,
            Self::After(d) => start.checked_add(d),
        }
    }
}

impl Default for Timeout {
    fn default() -> Self {
        Self::Infinite
    }
}

impl From<Duration> for Timeout {
    fn from(d: Duration) -> Self {
        Self::After(d)
    }
}

impl From<Option<Duration>> for Timeout {
    fn from(d: Option<Duration>) -> Self {
        d.map_or(Self::Infinite, Self::After)
    }
}

impl fmt::Display for Timeout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Infinite => write!(f, "infinite"),
            Self::After(d) => write!(f, "{}ms", d.as_millis()),
        }
    }
}
