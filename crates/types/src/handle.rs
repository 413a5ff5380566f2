//! Semaphore handle and lock flag definitions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier of a semaphore within one table.
///
/// Handles are allocated by the table in increasing order starting at 1 and
/// are never reused while the semaphore is alive. Callers must not derive
/// meaning from the numeric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SemHandle(u64);

impl SemHandle {
    /// First handle handed out by a fresh table
    pub const FIRST: Self = Self(1);

    /// Wrap a raw value, e.g. one received back from an external caller
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw value for crossing an API boundary
    #[must_use]
    pub const fn as_raw(self) -> u64 {
        self.0
    }

    /// The handle allocated after this one
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for SemHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<SemHandle> for u64 {
    fn from(handle: SemHandle) -> Self {
        handle.0
    }
}

/// Caller-supplied lock flags.
///
/// The flags travel with lock requests for diagnostics only; no flag
/// changes acquisition behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LockFlags(u32);

impl LockFlags {
    pub const NONE: Self = Self(0);

    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }
}

impl fmt::Display for LockFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}
