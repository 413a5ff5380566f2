//! Resource region value type

use serde::{Deserialize, Serialize};
use std::fmt;

/// A reserved range described by start, size and mask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceRegion {
    pub start: u64,
    pub size: u64,
    #[serde(default)]
    pub mask: u64,
}

impl ResourceRegion {
    #[must_use]
    pub fn new(start: u64, size: u64, mask: u64) -> Self {
        Self { start, size, mask }
    }

    /// Region with the default mask of 0
    #[must_use]
    pub fn unmasked(start: u64, size: u64) -> Self {
        Self::new(start, size, 0)
    }

    #[must_use]
    pub fn matches(&self, key: RegionKey) -> bool {
        match key {
            RegionKey::StartSize { start, size } => self.start == start && self.size == size,
            RegionKey::StartMask { start, mask } => self.start == start && self.mask == mask,
        }
    }
}

impl fmt::Display for ResourceRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Resource: Start = {}, Size = {}, Mask = {}",
            self.start, self.size, self.mask
        )
    }
}

/// The two ways a region can be identified for removal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionKey {
    /// Used by region release
    StartSize { start: u64, size: u64 },
    /// Used by resource free
    StartMask { start: u64, mask: u64 },
}

impl fmt::Display for RegionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StartSize { start, size } => write!(f, "[{start}, {size}]"),
            Self::StartMask { start, mask } => write!(f, "[{start}, Mask = {mask}]"),
        }
    }
}
