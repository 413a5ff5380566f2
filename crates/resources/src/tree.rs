//! Ordered region collection

use std::fmt;
use std::iter::FusedIterator;
use std::slice;

use ksync_errors::RegionError;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::region::{RegionKey, ResourceRegion};

/// Flat, insertion-ordered registry of resource regions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceTree {
    regions: Vec<ResourceRegion>,
}

impl ResourceTree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a region; duplicates and overlaps are accepted
    pub fn add_resource(&mut self, start: u64, size: u64, mask: u64) {
        self.regions.push(ResourceRegion::new(start, size, mask));
        debug!(start, size, mask, "region added");
    }

    /// Remove the first region with exactly this start and size
    ///
    /// # Errors
    ///
    /// Returns `NotFoundBySize` and leaves the tree unchanged when nothing
    /// matches.
    pub fn release_region(&mut self, start: u64, size: u64) -> Result<ResourceRegion, RegionError> {
        self.remove_first(RegionKey::StartSize { start, size })
            .ok_or(RegionError::NotFoundBySize { start, size })
    }

    /// Remove the first region with exactly this start and mask
    ///
    /// # Errors
    ///
    /// Returns `NotFoundByMask` and leaves the tree unchanged when nothing
    /// matches.
    pub fn free_resource(&mut self, start: u64, mask: u64) -> Result<ResourceRegion, RegionError> {
        self.remove_first(RegionKey::StartMask { start, mask })
            .ok_or(RegionError::NotFoundByMask { start, mask })
    }

    fn remove_first(&mut self, key: RegionKey) -> Option<ResourceRegion> {
        let index = self.regions.iter().position(|r| r.matches(key))?;
        let removed = self.regions.remove(index);
        match key {
            RegionKey::StartSize { .. } => debug!(%key, "region released"),
            RegionKey::StartMask { .. } => debug!(%key, "resource freed"),
        }
        Some(removed)
    }

    /// First region matching `key`, if any
    #[must_use]
    pub fn find(&self, key: RegionKey) -> Option<&ResourceRegion> {
        self.regions.iter().find(|r| r.matches(key))
    }

    /// Human-readable line per region, in insertion order.
    ///
    /// The iterator is lazy and borrows the tree; call again (or clone it)
    /// to start over.
    #[must_use]
    pub fn print_resources(&self) -> RegionDescriptions<'_> {
        RegionDescriptions {
            inner: self.regions.iter(),
        }
    }

    pub fn iter(&self) -> slice::Iter<'_, ResourceRegion> {
        self.regions.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

impl<'a> IntoIterator for &'a ResourceTree {
    type Item = &'a ResourceRegion;
    type IntoIter = slice::Iter<'a, ResourceRegion>;

    fn into_iter(self) -> Self::IntoIter {
        self.regions.iter()
    }
}

impl Extend<ResourceRegion> for ResourceTree {
    fn extend<I: IntoIterator<Item = ResourceRegion>>(&mut self, iter: I) {
        self.regions.extend(iter);
    }
}

impl FromIterator<ResourceRegion> for ResourceTree {
    fn from_iter<I: IntoIterator<Item = ResourceRegion>>(iter: I) -> Self {
        Self {
            regions: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for ResourceTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.print_resources() {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

/// Lazy region listing returned by [`ResourceTree::print_resources`]
#[derive(Debug, Clone)]
pub struct RegionDescriptions<'a> {
    inner: slice::Iter<'a, ResourceRegion>,
}

impl Iterator for RegionDescriptions<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        self.inner.next().map(ToString::to_string)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for RegionDescriptions<'_> {}

impl FusedIterator for RegionDescriptions<'_> {}
