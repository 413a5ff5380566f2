//! Resource region operations

use ksync_errors::{RegionError, Result};
use ksync_events::{EventEmitter, FailureContext, RegionEvent};
use ksync_resources::{RegionDescriptions, ResourceRegion, ResourceTree};

use crate::Manager;

impl Manager {
    fn region_lookup_failed(&self, operation: &'static str, start: u64, err: &RegionError) {
        self.events.emit_region(RegionEvent::LookupFailed {
            operation: operation.to_string(),
            start,
            failure: FailureContext::from_error(err),
        });
    }

    /// Record a region; duplicates and overlaps are accepted
    pub fn add_resource(&mut self, start: u64, size: u64, mask: u64) {
        self.regions.add_resource(start, size, mask);
        self.events
            .emit_region(RegionEvent::Added { start, size, mask });
    }

    /// Record a prebuilt region
    pub fn add_region(&mut self, region: ResourceRegion) {
        self.add_resource(region.start, region.size, region.mask);
    }

    /// Remove the first region matching `(start, size)`
    ///
    /// # Errors
    ///
    /// Returns a region error when nothing matches; the tree is unchanged.
    pub fn release_region(&mut self, start: u64, size: u64) -> Result<ResourceRegion> {
        match self.regions.release_region(start, size) {
            Ok(region) => {
                self.events.emit_region(RegionEvent::Released {
                    start,
                    size,
                    mask: region.mask,
                });
                Ok(region)
            }
            Err(err) => {
                self.region_lookup_failed("release_region", start, &err);
                Err(err.into())
            }
        }
    }

    /// Remove the first region matching `(start, mask)`
    ///
    /// # Errors
    ///
    /// Returns a region error when nothing matches; the tree is unchanged.
    pub fn free_resource(&mut self, start: u64, mask: u64) -> Result<ResourceRegion> {
        match self.regions.free_resource(start, mask) {
            Ok(region) => {
                self.events.emit_region(RegionEvent::Freed {
                    start,
                    size: region.size,
                    mask,
                });
                Ok(region)
            }
            Err(err) => {
                self.region_lookup_failed("free_resource", start, &err);
                Err(err.into())
            }
        }
    }

    /// Lazy, restartable listing of every region in insertion order
    #[must_use]
    pub fn print_resources(&self) -> RegionDescriptions<'_> {
        self.regions.print_resources()
    }

    #[must_use]
    pub fn regions(&self) -> &ResourceTree {
        &self.regions
    }
}
