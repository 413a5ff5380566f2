#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Manager façade for ksync
//!
//! [`Manager`] is the only surface external callers see. It owns one
//! semaphore table and one resource tree and reports every outcome as a
//! `Result` (collapse it with [`Status::of`] where a binary status is
//! wanted). Semaphore operations take `&self` and may be called from any
//! number of threads; region operations take `&mut self` because the tree
//! is not internally synchronized.

mod regions;
mod semaphores;

use ksync_config::Config;
use ksync_events::EventSender;
use ksync_resources::ResourceTree;
use ksync_semaphore::SemaphoreTable;
use ksync_types::Timeout;

pub use ksync_errors::{Error, Result};
pub use ksync_resources::{RegionDescriptions, ResourceRegion};
pub use ksync_semaphore::SemaphoreSnapshot;
pub use ksync_types::{LockFlags, SemHandle, Status};

/// Semaphore table plus resource region registry
#[derive(Debug)]
pub struct Manager {
    table: SemaphoreTable,
    regions: ResourceTree,
    events: Option<EventSender>,
    default_timeout: Timeout,
    default_initial_count: u32,
}

impl Default for Manager {
    fn default() -> Self {
        Self::new()
    }
}

impl Manager {
    /// Empty manager with built-in defaults and no event sink
    #[must_use]
    pub fn new() -> Self {
        Self {
            table: SemaphoreTable::new(),
            regions: ResourceTree::new(),
            events: None,
            default_timeout: Timeout::Infinite,
            default_initial_count: 1,
        }
    }

    /// Empty manager using the `[semaphore]` section of `config`
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let semaphore = &config.semaphore;
        Self {
            table: SemaphoreTable::new()
                .with_abandon_on_delete(semaphore.abandon_waiters_on_delete),
            regions: ResourceTree::new(),
            events: None,
            default_timeout: semaphore.default_timeout(),
            default_initial_count: semaphore.default_initial_count,
        }
    }

    /// Report every operation on `sender`
    #[must_use]
    pub fn with_events(mut self, sender: EventSender) -> Self {
        self.events = Some(sender);
        self
    }

    /// Timeout callers should use when they have no better value
    #[must_use]
    pub fn default_timeout(&self) -> Timeout {
        self.default_timeout
    }

    #[must_use]
    pub fn default_initial_count(&self) -> u32 {
        self.default_initial_count
    }
}
