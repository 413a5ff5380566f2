//! Handle table
//!
//! The table lock covers allocation, registration and removal. Lookups clone
//! the semaphore's `Arc` and drop the lock before the caller touches the
//! semaphore, so a thread blocked on a token never stalls create or delete.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use ksync_errors::SemaphoreError;
use ksync_types::SemHandle;
use tracing::debug;

use crate::semaphore::Semaphore;
use crate::{read, write};

#[derive(Debug)]
struct TableInner {
    next_id: SemHandle,
    entries: BTreeMap<SemHandle, Arc<Semaphore>>,
}

/// Registry of live semaphores keyed by handle
#[derive(Debug)]
pub struct SemaphoreTable {
    inner: RwLock<TableInner>,
    abandon_on_delete: bool,
}

impl Default for SemaphoreTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SemaphoreTable {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(TableInner {
                next_id: SemHandle::FIRST,
                entries: BTreeMap::new(),
            }),
            abandon_on_delete: true,
        }
    }

    /// Whether deleting a semaphore wakes its blocked acquirers with an
    /// abandonment error. When off they keep waiting until their timeout.
    #[must_use]
    pub fn with_abandon_on_delete(mut self, abandon: bool) -> Self {
        self.abandon_on_delete = abandon;
        self
    }

    /// Register a new semaphore and return its handle
    pub fn create(&self, initial_count: u32) -> SemHandle {
        let mut inner = write(&self.inner);
        let handle = inner.next_id;
        inner.next_id = handle.next();
        inner
            .entries
            .insert(handle, Arc::new(Semaphore::new(handle, initial_count)));
        debug!(%handle, initial_count, "semaphore created");
        handle
    }

    /// Remove a semaphore from the table
    ///
    /// # Errors
    ///
    /// Returns `InvalidHandle` if the handle is not live.
    pub fn delete(&self, handle: SemHandle) -> Result<(), SemaphoreError> {
        let removed = write(&self.inner).entries.remove(&handle);
        let sem = removed.ok_or(SemaphoreError::InvalidHandle {
            handle: handle.as_raw(),
        })?;
        if self.abandon_on_delete {
            sem.abandon();
        }
        debug!(%handle, "semaphore deleted");
        Ok(())
    }

    /// Look up a live semaphore
    ///
    /// # Errors
    ///
    /// Returns `InvalidHandle` if the handle is not live.
    pub fn get(&self, handle: SemHandle) -> Result<Arc<Semaphore>, SemaphoreError> {
        read(&self.inner)
            .entries
            .get(&handle)
            .cloned()
            .ok_or(SemaphoreError::InvalidHandle {
                handle: handle.as_raw(),
            })
    }

    #[must_use]
    pub fn contains(&self, handle: SemHandle) -> bool {
        read(&self.inner).entries.contains_key(&handle)
    }

    /// Live handles in allocation order
    #[must_use]
    pub fn handles(&self) -> Vec<SemHandle> {
        read(&self.inner).entries.keys().copied().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        read(&self.inner).entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
