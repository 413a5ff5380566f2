//! Semaphore operations

use std::sync::{Mutex, PoisonError};

use ksync_errors::{Error, Result, SemaphoreError};
use ksync_events::{EventEmitter, FailureContext, SemaphoreEvent};
use ksync_semaphore::SemaphoreSnapshot;
use ksync_types::{LockFlags, SemHandle, Timeout};
use tracing::{debug, trace};

use crate::Manager;

impl Manager {
    fn fail(&self, operation: &'static str, handle: SemHandle, err: SemaphoreError) -> Error {
        debug!(operation, %handle, error = %err, "semaphore operation failed");
        self.events.emit_semaphore(SemaphoreEvent::OperationFailed {
            operation: operation.to_string(),
            handle,
            failure: FailureContext::from_error(&err),
        });
        err.into()
    }

    /// Allocate a new semaphore with both counts at `initial_count`
    pub fn create_semaphore(&self, initial_count: u32) -> SemHandle {
        let handle = self.table.create(initial_count);
        self.events.emit_semaphore(SemaphoreEvent::Created {
            handle,
            initial_count,
        });
        handle
    }

    /// Allocate a semaphore with the configured default count
    pub fn create_default_semaphore(&self) -> SemHandle {
        self.create_semaphore(self.default_initial_count)
    }

    /// Remove a semaphore. Threads still blocked on it are abandoned unless
    /// the manager was configured otherwise.
    ///
    /// # Errors
    ///
    /// Returns `InvalidHandle` if the handle is not live.
    pub fn delete_semaphore(&self, handle: SemHandle) -> Result<()> {
        self.table
            .delete(handle)
            .map_err(|e| self.fail("delete_semaphore", handle, e))?;
        self.events.emit_semaphore(SemaphoreEvent::Deleted { handle });
        Ok(())
    }

    /// Block for one token, then subtract `units` from the logical count.
    ///
    /// Only a single token is taken regardless of `units`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidHandle`, `InvalidUnits`, `TimeoutExpired` or
    /// `Abandoned`; none of them change any count.
    pub fn lock_semaphore_ex(
        &self,
        handle: SemHandle,
        units: u32,
        flags: LockFlags,
        timeout: impl Into<Timeout>,
    ) -> Result<()> {
        let timeout = timeout.into();
        trace!(%handle, units, %flags, %timeout, "lock requested");
        let logical_count = self
            .table
            .get(handle)
            .and_then(|sem| sem.lock_units(units, timeout))
            .map_err(|e| self.fail("lock_semaphore_ex", handle, e))?;
        self.events.emit_semaphore(SemaphoreEvent::Locked {
            handle,
            units,
            flags,
            logical_count,
        });
        Ok(())
    }

    /// Single-unit [`lock_semaphore_ex`](Self::lock_semaphore_ex)
    ///
    /// # Errors
    ///
    /// Same as `lock_semaphore_ex`.
    pub fn lock_semaphore(
        &self,
        handle: SemHandle,
        flags: LockFlags,
        timeout: impl Into<Timeout>,
    ) -> Result<()> {
        self.lock_semaphore_ex(handle, 1, flags, timeout)
    }

    /// Release `units` tokens and add `units` to the logical count
    ///
    /// # Errors
    ///
    /// Returns `InvalidHandle` or `InvalidUnits`.
    pub fn unlock_semaphore_ex(&self, handle: SemHandle, units: u32) -> Result<()> {
        let logical_count = self
            .table
            .get(handle)
            .and_then(|sem| sem.unlock_units(units))
            .map_err(|e| self.fail("unlock_semaphore_ex", handle, e))?;
        self.events.emit_semaphore(SemaphoreEvent::Unlocked {
            handle,
            units,
            logical_count,
        });
        Ok(())
    }

    /// Single-unit [`unlock_semaphore_ex`](Self::unlock_semaphore_ex)
    ///
    /// # Errors
    ///
    /// Returns `InvalidHandle`.
    pub fn unlock_semaphore(&self, handle: SemHandle) -> Result<()> {
        self.unlock_semaphore_ex(handle, 1)
    }

    /// Wake everything suspended on `wait_queue`, then release one token
    /// of `handle` and bump its logical count.
    ///
    /// # Errors
    ///
    /// Returns `InvalidHandle` if either handle is not live; nothing is
    /// notified or released in that case.
    pub fn unlock_and_suspend(&self, wait_queue: SemHandle, handle: SemHandle) -> Result<()> {
        let queue = self
            .table
            .get(wait_queue)
            .map_err(|e| self.fail("unlock_and_suspend", wait_queue, e))?;
        let sem = self
            .table
            .get(handle)
            .map_err(|e| self.fail("unlock_and_suspend", handle, e))?;

        queue.notify_all();
        let logical_count = sem
            .unlock_units(1)
            .map_err(|e| self.fail("unlock_and_suspend", handle, e))?;
        trace!(%wait_queue, %handle, logical_count, "unlocked and notified");
        self.events.emit_semaphore(SemaphoreEvent::WaitQueueNotified {
            wait_queue,
            released: Some(handle),
        });
        Ok(())
    }

    /// Take `external_lock`, then the wait queue's own lock, wake every
    /// waiter and drop both. The caller is never blocked on the queue.
    ///
    /// Callers are responsible for ordering `external_lock` consistently
    /// against any other lock they hold.
    ///
    /// # Errors
    ///
    /// Returns `InvalidHandle` if `wait_queue` is not live; the external
    /// lock is not touched in that case.
    pub fn spinunlock_and_suspend<T>(
        &self,
        wait_queue: SemHandle,
        external_lock: &Mutex<T>,
        flags: LockFlags,
        timeout: impl Into<Timeout>,
    ) -> Result<()> {
        let timeout = timeout.into();
        let queue = self
            .table
            .get(wait_queue)
            .map_err(|e| self.fail("spinunlock_and_suspend", wait_queue, e))?;

        {
            let _external = external_lock
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            queue.notify_all();
        }
        trace!(%wait_queue, %flags, %timeout, "spin unlock notified wait queue");
        self.events.emit_semaphore(SemaphoreEvent::WaitQueueNotified {
            wait_queue,
            released: None,
        });
        Ok(())
    }

    /// Replace both counts with `count`; threads blocked acquiring the old
    /// state are abandoned.
    ///
    /// # Errors
    ///
    /// Returns `InvalidHandle` if the handle is not live.
    pub fn reset_semaphore(&self, handle: SemHandle, count: u32) -> Result<()> {
        let sem = self
            .table
            .get(handle)
            .map_err(|e| self.fail("reset_semaphore", handle, e))?;
        sem.reset(count);
        self.events
            .emit_semaphore(SemaphoreEvent::Reset { handle, count });
        Ok(())
    }

    /// Wait for a token and pass it straight on.
    ///
    /// # Errors
    ///
    /// Returns `InvalidHandle`, `TimeoutExpired` or `Abandoned`.
    pub fn sleep_on_sem(&self, handle: SemHandle, timeout: impl Into<Timeout>) -> Result<()> {
        let timeout = timeout.into();
        let sem = self
            .table
            .get(handle)
            .map_err(|e| self.fail("sleep_on_sem", handle, e))?;
        sem.sleep(timeout)
            .map_err(|e| self.fail("sleep_on_sem", handle, e))?;
        self.events
            .emit_semaphore(SemaphoreEvent::SleepFinished { handle });
        Ok(())
    }

    /// Release one token, or with `wake_all` keep releasing while the
    /// logical count is below one.
    ///
    /// # Errors
    ///
    /// Returns `InvalidHandle` if the handle is not live.
    pub fn wakeup_sem(&self, handle: SemHandle, wake_all: bool) -> Result<()> {
        let sem = self
            .table
            .get(handle)
            .map_err(|e| self.fail("wakeup_sem", handle, e))?;
        let (releases, logical_count) = sem.wakeup(wake_all);
        self.events.emit_semaphore(SemaphoreEvent::Woken {
            handle,
            wake_all,
            releases,
            logical_count,
        });
        Ok(())
    }

    /// Current counts of a live semaphore
    ///
    /// # Errors
    ///
    /// Returns `InvalidHandle` if the handle is not live.
    pub fn semaphore_snapshot(&self, handle: SemHandle) -> Result<SemaphoreSnapshot> {
        Ok(self.table.get(handle)?.snapshot())
    }

    /// Logical count of a live semaphore
    ///
    /// # Errors
    ///
    /// Returns `InvalidHandle` if the handle is not live.
    pub fn semaphore_count(&self, handle: SemHandle) -> Result<i64> {
        Ok(self.table.get(handle)?.logical_count())
    }

    /// Live handles in allocation order
    #[must_use]
    pub fn semaphore_handles(&self) -> Vec<SemHandle> {
        self.table.handles()
    }

    #[must_use]
    pub fn semaphore_len(&self) -> usize {
        self.table.len()
    }
}
