//! Semaphore: token gate plus logical count and wait queue
//!
//! The logical count is decoupled from the token count. A
//! multi-unit lock takes one token yet subtracts every unit from the logical
//! count, and unlocks add their units back one token per unit.

use std::sync::{Condvar, Mutex, PoisonError};
use std::time::Instant;

use ksync_errors::SemaphoreError;
use ksync_types::{SemHandle, Timeout};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::gate::{GateError, TokenGate};
use crate::lock;

/// Point-in-time view of a semaphore
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemaphoreSnapshot {
    pub handle: SemHandle,
    pub token_count: u64,
    pub logical_count: i64,
    pub generation: u64,
    pub waiters: usize,
    pub notifications: u64,
}

#[derive(Debug)]
struct QueueState {
    logical_count: i64,
    notifications: u64,
}

/// One counting semaphore
#[derive(Debug)]
pub struct Semaphore {
    handle: SemHandle,
    gate: TokenGate,
    /// Guards the logical count; the wait queue condition pairs with it
    state: Mutex<QueueState>,
    wait_queue: Condvar,
}

impl Semaphore {
    #[must_use]
    pub fn new(handle: SemHandle, initial_count: u32) -> Self {
        Self {
            handle,
            gate: TokenGate::new(u64::from(initial_count)),
            state: Mutex::new(QueueState {
                logical_count: i64::from(initial_count),
                notifications: 0,
            }),
            wait_queue: Condvar::new(),
        }
    }

    #[must_use]
    pub fn handle(&self) -> SemHandle {
        self.handle
    }

    fn check_units(&self, units: u32) -> Result<(), SemaphoreError> {
        if units == 0 {
            return Err(SemaphoreError::InvalidUnits {
                handle: self.handle.as_raw(),
                units,
            });
        }
        Ok(())
    }

    fn gate_error(&self, err: GateError) -> SemaphoreError {
        let handle = self.handle.as_raw();
        match err {
            GateError::TimedOut { waited } => SemaphoreError::TimeoutExpired {
                handle,
                waited_ms: u64::try_from(waited.as_millis()).unwrap_or(u64::MAX),
            },
            GateError::Abandoned => SemaphoreError::Abandoned { handle },
        }
    }

    /// Take one token, then subtract `units` from the logical count.
    ///
    /// The semaphore lock is not held while blocking on the token. A reset
    /// landing between the two steps has already replaced the token, so
    /// the lock is abandoned and the logical count left alone.
    ///
    /// # Errors
    ///
    /// Returns `InvalidUnits` for zero units, `TimeoutExpired` or
    /// `Abandoned` when no token was obtained. Failures change nothing.
    pub fn lock_units(&self, units: u32, timeout: Timeout) -> Result<i64, SemaphoreError> {
        self.check_units(units)?;
        let generation = self
            .gate
            .acquire(timeout)
            .map_err(|err| self.gate_error(err))?;

        let mut state = lock(&self.state);
        if self.gate.generation() != generation {
            debug!(handle = %self.handle, "lock overtaken by reset");
            return Err(SemaphoreError::Abandoned {
                handle: self.handle.as_raw(),
            });
        }
        state.logical_count -= i64::from(units);
        trace!(handle = %self.handle, units, logical_count = state.logical_count, "locked");
        Ok(state.logical_count)
    }

    /// Return `units` tokens and add `units` to the logical count
    ///
    /// # Errors
    ///
    /// Returns `InvalidUnits` for zero units.
    pub fn unlock_units(&self, units: u32) -> Result<i64, SemaphoreError> {
        self.check_units(units)?;
        let mut state = lock(&self.state);
        self.gate.release_many(u64::from(units));
        state.logical_count += i64::from(units);
        trace!(handle = %self.handle, units, logical_count = state.logical_count, "unlocked");
        Ok(state.logical_count)
    }

    /// Wake every thread suspended on this semaphore's wait queue
    pub fn notify_all(&self) {
        let mut state = lock(&self.state);
        state.notifications += 1;
        self.wait_queue.notify_all();
        trace!(handle = %self.handle, notifications = state.notifications, "wait queue notified");
    }

    /// Suspend on the wait queue until the next `notify_all` or timeout.
    /// Returns whether a notification arrived.
    ///
    /// This waits on the queue condition, not on tokens, and never touches
    /// either count.
    #[must_use]
    pub fn suspend(&self, timeout: Timeout) -> bool {
        let deadline = timeout.deadline_from(Instant::now());
        let mut state = lock(&self.state);
        let seen = state.notifications;

        while state.notifications == seen {
            state = match deadline {
                None => self
                    .wait_queue
                    .wait(state)
                    .unwrap_or_else(PoisonError::into_inner),
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return false;
                    }
                    self.wait_queue
                        .wait_timeout(state, deadline - now)
                        .unwrap_or_else(PoisonError::into_inner)
                        .0
                }
            };
        }
        true
    }

    /// Replace both counts with `count` and strand blocked acquirers
    pub fn reset(&self, count: u32) {
        let mut state = lock(&self.state);
        self.gate.reset(u64::from(count));
        state.logical_count = i64::from(count);
        debug!(handle = %self.handle, count, "semaphore reset");
    }

    /// Strand blocked acquirers; used when the semaphore leaves its table
    pub fn abandon(&self) {
        self.gate.abandon();
    }

    /// Acquire a token and hand it straight back. If a reset happened in
    /// between, the token is not handed back into the new state.
    ///
    /// # Errors
    ///
    /// Returns `TimeoutExpired` or `Abandoned` when no token showed up.
    pub fn sleep(&self, timeout: Timeout) -> Result<(), SemaphoreError> {
        let generation = self
            .gate
            .acquire(timeout)
            .map_err(|err| self.gate_error(err))?;
        if !self.gate.release_if(generation) {
            trace!(handle = %self.handle, "stale token dropped after reset");
        }
        Ok(())
    }

    /// Release tokens, bumping the logical count by one per token.
    ///
    /// With `wake_all` unset this releases exactly once. With it set, it
    /// releases while the logical count is below one, so a non-negative
    /// count gets at most one release. Returns how many tokens went out
    /// and the resulting logical count.
    pub fn wakeup(&self, wake_all: bool) -> (u64, i64) {
        let mut state = lock(&self.state);
        let mut releases = 0;
        if wake_all {
            while state.logical_count < 1 {
                self.gate.release();
                state.logical_count += 1;
                releases += 1;
            }
        } else {
            self.gate.release();
            state.logical_count += 1;
            releases = 1;
        }
        trace!(handle = %self.handle, wake_all, releases, "woken");
        (releases, state.logical_count)
    }

    #[must_use]
    pub fn logical_count(&self) -> i64 {
        lock(&self.state).logical_count
    }

    #[must_use]
    pub fn token_count(&self) -> u64 {
        self.gate.tokens()
    }

    #[must_use]
    pub fn snapshot(&self) -> SemaphoreSnapshot {
        let state = lock(&self.state);
        SemaphoreSnapshot {
            handle: self.handle,
            token_count: self.gate.tokens(),
            logical_count: state.logical_count,
            generation: self.gate.generation(),
            waiters: self.gate.waiters(),
            notifications: state.notifications,
        }
    }
}
