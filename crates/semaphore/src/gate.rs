//! Blocking token primitive
//!
//! `TokenGate` is the physical half of a semaphore: a token counter guarded
//! by its own mutex plus a condition variable for blocked acquirers. It knows
//! nothing about handles or logical counts.

use std::sync::{Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

use ksync_types::Timeout;

use crate::lock;

/// Why an acquisition did not obtain a token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateError {
    /// The deadline passed with no token available
    TimedOut { waited: Duration },
    /// The gate was reset or abandoned while the caller was blocked
    Abandoned,
}

#[derive(Debug)]
struct GateState {
    tokens: u64,
    /// Bumped by `reset` and `abandon`; waiters that started under an older
    /// generation give up instead of competing for the new tokens
    generation: u64,
    waiters: usize,
}

/// Counting token primitive with timed acquisition
#[derive(Debug)]
pub struct TokenGate {
    state: Mutex<GateState>,
    available: Condvar,
}

impl TokenGate {
    #[must_use]
    pub fn new(tokens: u64) -> Self {
        Self {
            state: Mutex::new(GateState {
                tokens,
                generation: 0,
                waiters: 0,
            }),
            available: Condvar::new(),
        }
    }

    /// Take one token, blocking until one is available, the timeout
    /// elapses, or the gate is reset underneath the caller. Returns the
    /// generation the token belonged to.
    ///
    /// # Errors
    ///
    /// Returns `GateError::TimedOut` when the deadline passes and
    /// `GateError::Abandoned` when the generation changes while waiting.
    /// Neither consumes a token.
    pub fn acquire(&self, timeout: Timeout) -> Result<u64, GateError> {
        let start = Instant::now();
        let deadline = timeout.deadline_from(start);
        let mut state = lock(&self.state);
        let generation = state.generation;

        loop {
            if state.generation != generation {
                return Err(GateError::Abandoned);
            }
            if state.tokens > 0 {
                state.tokens -= 1;
                return Ok(generation);
            }

            state.waiters += 1;
            state = match deadline {
                None => self
                    .available
                    .wait(state)
                    .unwrap_or_else(PoisonError::into_inner),
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        state.waiters -= 1;
                        return Err(GateError::TimedOut {
                            waited: now.duration_since(start),
                        });
                    }
                    self.available
                        .wait_timeout(state, deadline - now)
                        .unwrap_or_else(PoisonError::into_inner)
                        .0
                }
            };
            state.waiters -= 1;
        }
    }

    /// Non-blocking acquisition
    #[must_use]
    pub fn try_acquire(&self) -> bool {
        self.acquire(Timeout::IMMEDIATE).is_ok()
    }

    /// Return one token and wake at most one waiter
    pub fn release(&self) {
        self.release_many(1);
    }

    /// Return a token taken under `generation`. A token from before the
    /// last reset is dropped instead. Returns whether it was returned.
    pub fn release_if(&self, generation: u64) -> bool {
        let mut state = lock(&self.state);
        if state.generation != generation {
            return false;
        }
        state.tokens = state.tokens.saturating_add(1);
        let wake = state.waiters > 0;
        drop(state);
        if wake {
            self.available.notify_one();
        }
        true
    }

    /// Return `count` tokens, waking at most one waiter per token
    pub fn release_many(&self, count: u64) {
        let mut state = lock(&self.state);
        state.tokens = state.tokens.saturating_add(count);
        let wake = usize::try_from(count).map_or(state.waiters, |c| c.min(state.waiters));
        drop(state);
        for _ in 0..wake {
            self.available.notify_one();
        }
    }

    /// Replace the token count and strand every current waiter
    pub fn reset(&self, tokens: u64) {
        let mut state = lock(&self.state);
        state.tokens = tokens;
        state.generation += 1;
        drop(state);
        self.available.notify_all();
    }

    /// Strand every current waiter without touching the token count
    pub fn abandon(&self) {
        let mut state = lock(&self.state);
        state.generation += 1;
        drop(state);
        self.available.notify_all();
    }

    /// Tokens available right now
    #[must_use]
    pub fn tokens(&self) -> u64 {
        lock(&self.state).tokens
    }

    /// Threads currently blocked in `acquire`
    #[must_use]
    pub fn waiters(&self) -> usize {
        lock(&self.state).waiters
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        lock(&self.state).generation
    }
}
