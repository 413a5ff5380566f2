#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Counting semaphores for ksync
//!
//! This crate provides the blocking token primitive, the semaphore built on
//! top of it (token count, logical count and wait queue), and the table that
//! hands out opaque handles. Everything here is safe to share between OS
//! threads; only token acquisition ever blocks.

pub mod gate;
pub mod semaphore;
pub mod table;

pub use gate::{GateError, TokenGate};
pub use semaphore::{Semaphore, SemaphoreSnapshot};
pub use table::SemaphoreTable;

use std::sync::{Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

// A panic while holding one of these locks cannot leave counts half-written,
// so poisoned guards are recovered instead of propagated.

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
