#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Core type definitions for ksync
//!
//! This crate provides the small value types shared by every other crate:
//! semaphore handles, lock flags, acquisition timeouts and the binary
//! operation status.

pub mod handle;
pub mod status;
pub mod timeout;

// Re-export commonly used types
pub use handle::{LockFlags, SemHandle};
pub use status::Status;
pub use timeout::Timeout;
