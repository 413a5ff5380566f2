#![deny(clippy::pedantic, unsafe_code)]

//! Resource region registry for ksync
//!
//! This crate tracks reserved address-space regions as a flat list in
//! insertion order. Regions are never checked for overlap or uniqueness;
//! lookups match exactly on one of two keys.
//!
//! The tree has no internal lock. Mutation takes `&mut self`, so sharing a
//! tree between threads requires the caller to serialize access.

pub mod region;
pub mod tree;

pub use region::{RegionKey, ResourceRegion};
pub use tree::{RegionDescriptions, ResourceTree};
