//! Shared containers for the `vc_data` crates.
//!
//! - [`hash`]: `hashbrown` containers with fixed `foldhash` seeds.
//! - [`TypeIdMap`]: a map keyed by [`TypeId`](core::any::TypeId) that skips rehashing.
#![no_std]

// -----------------------------------------------------------------------------
// Modules

mod typeid_map;

pub mod hash;

// -----------------------------------------------------------------------------
// Top-level exports

pub use typeid_map::TypeIdMap;
