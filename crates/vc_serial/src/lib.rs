//! Type-driven serialization between Rust values and [`vc_node`] trees.
//!
//! A [`SerializerRegistry`] maps types to serializers. Each serializer
//! provides up to four capabilities: write a value to a [`DataNode`], read
//! it back, validate a node without building a value, and deep-copy a value
//! (optionally into an existing instance). Generic containers are served by
//! serializer families that are instantiated per concrete type on first use.
//!
//! The [`SerializationManager`] is the entry point. Serializers receive it
//! in every call and delegate element work back to it.
//!
//! ## Menu
//!
//! - [`info`]: the [`Typed`](info::Typed) trait and static type information.
//! - [`ops`]: type-erased views over lists, sets, maps and shared handles.
//! - [`registry`]: capability traits and the [`SerializerRegistry`].
//! - [`serializers`]: built-in serializers and serializer families.
//! - [`copy`]: copy policies.
//! - [`HookContext`]: post-read hooks.
//! - [`SerializationContext`]: per-call overrides.
//! - [`DependencyCollection`]: services available to serializers.
//!
//! # Example
//!
//! ```
//! use std::collections::BTreeMap;
//! use vc_serial::{DependencyCollection, SerializationManager, SerializerRegistry};
//!
//! let registry = SerializerRegistry::new();
//! let dependencies = DependencyCollection::new();
//! let manager = SerializationManager::new(&registry, &dependencies);
//!
//! let scores = BTreeMap::from([("ada".to_string(), vec![3_u32, 1, 2])]);
//! let node = manager.write(&scores, false, None).unwrap();
//!
//! let back: BTreeMap<String, Vec<u32>> = manager.read(&node, None).unwrap();
//! assert_eq!(back, scores);
//!
//! let mut target = BTreeMap::new();
//! manager.copy_into(&scores, &mut target, None).unwrap();
//! assert_eq!(target, scores);
//! ```
//!
//! [`DataNode`]: vc_node::DataNode
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

// -----------------------------------------------------------------------------
// no_std support

// Always linked: locks, `OnceLock` and the std containers come from `std`.
extern crate std;

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod context;
mod dependencies;
mod error;
mod hooks;
mod impls;
mod manager;

pub mod copy;
pub mod info;
pub mod ops;
pub mod registry;
pub mod serializers;

// -----------------------------------------------------------------------------
// Top-Level exports

#[doc(hidden)]
pub mod __macro_exports;

pub use context::SerializationContext;
pub use dependencies::DependencyCollection;
pub use error::{Capability, RegistrationError, SerialError};
pub use hooks::{AfterDeserialize, HookContext, HookError, HookFailure, HookMode, HookState};
pub use manager::SerializationManager;
pub use registry::{GenericSerializer, SerializerRegistry, TypeSerializers};
