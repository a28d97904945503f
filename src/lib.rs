//! Type-driven serialization over a format-agnostic document tree.
//!
//! - [`node`]: the document tree, validation results and the serde bridge.
//! - [`serial`]: type information, the serializer registry and the
//!   serialization manager.
//! - [`utils`]: hash containers and `TypeIdMap`.
//!
//! # Example
//!
//! ```
//! use vc_data::node::{read_tree, write_tree};
//! use vc_data::serial::{DependencyCollection, SerializationManager, SerializerRegistry};
//!
//! let registry = SerializerRegistry::new();
//! let dependencies = DependencyCollection::new();
//! let manager = SerializationManager::new(&registry, &dependencies);
//!
//! let mut json = serde_json::Deserializer::from_str("[3, 1, 2]");
//! let mut erased = <dyn erased_serde::Deserializer>::erase(&mut json);
//! let node = read_tree(&mut erased).unwrap();
//!
//! let values: Vec<u8> = manager.read(&node, None).unwrap();
//! assert_eq!(values, [3, 1, 2]);
//!
//! let mut buffer = Vec::new();
//! let mut json = serde_json::Serializer::new(&mut buffer);
//! let mut erased = <dyn erased_serde::Serializer>::erase(&mut json);
//! write_tree(&manager.write(&values, false, None).unwrap(), &mut erased).unwrap();
//! assert_eq!(buffer, br#"["3","1","2"]"#);
//! ```
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

pub use vc_node as node;
pub use vc_serial as serial;
pub use vc_utils as utils;
