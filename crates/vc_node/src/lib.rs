//! Format-agnostic document tree used as the intermediate representation
//! of `vc_serial`.
//!
//! ## Menu
//!
//! - [`DataNode`]: a scalar, a sequence or a mapping. Nodes carry no type
//!   information, the reader decides what a node means.
//! - [`ValidationNode`]: the result of validating a [`DataNode`] against a
//!   type. It mirrors the shape of the validated tree.
//! - [`read_tree`] / [`write_tree`]: move trees in and out of any `serde`
//!   format through `erased_serde`. The core never parses text itself.
//!
//! # Example
//!
//! ```
//! use vc_node::{DataNode, MappingNode, SequenceNode};
//!
//! let mut seq = SequenceNode::new();
//! seq.push(DataNode::scalar("1"));
//! seq.push(DataNode::scalar("2"));
//!
//! let mut map = MappingNode::new();
//! map.insert(DataNode::scalar("items"), seq.into());
//!
//! let node = DataNode::from(map);
//! let items = node.as_mapping().unwrap().get_str("items").unwrap();
//! assert_eq!(items.as_sequence().unwrap().len(), 2);
//! ```
#![no_std]

// -----------------------------------------------------------------------------
// no_std support

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod node;
mod serde;
mod validation;

// -----------------------------------------------------------------------------
// Exports

pub use node::{DataNode, MappingNode, NodeKind, NodeType, ScalarNode, SequenceNode};
pub use serde::{read_tree, write_tree};
pub use validation::{ValidatedMappingNode, ValidatedSequenceNode, ValidatedValueNode};
pub use validation::{ValidationError, ValidationNode};
