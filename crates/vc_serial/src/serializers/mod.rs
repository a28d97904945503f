//! Built-in serializers.
//!
//! ## Menu
//!
//! - [`ScalarSerializer`]: any `FromStr + Display` type as a scalar node.
//! - [`DataDefinition`]: a struct as a mapping of its fields.
//! - Generic families, registered by
//!   [`SerializerRegistry::new`](crate::SerializerRegistry::new):
//!     - [`ListSerializers`]: lists as sequence nodes.
//!     - [`SetSerializers`]: sets as sequence nodes.
//!     - [`DictionarySerializers`]: maps as mapping nodes.
//!     - [`SharedSerializers`]: `Arc<RwLock<T>>` as the node of `T`, with post-read hooks.

// -----------------------------------------------------------------------------
// Modules

mod definition;
mod dictionary;
mod list;
mod scalar;
mod set;
mod shared;

// -----------------------------------------------------------------------------
// Exports

pub use definition::DataDefinition;
pub use dictionary::DictionarySerializers;
pub use list::ListSerializers;
pub use scalar::ScalarSerializer;
pub use set::SetSerializers;
pub use shared::SharedSerializers;

// -----------------------------------------------------------------------------
// Helpers

use vc_node::{DataNode, NodeKind};

use crate::SerialError;
use crate::info::TypeInfo;

#[inline]
fn mismatch(ty: &'static TypeInfo) -> SerialError {
    SerialError::TypeMismatch {
        expected: ty.path(),
    }
}

#[inline]
fn invalid_shape(ty: &'static TypeInfo, expected: NodeKind, node: &DataNode) -> SerialError {
    SerialError::InvalidNodeShape {
        type_path: ty.path(),
        expected,
        found: node.kind(),
    }
}

/// Reports an existing instance passed to a read that cannot reuse it.
#[cold]
fn unused_target(ty: &'static TypeInfo) {
    log::warn!(
        "an existing `{}` was passed to a read that cannot reuse it; it is dropped",
        ty.path()
    );
}
