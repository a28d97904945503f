//! Type-erased views over container values.
//!
//! Generic serializer families never see the concrete container type. They
//! reach the elements of a `Vec<T>`, a `HashMap<K, V>` or an
//! `Arc<RwLock<T>>` through these traits, obtained from the container's
//! [`TypeInfo`](crate::info::TypeInfo).

// -----------------------------------------------------------------------------
// Modules

mod list_ops;
mod map_ops;
mod set_ops;
mod shared_ops;

// -----------------------------------------------------------------------------
// Exports

pub use list_ops::{List, ListStorage};
pub use map_ops::{EntryIter, Map};
pub use set_ops::Set;
pub use shared_ops::Shared;

use alloc::boxed::Box;
use core::any::Any;

use crate::SerialError;

/// Iterator over the type-erased elements of a container.
pub type ValueIter<'a> = Box<dyn Iterator<Item = &'a dyn Any> + 'a>;

/// Unboxes a type-erased value.
pub(crate) fn take<T: Any>(value: Box<dyn Any>) -> Result<T, SerialError> {
    match value.downcast::<T>() {
        Ok(value) => Ok(*value),
        Err(_) => Err(SerialError::TypeMismatch {
            expected: core::any::type_name::<T>(),
        }),
    }
}
