use alloc::boxed::Box;
use core::any::Any;

use crate::SerialError;

/// A type-erased shared, lockable handle such as `Arc<RwLock<T>>`.
///
/// Identity belongs to the handle: writing through
/// [`replace_inner`](Shared::replace_inner) is visible to every clone of it.
pub trait Shared: Any {
    /// Calls `f` with the inner value under a read lock.
    fn with_inner(&self, f: &mut dyn FnMut(&dyn Any));

    /// Calls `f` with the inner value under a write lock.
    fn with_inner_mut(&self, f: &mut dyn FnMut(&mut dyn Any));

    /// Replaces the inner value, keeping the handle.
    fn replace_inner(&self, value: Box<dyn Any>) -> Result<(), SerialError>;

    /// Returns `true` if `other` is a handle to the same value.
    fn same_handle(&self, other: &dyn Any) -> bool;

    /// Another handle to the same value.
    fn handle(&self) -> Box<dyn Shared>;

    /// Wraps a freshly read inner value in a new handle.
    fn from_inner(value: Box<dyn Any>) -> Result<Self, SerialError>
    where
        Self: Sized;
}
