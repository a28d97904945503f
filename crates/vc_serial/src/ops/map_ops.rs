use alloc::boxed::Box;
use alloc::vec::Vec;
use core::any::Any;

use crate::SerialError;

/// Iterator over the type-erased entries of a [`Map`].
pub type EntryIter<'a> = Box<dyn Iterator<Item = (&'a dyn Any, &'a dyn Any)> + 'a>;

/// A type-erased key/value container. Every map shape is mutable.
pub trait Map: Any {
    fn len(&self) -> usize;

    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates the entries in the map's own order.
    fn iter(&self) -> EntryIter<'_>;

    fn clear(&mut self);

    /// Inserts a type-erased entry.
    ///
    /// Returns `true` if the key was already present; its value is replaced.
    fn insert(&mut self, key: Box<dyn Any>, value: Box<dyn Any>) -> Result<bool, SerialError>;

    fn from_entries(entries: Vec<(Box<dyn Any>, Box<dyn Any>)>) -> Result<Self, SerialError>
    where
        Self: Sized;
}
