use alloc::boxed::Box;
use alloc::vec::Vec;
use core::any::Any;

use crate::SerialError;
use crate::ops::ValueIter;

/// A type-erased set. Every set shape is mutable.
pub trait Set: Any {
    fn len(&self) -> usize;

    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates the elements in the set's own order.
    fn iter(&self) -> ValueIter<'_>;

    fn clear(&mut self);

    /// Inserts a type-erased element.
    ///
    /// Returns `false` if an equal element was already present.
    fn insert(&mut self, item: Box<dyn Any>) -> Result<bool, SerialError>;

    fn from_items(items: Vec<Box<dyn Any>>) -> Result<Self, SerialError>
    where
        Self: Sized;
}
