use alloc::boxed::Box;
use alloc::vec::Vec;
use core::any::Any;

use crate::SerialError;
use crate::ops::ValueIter;

/// A type-erased ordered container.
///
/// # Example
///
/// ```
/// use vc_serial::ops::List;
///
/// let mut list = vec![1_u8, 2];
/// let storage = List::storage(&mut list).unwrap();
/// storage.push(Box::new(3_u8)).unwrap();
///
/// let items: Vec<u8> = List::iter(&list)
///     .map(|v| *v.downcast_ref::<u8>().unwrap())
///     .collect();
/// assert_eq!(items, [1, 2, 3]);
/// ```
pub trait List: Any {
    fn len(&self) -> usize;

    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates the elements in order.
    fn iter(&self) -> ValueIter<'_>;

    /// The growable storage behind this list, if this instance has one.
    ///
    /// `Vec<T>` always does, `Cow<'static, [T]>` only when owned, and
    /// slices behind a `Box` or an `Arc` never do.
    fn storage(&mut self) -> Option<&mut dyn ListStorage>;

    /// Builds the list from elements produced by readers or copiers.
    fn from_items(items: Vec<Box<dyn Any>>) -> Result<Self, SerialError>
    where
        Self: Sized;
}

/// Growable storage of a [`List`].
pub trait ListStorage {
    fn clear(&mut self);

    fn reserve(&mut self, additional: usize);

    /// Appends a type-erased element.
    fn push(&mut self, item: Box<dyn Any>) -> Result<(), SerialError>;
}
