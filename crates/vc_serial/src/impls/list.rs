use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::collections::VecDeque;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::Any;

use crate::SerialError;
use crate::info::{GenericTypeInfoCell, ListShape, TypeInfo, Typed, definition};
use crate::ops::{List, ListStorage, ValueIter, take};

fn take_all<T: Any>(items: Vec<Box<dyn Any>>) -> Result<Vec<T>, SerialError> {
    items.into_iter().map(take::<T>).collect()
}

macro_rules! impl_list_typed {
    ($ty:ty, $item:ident, $definition:expr, $shape:expr $(, $bound:path)?) => {
        impl<$item: Typed $(+ $bound)?> Typed for $ty {
            fn type_info() -> &'static TypeInfo {
                static CELL: GenericTypeInfoCell = GenericTypeInfoCell::new();
                CELL.get_or_insert::<Self>(|| TypeInfo::list::<Self, $item>($definition, $shape))
            }
        }
    };
}

impl_list_typed!(Vec<T>, T, definition::VEC, ListShape::Mutable);
impl_list_typed!(VecDeque<T>, T, definition::VEC_DEQUE, ListShape::Mutable);
impl_list_typed!(Cow<'static, [T]>, T, definition::COW_SLICE, ListShape::ReadOnly, Clone);
impl_list_typed!(Box<[T]>, T, definition::BOXED_SLICE, ListShape::ReadOnlyCollection);
impl_list_typed!(Arc<[T]>, T, definition::ARC_SLICE, ListShape::Immutable);

// -----------------------------------------------------------------------------
// Vec

impl<T: Any> List for Vec<T> {
    #[inline]
    fn len(&self) -> usize {
        <[T]>::len(self)
    }

    fn iter(&self) -> ValueIter<'_> {
        Box::new(<[T]>::iter(self).map(|item| item as &dyn Any))
    }

    #[inline]
    fn storage(&mut self) -> Option<&mut dyn ListStorage> {
        Some(self)
    }

    fn from_items(items: Vec<Box<dyn Any>>) -> Result<Self, SerialError> {
        take_all(items)
    }
}

impl<T: Any> ListStorage for Vec<T> {
    #[inline]
    fn clear(&mut self) {
        Vec::clear(self);
    }

    #[inline]
    fn reserve(&mut self, additional: usize) {
        Vec::reserve(self, additional);
    }

    fn push(&mut self, item: Box<dyn Any>) -> Result<(), SerialError> {
        Vec::push(self, take(item)?);
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// VecDeque

impl<T: Any> List for VecDeque<T> {
    #[inline]
    fn len(&self) -> usize {
        VecDeque::len(self)
    }

    fn iter(&self) -> ValueIter<'_> {
        Box::new(VecDeque::iter(self).map(|item| item as &dyn Any))
    }

    #[inline]
    fn storage(&mut self) -> Option<&mut dyn ListStorage> {
        Some(self)
    }

    fn from_items(items: Vec<Box<dyn Any>>) -> Result<Self, SerialError> {
        take_all(items).map(VecDeque::from)
    }
}

impl<T: Any> ListStorage for VecDeque<T> {
    #[inline]
    fn clear(&mut self) {
        VecDeque::clear(self);
    }

    #[inline]
    fn reserve(&mut self, additional: usize) {
        VecDeque::reserve(self, additional);
    }

    fn push(&mut self, item: Box<dyn Any>) -> Result<(), SerialError> {
        VecDeque::push_back(self, take(item)?);
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// Cow<'static, [T]>

impl<T: Any + Clone> List for Cow<'static, [T]> {
    #[inline]
    fn len(&self) -> usize {
        <[T]>::len(self)
    }

    fn iter(&self) -> ValueIter<'_> {
        Box::new(<[T]>::iter(self).map(|item| item as &dyn Any))
    }

    fn storage(&mut self) -> Option<&mut dyn ListStorage> {
        match self {
            Cow::Owned(items) => Some(items),
            Cow::Borrowed(_) => None,
        }
    }

    fn from_items(items: Vec<Box<dyn Any>>) -> Result<Self, SerialError> {
        take_all(items).map(Cow::Owned)
    }
}

// -----------------------------------------------------------------------------
// Box<[T]> and Arc<[T]>

impl<T: Any> List for Box<[T]> {
    #[inline]
    fn len(&self) -> usize {
        <[T]>::len(self)
    }

    fn iter(&self) -> ValueIter<'_> {
        Box::new(<[T]>::iter(self).map(|item| item as &dyn Any))
    }

    #[inline]
    fn storage(&mut self) -> Option<&mut dyn ListStorage> {
        None
    }

    fn from_items(items: Vec<Box<dyn Any>>) -> Result<Self, SerialError> {
        take_all(items).map(Vec::into_boxed_slice)
    }
}

impl<T: Any> List for Arc<[T]> {
    #[inline]
    fn len(&self) -> usize {
        <[T]>::len(self)
    }

    fn iter(&self) -> ValueIter<'_> {
        Box::new(<[T]>::iter(self).map(|item| item as &dyn Any))
    }

    #[inline]
    fn storage(&mut self) -> Option<&mut dyn ListStorage> {
        None
    }

    fn from_items(items: Vec<Box<dyn Any>>) -> Result<Self, SerialError> {
        take_all::<T>(items).map(Arc::from)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use crate::info::{ListShape, Typed};
    use crate::ops::List;
    use alloc::borrow::Cow;
    use alloc::boxed::Box;
    use alloc::vec;
    use core::any::Any;

    #[test]
    fn cow_storage_depends_on_ownership() {
        static ITEMS: [u8; 2] = [1, 2];
        let mut borrowed: Cow<'static, [u8]> = Cow::Borrowed(&ITEMS);
        let mut owned: Cow<'static, [u8]> = Cow::Owned(vec![1, 2]);

        assert!(List::storage(&mut borrowed).is_none());
        assert!(List::storage(&mut owned).is_some());
        assert_eq!(
            <Cow<'static, [u8]> as Typed>::type_info()
                .as_list()
                .unwrap()
                .shape(),
            ListShape::ReadOnly
        );
    }

    #[test]
    fn from_items_rejects_wrong_type() {
        let items: vec::Vec<Box<dyn Any>> = vec![Box::new(1_u8), Box::new("x")];
        assert!(<Box<[u8]> as List>::from_items(items).is_err());
    }
}
