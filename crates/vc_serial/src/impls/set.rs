use alloc::boxed::Box;
use alloc::collections::BTreeSet;
use alloc::vec::Vec;
use core::any::Any;
use core::hash::{BuildHasher, Hash};
use std::collections::HashSet;

use crate::SerialError;
use crate::info::{GenericTypeInfoCell, TypeInfo, Typed, definition};
use crate::ops::{Set, ValueIter, take};

// -----------------------------------------------------------------------------
// HashSet

impl<T, S> Typed for HashSet<T, S>
where
    T: Typed + Eq + Hash,
    S: BuildHasher + Default + 'static,
{
    fn type_info() -> &'static TypeInfo {
        static CELL: GenericTypeInfoCell = GenericTypeInfoCell::new();
        CELL.get_or_insert::<Self>(|| TypeInfo::set::<Self, T>(definition::HASH_SET))
    }
}

impl<T, S> Set for HashSet<T, S>
where
    T: Any + Eq + Hash,
    S: BuildHasher + Default + 'static,
{
    #[inline]
    fn len(&self) -> usize {
        HashSet::len(self)
    }

    fn iter(&self) -> ValueIter<'_> {
        Box::new(HashSet::iter(self).map(|item| item as &dyn Any))
    }

    #[inline]
    fn clear(&mut self) {
        HashSet::clear(self);
    }

    fn insert(&mut self, item: Box<dyn Any>) -> Result<bool, SerialError> {
        Ok(HashSet::insert(self, take(item)?))
    }

    fn from_items(items: Vec<Box<dyn Any>>) -> Result<Self, SerialError> {
        items.into_iter().map(take::<T>).collect()
    }
}

// -----------------------------------------------------------------------------
// BTreeSet

impl<T: Typed + Ord> Typed for BTreeSet<T> {
    fn type_info() -> &'static TypeInfo {
        static CELL: GenericTypeInfoCell = GenericTypeInfoCell::new();
        CELL.get_or_insert::<Self>(|| TypeInfo::set::<Self, T>(definition::BTREE_SET))
    }
}

impl<T: Any + Ord> Set for BTreeSet<T> {
    #[inline]
    fn len(&self) -> usize {
        BTreeSet::len(self)
    }

    fn iter(&self) -> ValueIter<'_> {
        Box::new(BTreeSet::iter(self).map(|item| item as &dyn Any))
    }

    #[inline]
    fn clear(&mut self) {
        BTreeSet::clear(self);
    }

    fn insert(&mut self, item: Box<dyn Any>) -> Result<bool, SerialError> {
        Ok(BTreeSet::insert(self, take(item)?))
    }

    fn from_items(items: Vec<Box<dyn Any>>) -> Result<Self, SerialError> {
        items.into_iter().map(take::<T>).collect()
    }
}
