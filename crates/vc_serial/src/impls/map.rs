use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use core::any::Any;
use core::hash::{BuildHasher, Hash};
use std::collections::HashMap;

use crate::SerialError;
use crate::info::{GenericTypeInfoCell, TypeInfo, Typed, definition};
use crate::ops::{EntryIter, Map, take};

// -----------------------------------------------------------------------------
// HashMap

impl<K, V, S> Typed for HashMap<K, V, S>
where
    K: Typed + Eq + Hash,
    V: Typed,
    S: BuildHasher + Default + 'static,
{
    fn type_info() -> &'static TypeInfo {
        static CELL: GenericTypeInfoCell = GenericTypeInfoCell::new();
        CELL.get_or_insert::<Self>(|| TypeInfo::map::<Self, K, V>(definition::HASH_MAP))
    }
}

impl<K, V, S> Map for HashMap<K, V, S>
where
    K: Any + Eq + Hash,
    V: Any,
    S: BuildHasher + Default + 'static,
{
    #[inline]
    fn len(&self) -> usize {
        HashMap::len(self)
    }

    fn iter(&self) -> EntryIter<'_> {
        Box::new(HashMap::iter(self).map(|(k, v)| (k as &dyn Any, v as &dyn Any)))
    }

    #[inline]
    fn clear(&mut self) {
        HashMap::clear(self);
    }

    fn insert(&mut self, key: Box<dyn Any>, value: Box<dyn Any>) -> Result<bool, SerialError> {
        let (key, value) = (take::<K>(key)?, take::<V>(value)?);
        Ok(HashMap::insert(self, key, value).is_some())
    }

    fn from_entries(entries: Vec<(Box<dyn Any>, Box<dyn Any>)>) -> Result<Self, SerialError> {
        let mut map = Self::with_capacity_and_hasher(entries.len(), S::default());
        for (key, value) in entries {
            Map::insert(&mut map, key, value)?;
        }
        Ok(map)
    }
}

// -----------------------------------------------------------------------------
// BTreeMap

impl<K: Typed + Ord, V: Typed> Typed for BTreeMap<K, V> {
    fn type_info() -> &'static TypeInfo {
        static CELL: GenericTypeInfoCell = GenericTypeInfoCell::new();
        CELL.get_or_insert::<Self>(|| TypeInfo::map::<Self, K, V>(definition::BTREE_MAP))
    }
}

impl<K: Any + Ord, V: Any> Map for BTreeMap<K, V> {
    #[inline]
    fn len(&self) -> usize {
        BTreeMap::len(self)
    }

    fn iter(&self) -> EntryIter<'_> {
        Box::new(BTreeMap::iter(self).map(|(k, v)| (k as &dyn Any, v as &dyn Any)))
    }

    #[inline]
    fn clear(&mut self) {
        BTreeMap::clear(self);
    }

    fn insert(&mut self, key: Box<dyn Any>, value: Box<dyn Any>) -> Result<bool, SerialError> {
        let (key, value) = (take::<K>(key)?, take::<V>(value)?);
        Ok(BTreeMap::insert(self, key, value).is_some())
    }

    fn from_entries(entries: Vec<(Box<dyn Any>, Box<dyn Any>)>) -> Result<Self, SerialError> {
        let mut map = BTreeMap::new();
        for (key, value) in entries {
            Map::insert(&mut map, key, value)?;
        }
        Ok(map)
    }
}
