use alloc::boxed::Box;
use alloc::vec::Vec;
use core::any::Any;

use crate::SerialError;
use crate::copy::CopyPolicy;
use crate::info::{TypeInfo, Typed};
use crate::ops::{List, Map, Set, Shared};

// -----------------------------------------------------------------------------
// ListShape

/// Mutability of a list type, which decides how reads and copies treat an
/// existing instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListShape {
    /// Growable, e.g. `Vec<T>`. Reads append to an existing instance.
    Mutable,
    /// Readable only, but may own growable storage, e.g. `Cow<'static, [T]>`.
    ReadOnly,
    /// A fixed-size collection, e.g. `Box<[T]>`.
    ReadOnlyCollection,
    /// Never modified after construction, e.g. `Arc<[T]>`.
    Immutable,
}

impl ListShape {
    pub const fn copy_policy(self) -> CopyPolicy {
        match self {
            ListShape::Mutable => CopyPolicy::Reuse,
            ListShape::ReadOnly | ListShape::ReadOnlyCollection => CopyPolicy::ReuseIfMutable,
            ListShape::Immutable => CopyPolicy::Fresh,
        }
    }

    /// Returns `true` if a read appends to an existing instance instead of
    /// ignoring it.
    #[inline]
    pub const fn reads_into_existing(self) -> bool {
        matches!(self, ListShape::Mutable)
    }
}

// -----------------------------------------------------------------------------
// ListInfo

/// Element type and type-erased accessors of a list type.
pub struct ListInfo {
    item: fn() -> &'static TypeInfo,
    shape: ListShape,
    as_list: fn(&dyn Any) -> Option<&dyn List>,
    as_list_mut: fn(&mut dyn Any) -> Option<&mut dyn List>,
    from_items: fn(Vec<Box<dyn Any>>) -> Result<Box<dyn Any>, SerialError>,
}

impl ListInfo {
    pub fn new<L: List, T: Typed>(shape: ListShape) -> Self {
        Self {
            item: T::type_info,
            shape,
            as_list: |value| value.downcast_ref::<L>().map(|list| list as &dyn List),
            as_list_mut: |value| value.downcast_mut::<L>().map(|list| list as &mut dyn List),
            from_items: |items| L::from_items(items).map(|list| Box::new(list) as Box<dyn Any>),
        }
    }

    #[inline]
    pub fn item(&self) -> &'static TypeInfo {
        (self.item)()
    }

    #[inline]
    pub const fn shape(&self) -> ListShape {
        self.shape
    }

    #[inline]
    pub fn as_list<'a>(&self, value: &'a dyn Any) -> Option<&'a dyn List> {
        (self.as_list)(value)
    }

    #[inline]
    pub fn as_list_mut<'a>(&self, value: &'a mut dyn Any) -> Option<&'a mut dyn List> {
        (self.as_list_mut)(value)
    }

    #[inline]
    pub fn from_items(&self, items: Vec<Box<dyn Any>>) -> Result<Box<dyn Any>, SerialError> {
        (self.from_items)(items)
    }
}

// -----------------------------------------------------------------------------
// SetInfo

/// Element type and type-erased accessors of a set type.
pub struct SetInfo {
    item: fn() -> &'static TypeInfo,
    as_set: fn(&dyn Any) -> Option<&dyn Set>,
    as_set_mut: fn(&mut dyn Any) -> Option<&mut dyn Set>,
    from_items: fn(Vec<Box<dyn Any>>) -> Result<Box<dyn Any>, SerialError>,
}

impl SetInfo {
    pub fn new<S: Set, T: Typed>() -> Self {
        Self {
            item: T::type_info,
            as_set: |value| value.downcast_ref::<S>().map(|set| set as &dyn Set),
            as_set_mut: |value| value.downcast_mut::<S>().map(|set| set as &mut dyn Set),
            from_items: |items| S::from_items(items).map(|set| Box::new(set) as Box<dyn Any>),
        }
    }

    #[inline]
    pub fn item(&self) -> &'static TypeInfo {
        (self.item)()
    }

    #[inline]
    pub fn as_set<'a>(&self, value: &'a dyn Any) -> Option<&'a dyn Set> {
        (self.as_set)(value)
    }

    #[inline]
    pub fn as_set_mut<'a>(&self, value: &'a mut dyn Any) -> Option<&'a mut dyn Set> {
        (self.as_set_mut)(value)
    }

    #[inline]
    pub fn from_items(&self, items: Vec<Box<dyn Any>>) -> Result<Box<dyn Any>, SerialError> {
        (self.from_items)(items)
    }
}

// -----------------------------------------------------------------------------
// MapInfo

/// Key and value types and type-erased accessors of a map type.
pub struct MapInfo {
    key: fn() -> &'static TypeInfo,
    value: fn() -> &'static TypeInfo,
    as_map: fn(&dyn Any) -> Option<&dyn Map>,
    as_map_mut: fn(&mut dyn Any) -> Option<&mut dyn Map>,
    from_entries: fn(Vec<(Box<dyn Any>, Box<dyn Any>)>) -> Result<Box<dyn Any>, SerialError>,
}

impl MapInfo {
    pub fn new<M: Map, K: Typed, V: Typed>() -> Self {
        Self {
            key: K::type_info,
            value: V::type_info,
            as_map: |value| value.downcast_ref::<M>().map(|map| map as &dyn Map),
            as_map_mut: |value| value.downcast_mut::<M>().map(|map| map as &mut dyn Map),
            from_entries: |entries| {
                M::from_entries(entries).map(|map| Box::new(map) as Box<dyn Any>)
            },
        }
    }

    #[inline]
    pub fn key(&self) -> &'static TypeInfo {
        (self.key)()
    }

    #[inline]
    pub fn value(&self) -> &'static TypeInfo {
        (self.value)()
    }

    #[inline]
    pub fn as_map<'a>(&self, value: &'a dyn Any) -> Option<&'a dyn Map> {
        (self.as_map)(value)
    }

    #[inline]
    pub fn as_map_mut<'a>(&self, value: &'a mut dyn Any) -> Option<&'a mut dyn Map> {
        (self.as_map_mut)(value)
    }

    #[inline]
    pub fn from_entries(
        &self,
        entries: Vec<(Box<dyn Any>, Box<dyn Any>)>,
    ) -> Result<Box<dyn Any>, SerialError> {
        (self.from_entries)(entries)
    }
}

// -----------------------------------------------------------------------------
// SharedInfo

/// Inner type and type-erased accessors of a shared handle type.
pub struct SharedInfo {
    inner: fn() -> &'static TypeInfo,
    as_shared: fn(&dyn Any) -> Option<&dyn Shared>,
    from_inner: fn(Box<dyn Any>) -> Result<Box<dyn Any>, SerialError>,
}

impl SharedInfo {
    pub fn new<S: Shared, T: Typed>() -> Self {
        Self {
            inner: T::type_info,
            as_shared: |value| value.downcast_ref::<S>().map(|shared| shared as &dyn Shared),
            from_inner: |inner| S::from_inner(inner).map(|shared| Box::new(shared) as Box<dyn Any>),
        }
    }

    #[inline]
    pub fn inner(&self) -> &'static TypeInfo {
        (self.inner)()
    }

    #[inline]
    pub fn as_shared<'a>(&self, value: &'a dyn Any) -> Option<&'a dyn Shared> {
        (self.as_shared)(value)
    }

    /// Wraps an inner value in a new handle.
    #[inline]
    pub fn from_inner(&self, inner: Box<dyn Any>) -> Result<Box<dyn Any>, SerialError> {
        (self.from_inner)(inner)
    }
}
