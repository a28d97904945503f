//! Containers for static storage of type information.
//!
//! For non-generic types, [`NonGenericTypeInfoCell`] wraps a [`OnceLock`].
//!
//! A `static CELL` inside a generic function is shared by every
//! instantiation of that function, so [`GenericTypeInfoCell`] keeps one
//! entry per [`TypeId`] behind a [`RwLock`].

use alloc::boxed::Box;
use core::any::{Any, TypeId};
use std::sync::{OnceLock, PoisonError, RwLock};

use vc_utils::TypeIdMap;

use crate::info::TypeInfo;

// -----------------------------------------------------------------------------
// NonGenericTypeInfoCell

/// Static storage of the [`TypeInfo`] of a non-generic type.
///
/// # Example
///
/// ```
/// use vc_serial::info::{NonGenericTypeInfoCell, TypeInfo, Typed};
///
/// struct Handle(u32);
///
/// impl Typed for Handle {
///     fn type_info() -> &'static TypeInfo {
///         static CELL: NonGenericTypeInfoCell = NonGenericTypeInfoCell::new();
///         CELL.get_or_init(TypeInfo::opaque::<Self>)
///     }
/// }
///
/// assert!(Handle::type_info().is::<Handle>());
/// ```
pub struct NonGenericTypeInfoCell(OnceLock<TypeInfo>);

impl NonGenericTypeInfoCell {
    #[inline]
    pub const fn new() -> Self {
        Self(OnceLock::new())
    }

    /// Returns the stored info, building it with `f` on first access.
    #[inline]
    pub fn get_or_init(&self, f: impl FnOnce() -> TypeInfo) -> &TypeInfo {
        self.0.get_or_init(f)
    }
}

// -----------------------------------------------------------------------------
// GenericTypeInfoCell

/// Static storage of the [`TypeInfo`] of every instance of a generic type.
///
/// # Example
///
/// ```
/// use vc_serial::info::{GenericTypeInfoCell, TypeInfo, Typed};
///
/// struct Tagged<T>(T);
///
/// impl<T: Typed> Typed for Tagged<T> {
///     fn type_info() -> &'static TypeInfo {
///         static CELL: GenericTypeInfoCell = GenericTypeInfoCell::new();
///         CELL.get_or_insert::<Self>(TypeInfo::opaque::<Self>)
///     }
/// }
///
/// assert!(Tagged::<u8>::type_info().is::<Tagged<u8>>());
/// assert!(Tagged::<u16>::type_info().is::<Tagged<u16>>());
/// ```
pub struct GenericTypeInfoCell(RwLock<TypeIdMap<&'static TypeInfo>>);

impl GenericTypeInfoCell {
    #[inline]
    pub const fn new() -> Self {
        Self(RwLock::new(TypeIdMap::new()))
    }

    /// Returns the info stored for `G`, building it with `f` on first access.
    ///
    /// `f` runs without holding the lock, so it may query the info of other
    /// instances sharing this cell.
    #[inline(always)]
    pub fn get_or_insert<G: Any + ?Sized>(&self, f: impl FnOnce() -> TypeInfo) -> &'static TypeInfo {
        // Separate to reduce code compilation times
        self.get_or_insert_by_type_id(TypeId::of::<G>(), f)
    }

    #[inline(never)]
    fn get_or_insert_by_type_id(
        &self,
        type_id: TypeId,
        f: impl FnOnce() -> TypeInfo,
    ) -> &'static TypeInfo {
        match self.get_by_type_id(type_id) {
            Some(info) => info,
            None => self.insert_by_type_id(type_id, f()),
        }
    }

    #[inline(never)]
    fn get_by_type_id(&self, type_id: TypeId) -> Option<&'static TypeInfo> {
        self.0
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&type_id)
            .copied()
    }

    // A racing thread may have inserted first, in which case its value wins.
    #[inline(never)]
    fn insert_by_type_id(&self, type_id: TypeId, value: TypeInfo) -> &'static TypeInfo {
        *self
            .0
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .get_or_insert(type_id, || Box::leak(Box::new(value)))
    }
}
