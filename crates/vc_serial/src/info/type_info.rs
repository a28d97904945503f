use alloc::boxed::Box;
use core::any::{Any, TypeId};
use core::fmt;

use crate::info::{ListInfo, ListShape, MapInfo, SetInfo, SharedInfo, Typed};
use crate::ops::{List, Map, Set, Shared};

// -----------------------------------------------------------------------------
// Type

/// Identity of a type: its [`TypeId`] and its path.
#[derive(Clone, Copy)]
pub struct Type {
    id: TypeId,
    path: &'static str,
}

impl Type {
    #[inline]
    pub fn of<T: Any + ?Sized>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            path: core::any::type_name::<T>(),
        }
    }

    #[inline]
    pub const fn id(&self) -> TypeId {
        self.id
    }

    /// The full path of the type, as given by [`core::any::type_name`].
    #[inline]
    pub const fn path(&self) -> &'static str {
        self.path
    }

    #[inline]
    pub fn is<T: Any + ?Sized>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for Type {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Type {}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path)
    }
}

// -----------------------------------------------------------------------------
// GenericInfo

/// The generic definition a type instantiates, and its type arguments.
#[derive(Clone)]
pub struct GenericInfo {
    definition: &'static str,
    // `TypeInfo` is created on the first visit, use function pointers to delay it.
    params: Box<[fn() -> &'static TypeInfo]>,
}

impl GenericInfo {
    #[inline]
    pub fn new(definition: &'static str, params: &[fn() -> &'static TypeInfo]) -> Self {
        Self {
            definition,
            params: params.into(),
        }
    }

    /// The key generic serializer families are registered under,
    /// e.g. [`definition::VEC`](crate::info::definition::VEC).
    #[inline]
    pub const fn definition(&self) -> &'static str {
        self.definition
    }

    /// The type arguments, in declaration order.
    pub fn params(&self) -> impl ExactSizeIterator<Item = &'static TypeInfo> + '_ {
        <[_]>::iter(&self.params).map(|param| param())
    }
}

impl fmt::Debug for GenericInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenericInfo")
            .field("definition", &self.definition)
            .field("params", &self.params().map(TypeInfo::path).collect::<alloc::vec::Vec<_>>())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// TypeKind

/// The shape of a type, as far as serialization is concerned.
pub enum TypeKind {
    /// A leaf. Only closed registrations can handle it.
    Opaque,
    List(ListInfo),
    Set(SetInfo),
    Map(MapInfo),
    Shared(SharedInfo),
}

impl TypeKind {
    pub const fn name(&self) -> &'static str {
        match self {
            TypeKind::Opaque => "opaque",
            TypeKind::List(_) => "list",
            TypeKind::Set(_) => "set",
            TypeKind::Map(_) => "map",
            TypeKind::Shared(_) => "shared",
        }
    }
}

// -----------------------------------------------------------------------------
// TypeInfo

/// Compile-time information about a type, see [`Typed`].
///
/// # Example
///
/// ```
/// use vc_serial::info::{definition, Typed};
///
/// let info = <Vec<u32> as Typed>::type_info();
/// assert!(info.is::<Vec<u32>>());
/// assert_eq!(info.generic().unwrap().definition(), definition::VEC);
/// assert!(info.as_list().unwrap().item().is::<u32>());
/// ```
pub struct TypeInfo {
    ty: Type,
    generic: Option<GenericInfo>,
    kind: TypeKind,
}

impl TypeInfo {
    /// Info of a non-generic leaf type.
    #[inline]
    pub fn opaque<T: Any>() -> Self {
        Self {
            ty: Type::of::<T>(),
            generic: None,
            kind: TypeKind::Opaque,
        }
    }

    /// Info of a generic leaf type, e.g. a user wrapper handled by a family.
    #[inline]
    pub fn generic_opaque<T: Any>(generic: GenericInfo) -> Self {
        Self {
            ty: Type::of::<T>(),
            generic: Some(generic),
            kind: TypeKind::Opaque,
        }
    }

    /// Info of a list `L` of `T`.
    pub fn list<L: List, T: Typed>(definition: &'static str, shape: ListShape) -> Self {
        Self {
            ty: Type::of::<L>(),
            generic: Some(GenericInfo::new(definition, &[T::type_info])),
            kind: TypeKind::List(ListInfo::new::<L, T>(shape)),
        }
    }

    /// Info of a set `S` of `T`.
    pub fn set<S: Set, T: Typed>(definition: &'static str) -> Self {
        Self {
            ty: Type::of::<S>(),
            generic: Some(GenericInfo::new(definition, &[T::type_info])),
            kind: TypeKind::Set(SetInfo::new::<S, T>()),
        }
    }

    /// Info of a map `M` from `K` to `V`.
    pub fn map<M: Map, K: Typed, V: Typed>(definition: &'static str) -> Self {
        Self {
            ty: Type::of::<M>(),
            generic: Some(GenericInfo::new(definition, &[K::type_info, V::type_info])),
            kind: TypeKind::Map(MapInfo::new::<M, K, V>()),
        }
    }

    /// Info of a shared handle `S` to a `T`.
    pub fn shared<S: Shared, T: Typed>(definition: &'static str) -> Self {
        Self {
            ty: Type::of::<S>(),
            generic: Some(GenericInfo::new(definition, &[T::type_info])),
            kind: TypeKind::Shared(SharedInfo::new::<S, T>()),
        }
    }

    #[inline]
    pub const fn ty(&self) -> &Type {
        &self.ty
    }

    #[inline]
    pub const fn id(&self) -> TypeId {
        self.ty.id()
    }

    #[inline]
    pub const fn path(&self) -> &'static str {
        self.ty.path()
    }

    #[inline]
    pub fn is<T: Any + ?Sized>(&self) -> bool {
        self.ty.is::<T>()
    }

    #[inline]
    pub const fn generic(&self) -> Option<&GenericInfo> {
        self.generic.as_ref()
    }

    #[inline]
    pub const fn kind(&self) -> &TypeKind {
        &self.kind
    }

    #[inline]
    pub const fn as_list(&self) -> Option<&ListInfo> {
        match &self.kind {
            TypeKind::List(info) => Some(info),
            _ => None,
        }
    }

    #[inline]
    pub const fn as_set(&self) -> Option<&SetInfo> {
        match &self.kind {
            TypeKind::Set(info) => Some(info),
            _ => None,
        }
    }

    #[inline]
    pub const fn as_map(&self) -> Option<&MapInfo> {
        match &self.kind {
            TypeKind::Map(info) => Some(info),
            _ => None,
        }
    }

    #[inline]
    pub const fn as_shared(&self) -> Option<&SharedInfo> {
        match &self.kind {
            TypeKind::Shared(info) => Some(info),
            _ => None,
        }
    }
}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeInfo")
            .field("path", &self.path())
            .field("kind", &self.kind.name())
            .field("generic", &self.generic)
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use crate::info::{ListShape, Typed, definition};
    use alloc::collections::BTreeMap;
    use alloc::sync::Arc;
    use alloc::vec::Vec;
    use std::sync::RwLock;

    #[test]
    fn generic_params() {
        let info = <BTreeMap<u8, Vec<i64>> as Typed>::type_info();
        let generic = info.generic().unwrap();
        assert_eq!(generic.definition(), definition::BTREE_MAP);

        let params: Vec<_> = generic.params().collect();
        assert!(params[0].is::<u8>());
        assert!(params[1].is::<Vec<i64>>());
        assert!(params[1].as_list().unwrap().item().is::<i64>());

        let debug = alloc::format!("{generic:?}");
        assert!(debug.starts_with("GenericInfo"));
        assert!(debug.contains("\"u8\""));
    }

    #[test]
    fn shapes() {
        assert_eq!(
            <Arc<[u8]> as Typed>::type_info().as_list().unwrap().shape(),
            ListShape::Immutable
        );
        assert!(<Arc<RwLock<u8>> as Typed>::type_info().as_shared().is_some());
        assert!(u8::type_info().generic().is_none());
        assert_eq!(u8::type_info().kind().name(), "opaque");
    }

    #[test]
    fn infos_are_cached() {
        let a: *const _ = <Vec<u16> as Typed>::type_info();
        let b: *const _ = <Vec<u16> as Typed>::type_info();
        let c: *const _ = <Vec<u32> as Typed>::type_info();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
