//! Generic definitions of the built-in containers.
//!
//! A definition names a generic type with its parameters left open. Generic
//! serializer families are registered against these keys, and the
//! [`TypeInfo`](crate::info::TypeInfo) of every closed instance carries the
//! key of its definition.

pub const VEC: &str = "alloc::vec::Vec<_>";
pub const VEC_DEQUE: &str = "alloc::collections::VecDeque<_>";
pub const COW_SLICE: &str = "alloc::borrow::Cow<[_]>";
pub const BOXED_SLICE: &str = "alloc::boxed::Box<[_]>";
pub const ARC_SLICE: &str = "alloc::sync::Arc<[_]>";

pub const HASH_SET: &str = "std::collections::HashSet<_>";
pub const BTREE_SET: &str = "alloc::collections::BTreeSet<_>";

pub const HASH_MAP: &str = "std::collections::HashMap<_, _>";
pub const BTREE_MAP: &str = "alloc::collections::BTreeMap<_, _>";

pub const SHARED: &str = "alloc::sync::Arc<std::sync::RwLock<_>>";
