//! Static type information.
//!
//! Every type the serializer can handle implements [`Typed`], which hands
//! out a `&'static` [`TypeInfo`]. Besides the type's identity, the info
//! records its generic definition, used to find a generic serializer family,
//! and for containers the type-erased accessors that family works through.
//!
//! ## Menu
//!
//! - [`Typed`]: static accessor of a type's [`TypeInfo`].
//! - [`TypeInfo`], [`Type`], [`GenericInfo`], [`TypeKind`].
//! - [`ListInfo`], [`SetInfo`], [`MapInfo`], [`SharedInfo`]: container shapes.
//! - [`NonGenericTypeInfoCell`], [`GenericTypeInfoCell`]: storage for `Typed` impls.
//! - [`definition`]: the generic definitions of the built-in containers.
//! - [`impl_typed!`](crate::impl_typed): `Typed` for non-generic leaf types.

// -----------------------------------------------------------------------------
// Modules

mod cell;
mod shape_info;
mod type_info;
mod typed;

pub mod definition;

// -----------------------------------------------------------------------------
// Exports

pub use cell::{GenericTypeInfoCell, NonGenericTypeInfoCell};
pub use shape_info::{ListInfo, ListShape, MapInfo, SetInfo, SharedInfo};
pub use type_info::{GenericInfo, Type, TypeInfo, TypeKind};
pub use typed::Typed;
