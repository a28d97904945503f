//! Serializer registration and lookup.
//!
//! ## Menu
//!
//! - [`TypeWriter`], [`TypeReader`], [`TypeValidator`], [`TypeCopier`]:
//!   the four capabilities of a serializer, for one concrete type.
//! - [`TypeSerializer`]: all four at once.
//! - [`ErasedWriter`], [`ErasedReader`], [`ErasedValidator`], [`ErasedCopier`]:
//!   their type-erased forms, stored in the registry.
//! - [`TypeSerializers`]: the capability table of one type.
//! - [`GenericSerializer`]: a family serving every instance of a generic definition.
//! - [`SerializerRegistry`]: the store.
//!
//! ## auto_register
//!
//! See [`SerializerRegistry::auto_register`].
//!
//! Registration functions submitted with
//! [`submit_registration!`](crate::submit_registration) are collected at
//! link time by the `inventory` crate. Without the `auto_register`
//! feature the call does nothing and returns `false`.

// -----------------------------------------------------------------------------
// Modules

#[cfg(feature = "auto_register")]
mod auto_register;
mod capability;
mod erased;
mod generic;
mod serializer_registry;
mod type_serializers;

// -----------------------------------------------------------------------------
// Exports

#[cfg(feature = "auto_register")]
pub use auto_register::AutoRegistration;
pub use capability::{TypeCopier, TypeReader, TypeSerializer, TypeValidator, TypeWriter};
pub use erased::{ErasedCopier, ErasedReader, ErasedValidator, ErasedWriter};
pub use generic::GenericSerializer;
pub use serializer_registry::{HookFn, SerializerRegistry};
pub use type_serializers::TypeSerializers;
