use core::any::Any;

use crate::info::TypeInfo;

// -----------------------------------------------------------------------------
// Typed

/// A static accessor to compile-time type information.
///
/// Implemented for the primitives, `String` and the built-in containers.
/// Leaf types implement it with [`impl_typed!`](crate::impl_typed), other
/// types by hand with [`NonGenericTypeInfoCell`] or [`GenericTypeInfoCell`].
///
/// [`NonGenericTypeInfoCell`]: crate::info::NonGenericTypeInfoCell
/// [`GenericTypeInfoCell`]: crate::info::GenericTypeInfoCell
pub trait Typed: Any {
    fn type_info() -> &'static TypeInfo;
}

// -----------------------------------------------------------------------------
// impl_typed

/// Implements [`Typed`] for non-generic leaf types.
///
/// # Example
///
/// ```
/// use vc_serial::{impl_typed, info::Typed};
///
/// #[derive(Default)]
/// struct Health(u32);
///
/// impl_typed!(Health);
///
/// assert!(Health::type_info().is::<Health>());
/// ```
#[macro_export]
macro_rules! impl_typed {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::info::Typed for $ty {
                fn type_info() -> &'static $crate::info::TypeInfo {
                    static CELL: $crate::info::NonGenericTypeInfoCell =
                        $crate::info::NonGenericTypeInfoCell::new();
                    CELL.get_or_init($crate::info::TypeInfo::opaque::<$ty>)
                }
            }
        )+
    };
}
