use crate::info::TypeInfo;
use crate::registry::TypeSerializers;

/// A serializer family for every instance of a generic definition.
///
/// Registered once per definition key with
/// [`SerializerRegistry::register_generic`](crate::SerializerRegistry::register_generic).
/// When a closed type such as `Vec<u8>` has no closed registration, the
/// registry asks the family of `Vec<_>` to instantiate a table for it and
/// caches the result.
pub trait GenericSerializer: Send + Sync + 'static {
    /// Builds the capability table for `ty`, an instance of one of the
    /// definitions this family is registered under.
    ///
    /// Returns `None` if this family cannot handle `ty` after all.
    fn instantiate(&self, ty: &'static TypeInfo) -> Option<TypeSerializers>;
}
