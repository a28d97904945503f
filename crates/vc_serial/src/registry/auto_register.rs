use crate::SerializerRegistry;

/// A registration function collected at link time.
///
/// Submit one with [`submit_registration!`](crate::submit_registration) and
/// run all of them with [`SerializerRegistry::auto_register`].
pub struct AutoRegistration {
    register: fn(&mut SerializerRegistry),
}

impl AutoRegistration {
    #[inline]
    pub const fn new(register: fn(&mut SerializerRegistry)) -> Self {
        Self { register }
    }

    #[inline]
    pub(crate) fn apply(&self, registry: &mut SerializerRegistry) {
        (self.register)(registry);
    }
}

inventory::collect!(AutoRegistration);

/// Submits a function to run on [`SerializerRegistry::auto_register`].
///
/// # Example
///
/// ```
/// use vc_node::ScalarNode;
/// use vc_serial::serializers::ScalarSerializer;
/// use vc_serial::{SerializerRegistry, impl_typed, submit_registration};
///
/// #[derive(Clone, PartialEq, Debug)]
/// struct Level(u8);
///
/// impl core::fmt::Display for Level {
///     fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
///         self.0.fmt(f)
///     }
/// }
///
/// impl core::str::FromStr for Level {
///     type Err = core::num::ParseIntError;
///     fn from_str(s: &str) -> Result<Self, Self::Err> {
///         s.parse().map(Level)
///     }
/// }
///
/// impl_typed!(Level);
///
/// fn register(registry: &mut SerializerRegistry) {
///     registry.register_serializer::<Level, ScalarNode, _>(ScalarSerializer::new());
/// }
///
/// submit_registration!(register);
///
/// fn main() {
///     let mut registry = SerializerRegistry::empty();
///     assert!(registry.auto_register());
///     assert!(registry.contains::<Level>());
/// }
/// ```
#[macro_export]
macro_rules! submit_registration {
    ($register:path) => {
        $crate::__macro_exports::inventory::submit! {
            $crate::registry::AutoRegistration::new($register)
        }
    };
}
