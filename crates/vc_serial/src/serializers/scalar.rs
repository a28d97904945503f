use alloc::string::ToString;
use core::fmt::Display;
use core::marker::PhantomData;
use core::str::FromStr;

use vc_node::{DataNode, ScalarNode, ValidationNode};

use crate::info::Typed;
use crate::registry::{TypeCopier, TypeReader, TypeValidator, TypeWriter};
use crate::{HookContext, SerialError, SerializationContext, SerializationManager};

// -----------------------------------------------------------------------------
// ScalarSerializer

/// Serializes a `T` as a scalar node through its [`Display`] and
/// [`FromStr`] impls. Copies are clones.
///
/// # Example
///
/// ```
/// use vc_node::ScalarNode;
/// use vc_serial::serializers::ScalarSerializer;
/// use vc_serial::{DependencyCollection, SerializationManager, SerializerRegistry, impl_typed};
///
/// #[derive(Clone, Debug, PartialEq)]
/// struct Version(u32);
///
/// impl core::fmt::Display for Version {
///     fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
///         write!(f, "v{}", self.0)
///     }
/// }
///
/// impl core::str::FromStr for Version {
///     type Err = String;
///     fn from_str(s: &str) -> Result<Self, Self::Err> {
///         let digits = s.strip_prefix('v').ok_or("missing `v` prefix")?;
///         digits.parse().map(Version).map_err(|e| format!("{e}"))
///     }
/// }
///
/// impl_typed!(Version);
///
/// let mut registry = SerializerRegistry::new();
/// registry.register_serializer::<Version, ScalarNode, _>(ScalarSerializer::new());
///
/// let dependencies = DependencyCollection::new();
/// let manager = SerializationManager::new(&registry, &dependencies);
///
/// let node = manager.write(&Version(3), false, None).unwrap();
/// assert_eq!(node.as_scalar().unwrap().value(), "v3");
/// assert_eq!(manager.read::<Version>(&node, None).unwrap(), Version(3));
/// ```
pub struct ScalarSerializer<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> ScalarSerializer<T> {
    #[inline]
    pub const fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for ScalarSerializer<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Typed + FromStr> ScalarSerializer<T>
where
    T::Err: Display,
{
    fn parse(node: &ScalarNode) -> Result<T, SerialError> {
        node.value()
            .parse::<T>()
            .map_err(|err| SerialError::InvalidScalar {
                type_path: T::type_info().path(),
                value: node.value().to_string(),
                reason: err.to_string(),
            })
    }
}

impl<T: Typed + Display> TypeWriter<T> for ScalarSerializer<T> {
    fn write(
        &self,
        _manager: SerializationManager<'_>,
        value: &T,
        _always_write: bool,
        _context: Option<&SerializationContext>,
    ) -> Result<DataNode, SerialError> {
        Ok(DataNode::scalar(value.to_string()))
    }
}

impl<T: Typed + FromStr> TypeReader<T, ScalarNode> for ScalarSerializer<T>
where
    T::Err: Display,
{
    fn read(
        &self,
        _manager: SerializationManager<'_>,
        node: &ScalarNode,
        _hooks: &mut HookContext,
        _context: Option<&SerializationContext>,
        _existing: Option<T>,
    ) -> Result<T, SerialError> {
        Self::parse(node)
    }
}

impl<T: Typed + FromStr> TypeValidator<T, ScalarNode> for ScalarSerializer<T>
where
    T::Err: Display,
{
    fn validate(
        &self,
        _manager: SerializationManager<'_>,
        node: &ScalarNode,
        _context: Option<&SerializationContext>,
    ) -> ValidationNode {
        match Self::parse(node) {
            Ok(_) => ValidationNode::ok(),
            Err(err) => ValidationNode::fail(err.to_string()),
        }
    }
}

impl<T: Typed + Clone> TypeCopier<T> for ScalarSerializer<T> {
    #[inline]
    fn copy(
        &self,
        _manager: SerializationManager<'_>,
        source: &T,
        _context: Option<&SerializationContext>,
    ) -> Result<T, SerialError> {
        Ok(source.clone())
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use crate::{DependencyCollection, SerialError, SerializationManager, SerializerRegistry};
    use alloc::string::String;
    use vc_node::DataNode;

    #[test]
    fn primitives_round_trip() {
        let registry = SerializerRegistry::new();
        let dependencies = DependencyCollection::new();
        let manager = SerializationManager::new(&registry, &dependencies);

        let node = manager.write(&-12_i64, false, None).unwrap();
        assert_eq!(node, DataNode::scalar("-12"));
        assert_eq!(manager.read::<i64>(&node, None).unwrap(), -12);

        let node = manager.write(&0.1_f32, false, None).unwrap();
        assert_eq!(manager.read::<f32>(&node, None).unwrap(), 0.1);

        let text = String::from("a b");
        let node = manager.write(&text, false, None).unwrap();
        assert_eq!(manager.read::<String>(&node, None).unwrap(), text);
        assert_eq!(manager.copy(&text, None).unwrap(), text);
    }

    #[test]
    fn invalid_scalar() {
        let registry = SerializerRegistry::new();
        let dependencies = DependencyCollection::new();
        let manager = SerializationManager::new(&registry, &dependencies);

        let err = manager
            .read::<u8>(&DataNode::scalar("300"), None)
            .unwrap_err();
        assert!(matches!(
            err,
            SerialError::InvalidScalar { type_path: "u8", ref value, .. } if value == "300"
        ));

        let report = manager.validate::<bool>(&DataNode::scalar("yes"), None);
        assert!(!report.is_valid());
        assert!(manager.validate::<bool>(&DataNode::scalar("true"), None).is_valid());
    }
}
