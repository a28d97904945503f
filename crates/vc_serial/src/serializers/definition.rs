use alloc::boxed::Box;
use alloc::string::ToString;
use alloc::vec::Vec;
use core::fmt;
use core::marker::PhantomData;

use vc_node::{DataNode, MappingNode, NodeKind, ValidatedMappingNode, ValidationNode};

use crate::copy::CopyPolicy;
use crate::info::Typed;
use crate::registry::{TypeCopier, TypeReader, TypeValidator, TypeWriter};
use crate::{HookContext, SerialError, SerializationContext, SerializationManager};

// -----------------------------------------------------------------------------
// FieldAccess

/// Type-erased field of a [`DataDefinition`].
trait FieldAccess<T>: Send + Sync + 'static {
    fn name(&self) -> &'static str;

    /// Returns `None` if the field is omitted.
    fn write(
        &self,
        manager: SerializationManager<'_>,
        value: &T,
        always_write: bool,
        context: Option<&SerializationContext>,
    ) -> Result<Option<DataNode>, SerialError>;

    fn read(
        &self,
        manager: SerializationManager<'_>,
        node: &DataNode,
        target: &mut T,
        reuse: bool,
        hooks: &mut HookContext,
        context: Option<&SerializationContext>,
    ) -> Result<(), SerialError>;

    fn validate(
        &self,
        manager: SerializationManager<'_>,
        node: &DataNode,
        context: Option<&SerializationContext>,
    ) -> ValidationNode;

    fn copy_into(
        &self,
        manager: SerializationManager<'_>,
        source: &T,
        target: &mut T,
        context: Option<&SerializationContext>,
    ) -> Result<(), SerialError>;
}

struct Field<T, F> {
    name: &'static str,
    get: fn(&T) -> &F,
    get_mut: fn(&mut T) -> &mut F,
}

impl<T, F> FieldAccess<T> for Field<T, F>
where
    T: 'static,
    F: Typed + Default + PartialEq,
{
    #[inline]
    fn name(&self) -> &'static str {
        self.name
    }

    fn write(
        &self,
        manager: SerializationManager<'_>,
        value: &T,
        always_write: bool,
        context: Option<&SerializationContext>,
    ) -> Result<Option<DataNode>, SerialError> {
        let field = (self.get)(value);
        if !always_write && *field == F::default() {
            return Ok(None);
        }
        manager.write(field, always_write, context).map(Some)
    }

    fn read(
        &self,
        manager: SerializationManager<'_>,
        node: &DataNode,
        target: &mut T,
        reuse: bool,
        hooks: &mut HookContext,
        context: Option<&SerializationContext>,
    ) -> Result<(), SerialError> {
        let field = (self.get_mut)(target);
        let existing = reuse.then(|| core::mem::take(field));
        *field = manager.read_into(node, existing, hooks, context)?;
        Ok(())
    }

    #[inline]
    fn validate(
        &self,
        manager: SerializationManager<'_>,
        node: &DataNode,
        context: Option<&SerializationContext>,
    ) -> ValidationNode {
        manager.validate::<F>(node, context)
    }

    fn copy_into(
        &self,
        manager: SerializationManager<'_>,
        source: &T,
        target: &mut T,
        context: Option<&SerializationContext>,
    ) -> Result<(), SerialError> {
        manager.copy_into((self.get)(source), (self.get_mut)(target), context)?;
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// DataDefinition

/// Serializes a struct as a mapping from field names to field values.
///
/// Fields are listed once, with a pair of accessors, and are written in
/// that order. A field equal to its default is left out unless
/// `always_write` is set.
///
/// Reading starts from the existing instance, if one is given, or from
/// `T::default()`, so fields missing from the node keep their value. A key
/// that names no field fails the read with [`SerialError::UnknownField`].
///
/// # Example
///
/// ```
/// use vc_node::MappingNode;
/// use vc_serial::serializers::DataDefinition;
/// use vc_serial::{DependencyCollection, SerializationManager, SerializerRegistry, impl_typed};
///
/// #[derive(Debug, Default, PartialEq)]
/// struct Player {
///     name: String,
///     level: u32,
/// }
///
/// impl_typed!(Player);
///
/// let mut registry = SerializerRegistry::new();
/// registry.register_serializer::<Player, MappingNode, _>(
///     DataDefinition::new()
///         .field("name", |p: &Player| &p.name, |p| &mut p.name)
///         .field("level", |p: &Player| &p.level, |p| &mut p.level),
/// );
///
/// let dependencies = DependencyCollection::new();
/// let manager = SerializationManager::new(&registry, &dependencies);
///
/// let player = Player { name: "ada".into(), level: 0 };
/// let node = manager.write(&player, false, None).unwrap();
/// assert_eq!(node.as_mapping().unwrap().len(), 1);
/// assert_eq!(manager.read::<Player>(&node, None).unwrap(), player);
/// ```
pub struct DataDefinition<T> {
    fields: Vec<Box<dyn FieldAccess<T>>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: 'static> DataDefinition<T> {
    #[inline]
    pub const fn new() -> Self {
        Self {
            fields: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Adds a field.
    ///
    /// # Panics
    ///
    /// Panics if a field with the same name was already added.
    #[track_caller]
    pub fn field<F>(mut self, name: &'static str, get: fn(&T) -> &F, get_mut: fn(&mut T) -> &mut F) -> Self
    where
        F: Typed + Default + PartialEq,
    {
        if self.find(name).is_some() {
            panic!(
                "`{}` already has a field named `{name}`",
                core::any::type_name::<T>()
            );
        }
        self.fields.push(Box::new(Field { name, get, get_mut }));
        self
    }

    /// Names of the fields, in write order.
    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|field| field.name())
    }

    fn find(&self, name: &str) -> Option<&dyn FieldAccess<T>> {
        self.fields
            .iter()
            .find(|field| field.name() == name)
            .map(|field| &**field)
    }
}

impl<T: 'static> Default for DataDefinition<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> fmt::Debug for DataDefinition<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.fields.iter().map(|field| field.name()))
            .finish()
    }
}

impl<T: Typed + Default> DataDefinition<T> {
    fn field_of<'d>(&'d self, key: &DataNode) -> Result<&'d dyn FieldAccess<T>, SerialError> {
        let type_path = T::type_info().path();
        let key = key.as_scalar().ok_or(SerialError::InvalidNodeShape {
            type_path,
            expected: NodeKind::Scalar,
            found: key.kind(),
        })?;
        self.find(key.value()).ok_or_else(|| SerialError::UnknownField {
            type_path,
            field: key.value().to_string(),
        })
    }
}

impl<T: Typed + Default> TypeWriter<T> for DataDefinition<T> {
    fn write(
        &self,
        manager: SerializationManager<'_>,
        value: &T,
        always_write: bool,
        context: Option<&SerializationContext>,
    ) -> Result<DataNode, SerialError> {
        let mut node = MappingNode::with_capacity(self.fields.len());
        for field in &self.fields {
            if let Some(child) = field.write(manager, value, always_write, context)? {
                node.insert(DataNode::scalar(field.name()), child);
            }
        }
        Ok(node.into())
    }
}

impl<T: Typed + Default> TypeReader<T, MappingNode> for DataDefinition<T> {
    fn read(
        &self,
        manager: SerializationManager<'_>,
        node: &MappingNode,
        hooks: &mut HookContext,
        context: Option<&SerializationContext>,
        existing: Option<T>,
    ) -> Result<T, SerialError> {
        let reuse = existing.is_some();
        let mut value = existing.unwrap_or_default();
        for (key, child) in node {
            self.field_of(key)?
                .read(manager, child, &mut value, reuse, hooks, context)?;
        }
        Ok(value)
    }
}

impl<T: Typed + Default> TypeValidator<T, MappingNode> for DataDefinition<T> {
    fn validate(
        &self,
        manager: SerializationManager<'_>,
        node: &MappingNode,
        context: Option<&SerializationContext>,
    ) -> ValidationNode {
        node.iter()
            .map(|(key, child)| match self.field_of(key) {
                Ok(field) => (ValidationNode::ok(), field.validate(manager, child, context)),
                Err(err) => (ValidationNode::fail(err.to_string()), ValidationNode::ok()),
            })
            .collect::<ValidatedMappingNode>()
            .into()
    }
}

impl<T: Typed + Default> TypeCopier<T> for DataDefinition<T> {
    fn copy(
        &self,
        manager: SerializationManager<'_>,
        source: &T,
        context: Option<&SerializationContext>,
    ) -> Result<T, SerialError> {
        let mut target = T::default();
        self.copy_into(manager, source, &mut target, context)?;
        Ok(target)
    }

    fn copy_into(
        &self,
        manager: SerializationManager<'_>,
        source: &T,
        target: &mut T,
        context: Option<&SerializationContext>,
    ) -> Result<(), SerialError> {
        for field in &self.fields {
            field.copy_into(manager, source, target, context)?;
        }
        Ok(())
    }

    #[inline]
    fn policy(&self) -> CopyPolicy {
        CopyPolicy::Reuse
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::DataDefinition;
    use crate::{DependencyCollection, HookContext, SerialError, SerializationContext};
    use crate::{SerializationManager, SerializerRegistry, impl_typed};
    use alloc::string::String;
    use alloc::vec;
    use alloc::vec::Vec;
    use vc_node::{DataNode, MappingNode, SequenceNode};

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Inventory {
        owner: String,
        slots: u8,
        items: Vec<String>,
    }

    impl_typed!(Inventory);

    fn registry() -> SerializerRegistry {
        let mut registry = SerializerRegistry::new();
        registry.register_serializer::<Inventory, MappingNode, _>(
            DataDefinition::new()
                .field("owner", |i: &Inventory| &i.owner, |i| &mut i.owner)
                .field("slots", |i: &Inventory| &i.slots, |i| &mut i.slots)
                .field("items", |i: &Inventory| &i.items, |i| &mut i.items),
        );
        registry
    }

    fn entry(key: &str, value: DataNode) -> (DataNode, DataNode) {
        (DataNode::scalar(key), value)
    }

    #[test]
    fn defaults_are_omitted_unless_always_write() {
        let registry = registry();
        let dependencies = DependencyCollection::new();
        let manager = SerializationManager::new(&registry, &dependencies);

        let value = Inventory {
            owner: String::from("bo"),
            ..Default::default()
        };
        let node = manager.write(&value, false, None).unwrap();
        let expected: DataNode = MappingNode::from(vec![entry("owner", DataNode::scalar("bo"))]).into();
        assert_eq!(node, expected);

        let node = manager.write(&value, true, None).unwrap();
        assert_eq!(node.as_mapping().unwrap().len(), 3);

        let context = SerializationContext::new().with_always_write(true);
        let node = manager.write(&value, false, Some(&context)).unwrap();
        assert_eq!(node.as_mapping().unwrap().len(), 3);
        assert_eq!(manager.read::<Inventory>(&node, None).unwrap(), value);
    }

    #[test]
    fn read_keeps_missing_fields_of_existing() {
        let registry = registry();
        let dependencies = DependencyCollection::new();
        let manager = SerializationManager::new(&registry, &dependencies);

        let existing = Inventory {
            owner: String::from("bo"),
            slots: 4,
            items: vec![String::from("rope")],
        };
        let node: DataNode = MappingNode::from(vec![
            entry("slots", DataNode::scalar("8")),
            entry("items", [DataNode::scalar("lamp")].into_iter().collect::<SequenceNode>().into()),
        ])
        .into();
        let read = manager
            .read_into(&node, Some(existing), &mut HookContext::new(), None)
            .unwrap();
        assert_eq!(read.owner, "bo");
        assert_eq!(read.slots, 8);
        assert_eq!(read.items, ["rope", "lamp"]);
    }

    #[test]
    fn unknown_and_non_scalar_keys() {
        let registry = registry();
        let dependencies = DependencyCollection::new();
        let manager = SerializationManager::new(&registry, &dependencies);

        let node: DataNode = MappingNode::from(vec![entry("colour", DataNode::scalar("red"))]).into();
        let err = manager.read::<Inventory>(&node, None).unwrap_err();
        assert!(matches!(err, SerialError::UnknownField { ref field, .. } if field == "colour"));

        let report = manager.validate::<Inventory>(&node, None);
        let errors = report.errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].path, "/0/key");

        let node: DataNode = MappingNode::from(vec![(
            SequenceNode::new().into(),
            DataNode::scalar("1"),
        )])
        .into();
        let err = manager.read::<Inventory>(&node, None).unwrap_err();
        assert!(matches!(err, SerialError::InvalidNodeShape { .. }));
    }

    #[test]
    fn copy_into_reuses_field_buffers() {
        let registry = registry();
        let dependencies = DependencyCollection::new();
        let manager = SerializationManager::new(&registry, &dependencies);

        let source = Inventory {
            owner: String::from("bo"),
            slots: 2,
            items: vec![String::from("a")],
        };
        let mut target = Inventory {
            items: Vec::with_capacity(8),
            ..Default::default()
        };
        let buffer = target.items.as_ptr();
        manager.copy_into(&source, &mut target, None).unwrap();
        assert_eq!(target, source);
        assert_eq!(target.items.as_ptr(), buffer);
    }

    #[test]
    fn debug_lists_field_names() {
        let definition = DataDefinition::<Inventory>::new()
            .field("owner", |i| &i.owner, |i| &mut i.owner)
            .field("slots", |i| &i.slots, |i| &mut i.slots);
        assert_eq!(alloc::format!("{definition:?}"), r#"["owner", "slots"]"#);
        assert_eq!(definition.field_names().collect::<Vec<_>>(), ["owner", "slots"]);
    }

    #[test]
    #[should_panic(expected = "already has a field named `slots`")]
    fn duplicate_field_panics() {
        let _ = DataDefinition::<Inventory>::new()
            .field("slots", |i| &i.slots, |i| &mut i.slots)
            .field("slots", |i| &i.slots, |i| &mut i.slots);
    }
}
