use alloc::boxed::Box;
use alloc::string::ToString;
use alloc::sync::Arc;
use core::any::Any;

use vc_node::{DataNode, NodeKind, ValidationNode};

use crate::copy::CopyOutcome;
use crate::hooks::run_hook;
use crate::info::{TypeInfo, Typed};
use crate::ops::take;
use crate::{Capability, DependencyCollection, HookContext, HookMode, SerialError};
use crate::{SerializationContext, SerializerRegistry, TypeSerializers};

// -----------------------------------------------------------------------------
// SerializationManager

/// Entry point of writing, reading, validating and copying.
///
/// The manager is a pair of shared references and is `Copy`. Serializers
/// receive it in every call so that they can recurse into element types.
///
/// Serializers are resolved per call: a [`SerializationContext`] override
/// first, then the [`SerializerRegistry`].
///
/// # Example
///
/// ```
/// use vc_node::DataNode;
/// use vc_serial::{DependencyCollection, SerializationManager, SerializerRegistry};
///
/// let registry = SerializerRegistry::new();
/// let dependencies = DependencyCollection::new();
/// let manager = SerializationManager::new(&registry, &dependencies);
///
/// let node = manager.write(&vec![1_u8, 2, 3], false, None).unwrap();
/// let back: Vec<u8> = manager.read(&node, None).unwrap();
/// assert_eq!(back, [1, 2, 3]);
///
/// let report = manager.validate::<Vec<u8>>(&DataNode::scalar("1"), None);
/// assert!(!report.is_valid());
/// ```
#[derive(Clone, Copy, Debug)]
pub struct SerializationManager<'a> {
    registry: &'a SerializerRegistry,
    dependencies: &'a DependencyCollection,
}

impl<'a> SerializationManager<'a> {
    #[inline]
    pub const fn new(registry: &'a SerializerRegistry, dependencies: &'a DependencyCollection) -> Self {
        Self {
            registry,
            dependencies,
        }
    }

    #[inline]
    pub const fn registry(&self) -> &'a SerializerRegistry {
        self.registry
    }

    #[inline]
    pub const fn dependencies(&self) -> &'a DependencyCollection {
        self.dependencies
    }

    /// Resolves the serializers of `ty`, honoring the overrides of `context`.
    pub fn resolve(
        &self,
        ty: &'static TypeInfo,
        context: Option<&SerializationContext>,
    ) -> Option<Arc<TypeSerializers>> {
        if let Some(table) = context.and_then(|context| context.get_override(ty.id())) {
            return Some(table.clone());
        }
        self.registry.resolve(ty)
    }

    fn resolve_or_err(
        &self,
        ty: &'static TypeInfo,
        capability: Capability,
        context: Option<&SerializationContext>,
    ) -> Result<Arc<TypeSerializers>, SerialError> {
        self.resolve(ty, context)
            .ok_or(SerialError::NoSerializerFound {
                type_path: ty.path(),
                capability,
            })
    }

    // -------------------------------------------------------------------------
    // Write

    /// Writes `value` to a document tree.
    ///
    /// Values equal to their default may be omitted unless `always_write`
    /// is set, here or on the context.
    #[inline]
    pub fn write<V: Typed>(
        &self,
        value: &V,
        always_write: bool,
        context: Option<&SerializationContext>,
    ) -> Result<DataNode, SerialError> {
        self.write_dyn(V::type_info(), value, always_write, context)
    }

    /// Type-erased [`write`](Self::write); `value` must be of type `ty`.
    pub fn write_dyn(
        &self,
        ty: &'static TypeInfo,
        value: &dyn Any,
        always_write: bool,
        context: Option<&SerializationContext>,
    ) -> Result<DataNode, SerialError> {
        let table = self.resolve_or_err(ty, Capability::Write, context)?;
        let writer = table.writer().ok_or(SerialError::NoSerializerFound {
            type_path: ty.path(),
            capability: Capability::Write,
        })?;
        let always_write = always_write || context.is_some_and(SerializationContext::always_write);
        writer.write(*self, value, always_write, context)
    }

    // -------------------------------------------------------------------------
    // Read

    /// Reads a `V` from `node`, then runs the post-read hooks queued while
    /// reading.
    #[inline]
    pub fn read<V: Typed>(
        &self,
        node: &DataNode,
        context: Option<&SerializationContext>,
    ) -> Result<V, SerialError> {
        self.read_with(node, &mut HookContext::new(), context)
    }

    /// Reads a `V` from `node`, queueing post-read hooks on `hooks`.
    ///
    /// With an [`Immediate`](crate::HookMode::Immediate) context the
    /// outermost read flushes it; with a deferred one the caller does.
    /// The hook of the returned value itself runs before this returns in
    /// both modes, after the queue in immediate mode.
    #[inline]
    pub fn read_with<V: Typed>(
        &self,
        node: &DataNode,
        hooks: &mut HookContext,
        context: Option<&SerializationContext>,
    ) -> Result<V, SerialError> {
        self.read_into(node, None, hooks, context)
    }

    /// Reads a `V` from `node`, offering `existing` for reuse.
    ///
    /// Whether `existing` is reused depends on the reader; a mutable list,
    /// for example, appends to it.
    pub fn read_into<V: Typed>(
        &self,
        node: &DataNode,
        existing: Option<V>,
        hooks: &mut HookContext,
        context: Option<&SerializationContext>,
    ) -> Result<V, SerialError> {
        let existing = existing.map(|value| Box::new(value) as Box<dyn Any>);
        let value = self.read_dyn(V::type_info(), node, existing, hooks, context)?;
        take(value)
    }

    /// Type-erased [`read_into`](Self::read_into); the result is of type `ty`.
    pub fn read_dyn(
        &self,
        ty: &'static TypeInfo,
        node: &DataNode,
        existing: Option<Box<dyn Any>>,
        hooks: &mut HookContext,
        context: Option<&SerializationContext>,
    ) -> Result<Box<dyn Any>, SerialError> {
        self.read_node(ty, node, existing, hooks, context, false)
    }

    /// Reads the inner value of a shared handle, whose reader queues the
    /// post-read hook itself.
    pub(crate) fn read_shared_inner(
        &self,
        ty: &'static TypeInfo,
        node: &DataNode,
        hooks: &mut HookContext,
        context: Option<&SerializationContext>,
    ) -> Result<Box<dyn Any>, SerialError> {
        self.read_node(ty, node, None, hooks, context, true)
    }

    fn read_node(
        &self,
        ty: &'static TypeInfo,
        node: &DataNode,
        existing: Option<Box<dyn Any>>,
        hooks: &mut HookContext,
        context: Option<&SerializationContext>,
        hook_queued: bool,
    ) -> Result<Box<dyn Any>, SerialError> {
        let table = self.resolve_or_err(ty, Capability::Read, context)?;
        let Some(reader) = table.reader(node.kind()) else {
            return Err(Self::missing_node_kind(
                ty,
                Capability::Read,
                node.kind(),
                table.reader_kinds().next(),
            ));
        };

        hooks.enter();
        let result = reader.read(*self, node, hooks, context, existing);
        let outermost = hooks.exit();
        let mut value = match result {
            Ok(value) => value,
            Err(err) => {
                if outermost {
                    hooks.discard();
                }
                return Err(err);
            }
        };

        let hook = if hook_queued {
            None
        } else {
            self.registry.hook(ty.id())
        };
        if outermost {
            match (hooks.mode(), hook) {
                (HookMode::Immediate, Some(hook)) => {
                    hooks.flush_then(ty.path(), || hook(&mut *value))?;
                }
                (HookMode::Immediate, None) => hooks.flush()?,
                (HookMode::Deferred, Some(hook)) => run_hook(ty.path(), || hook(&mut *value))?,
                (HookMode::Deferred, None) => {}
            }
        } else if hook.is_some() {
            log::warn!(
                "`{}` is read by value inside another value, its post-read hook is skipped; \
                 read it behind `Arc<RwLock<_>>` for the hook to run",
                ty.path()
            );
        }
        Ok(value)
    }

    fn missing_node_kind(
        ty: &'static TypeInfo,
        capability: Capability,
        found: NodeKind,
        expected: Option<NodeKind>,
    ) -> SerialError {
        match expected {
            Some(expected) => SerialError::InvalidNodeShape {
                type_path: ty.path(),
                expected,
                found,
            },
            None => SerialError::NoSerializerFound {
                type_path: ty.path(),
                capability,
            },
        }
    }

    // -------------------------------------------------------------------------
    // Validate

    /// Checks whether `node` could be read as a `V`.
    ///
    /// Never fails: every problem, including a missing validator, is
    /// reported in the returned tree.
    #[inline]
    pub fn validate<V: Typed>(
        &self,
        node: &DataNode,
        context: Option<&SerializationContext>,
    ) -> ValidationNode {
        self.validate_dyn(V::type_info(), node, context)
    }

    /// Type-erased [`validate`](Self::validate).
    pub fn validate_dyn(
        &self,
        ty: &'static TypeInfo,
        node: &DataNode,
        context: Option<&SerializationContext>,
    ) -> ValidationNode {
        let table = match self.resolve_or_err(ty, Capability::Validate, context) {
            Ok(table) => table,
            Err(err) => return ValidationNode::fail(err.to_string()),
        };
        match table.validator(node.kind()) {
            Some(validator) => validator.validate(*self, node, context),
            None => {
                let expected = table.validator_kinds().next();
                let err = Self::missing_node_kind(ty, Capability::Validate, node.kind(), expected);
                ValidationNode::fail(err.to_string())
            }
        }
    }

    // -------------------------------------------------------------------------
    // Copy

    /// Builds an independent deep copy of `source`.
    #[inline]
    pub fn copy<V: Typed>(
        &self,
        source: &V,
        context: Option<&SerializationContext>,
    ) -> Result<V, SerialError> {
        take(self.copy_dyn(V::type_info(), source, context)?)
    }

    /// Makes `target` a deep copy of `source` and returns it.
    ///
    /// Depending on the type's [`CopyPolicy`](crate::copy::CopyPolicy),
    /// `target` is refilled in place or overwritten with a fresh copy.
    pub fn copy_into<'t, V: Typed>(
        &self,
        source: &V,
        target: &'t mut V,
        context: Option<&SerializationContext>,
    ) -> Result<&'t mut V, SerialError> {
        match self.copy_into_dyn(V::type_info(), source, target, context)? {
            CopyOutcome::Reused => {}
            CopyOutcome::Fresh(value) => *target = take(value)?,
        }
        Ok(target)
    }

    /// Type-erased [`copy`](Self::copy); `source` must be of type `ty`.
    pub fn copy_dyn(
        &self,
        ty: &'static TypeInfo,
        source: &dyn Any,
        context: Option<&SerializationContext>,
    ) -> Result<Box<dyn Any>, SerialError> {
        let table = self.resolve_or_err(ty, Capability::Copy, context)?;
        let copier = table.copier().ok_or(SerialError::NoSerializerFound {
            type_path: ty.path(),
            capability: Capability::Copy,
        })?;
        copier.copy(*self, source, context)
    }

    /// Type-erased [`copy_into`](Self::copy_into).
    ///
    /// On [`CopyOutcome::Fresh`] the caller must put the returned value in
    /// place of `target`.
    pub fn copy_into_dyn(
        &self,
        ty: &'static TypeInfo,
        source: &dyn Any,
        target: &mut dyn Any,
        context: Option<&SerializationContext>,
    ) -> Result<CopyOutcome, SerialError> {
        let table = self.resolve_or_err(ty, Capability::Copy, context)?;
        let copier = table.copier().ok_or(SerialError::NoSerializerFound {
            type_path: ty.path(),
            capability: Capability::Copy,
        })?;
        copier.copy_into(*self, source, target, context)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use crate::info::Typed;
    use crate::registry::{TypeSerializers, TypeWriter};
    use crate::serializers::DataDefinition;
    use crate::{AfterDeserialize, Capability, DependencyCollection, HookContext, HookError};
    use crate::{SerialError, SerializationContext, SerializationManager, SerializerRegistry};
    use crate::impl_typed;
    use alloc::boxed::Box;
    use alloc::format;
    use alloc::string::{String, ToString};
    use alloc::vec;
    use alloc::sync::Arc;
    use alloc::vec::Vec;
    use std::collections::HashMap;
    use std::sync::RwLock;
    use vc_node::{DataNode, MappingNode, SequenceNode};

    fn sequence(values: &[&str]) -> DataNode {
        values
            .iter()
            .map(|v| DataNode::scalar(*v))
            .collect::<SequenceNode>()
            .into()
    }

    #[test]
    fn scenario_a_mutable_list_round_trip() {
        let registry = SerializerRegistry::new();
        let dependencies = DependencyCollection::new();
        let manager = SerializationManager::new(&registry, &dependencies);

        let node = manager.write(&vec![1_i32, 2, 3], false, None).unwrap();
        assert_eq!(node, sequence(&["1", "2", "3"]));
        assert_eq!(manager.read::<Vec<i32>>(&node, None).unwrap(), [1, 2, 3]);
    }

    #[test]
    fn scenario_b_empty_collection() {
        let registry = SerializerRegistry::new();
        let dependencies = DependencyCollection::new();
        let manager = SerializationManager::new(&registry, &dependencies);

        let empty: Box<[u8]> = Box::new([]);
        let node = manager.write(&empty, false, None).unwrap();
        assert_eq!(node.as_sequence().map(SequenceNode::len), Some(0));
        assert!(manager.read::<Box<[u8]>>(&node, None).unwrap().is_empty());
    }

    #[test]
    fn scenario_c_validation_keeps_shape() {
        let registry = SerializerRegistry::new();
        let dependencies = DependencyCollection::new();
        let manager = SerializationManager::new(&registry, &dependencies);

        let report = manager.validate::<Vec<i32>>(&sequence(&["1", "two", "3"]), None);
        let vc_node::ValidationNode::Sequence(children) = &report else {
            panic!("expected a sequence report, got {report:?}");
        };
        assert_eq!(children.len(), 3);
        let passed: Vec<bool> = children.iter().map(|c| c.is_valid()).collect();
        assert_eq!(passed, [true, false, true]);
    }

    #[test]
    fn scenario_d_copy_into_clears_target() {
        let registry = SerializerRegistry::new();
        let dependencies = DependencyCollection::new();
        let manager = SerializationManager::new(&registry, &dependencies);

        let source = vec![1_u64, 2, 3, 4, 5];
        let mut target = vec![8_u64, 9];
        let target_ptr: *const Vec<u64> = &target;

        let returned = manager.copy_into(&source, &mut target, None).unwrap();
        assert!(core::ptr::eq(returned, target_ptr));
        assert_eq!(*returned, source);
    }

    #[test]
    fn scenario_e_wrong_element_kind() {
        let registry = SerializerRegistry::new();
        let dependencies = DependencyCollection::new();
        let manager = SerializationManager::new(&registry, &dependencies);

        let err = manager
            .read::<Vec<HashMap<String, u8>>>(&sequence(&["a"]), None)
            .unwrap_err();
        assert!(matches!(err, SerialError::InvalidNodeShape { .. }));
    }

    #[test]
    fn missing_serializer() {
        let registry = SerializerRegistry::empty();
        let dependencies = DependencyCollection::new();
        let manager = SerializationManager::new(&registry, &dependencies);

        let err = manager.write(&1_u8, false, None).unwrap_err();
        assert!(matches!(
            err,
            SerialError::NoSerializerFound {
                type_path: "u8",
                capability: Capability::Write,
            }
        ));
        assert!(!manager.validate::<u8>(&DataNode::scalar("1"), None).is_valid());
        assert!(manager.copy(&1_u8, None).is_err());
    }

    #[test]
    fn validate_reports_wrong_kind() {
        let registry = SerializerRegistry::new();
        let dependencies = DependencyCollection::new();
        let manager = SerializationManager::new(&registry, &dependencies);

        let report = manager.validate::<u8>(&MappingNode::new().into(), None);
        let errors = report.errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].path, "/");
        assert_eq!(errors[0].message, "`u8` expects a scalar node, found a mapping node");
    }

    struct Fixed;

    impl TypeWriter<f32> for Fixed {
        fn write(
            &self,
            _manager: SerializationManager<'_>,
            value: &f32,
            _always_write: bool,
            _context: Option<&SerializationContext>,
        ) -> Result<DataNode, SerialError> {
            Ok(DataNode::scalar(format!("{value:.2}")))
        }
    }

    #[test]
    fn context_override_reaches_nested_elements() {
        let registry = SerializerRegistry::new();
        let dependencies = DependencyCollection::new();
        let manager = SerializationManager::new(&registry, &dependencies);

        let values = vec![0.5_f32, 1.0];
        let mut context = SerializationContext::new();
        context.override_table::<f32>(TypeSerializers::new().with_writer::<f32, _>(Fixed));

        let node = manager.write(&values, false, Some(&context)).unwrap();
        assert_eq!(node, sequence(&["0.50", "1.00"]));

        let node = manager.write(&values, false, None).unwrap();
        assert_eq!(node, sequence(&["0.5", "1"]));

        // The override hides the registered reader.
        let err = manager.read::<f32>(&DataNode::scalar("1"), Some(&context)).unwrap_err();
        assert!(matches!(
            err,
            SerialError::NoSerializerFound {
                capability: Capability::Read,
                ..
            }
        ));
    }

    struct Palette {
        names: Vec<&'static str>,
    }

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Colour(usize);

    impl_typed!(Colour);

    struct ColourName;

    impl TypeWriter<Colour> for ColourName {
        fn write(
            &self,
            manager: SerializationManager<'_>,
            value: &Colour,
            _always_write: bool,
            _context: Option<&SerializationContext>,
        ) -> Result<DataNode, SerialError> {
            let palette = manager.dependencies().resolve::<Palette>()?;
            let name = palette.names.get(value.0).copied().unwrap_or("unknown");
            Ok(DataNode::scalar(name))
        }
    }

    #[test]
    fn serializers_use_dependencies() {
        let mut registry = SerializerRegistry::new();
        registry.register_writer::<Colour, _>(ColourName);

        let mut dependencies = DependencyCollection::new();
        let manager = SerializationManager::new(&registry, &dependencies);
        let err = manager.write(&Colour(1), false, None).unwrap_err();
        assert!(matches!(err, SerialError::MissingDependency { .. }));

        dependencies.insert(Palette {
            names: vec!["red", "green"],
        });
        let manager = SerializationManager::new(&registry, &dependencies);
        let node = manager.write(&vec![Colour(1), Colour(0)], false, None).unwrap();
        assert_eq!(node, sequence(&["green", "red"]));
    }

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Settings {
        volume: u8,
        tags: Vec<String>,
    }

    impl_typed!(Settings);

    #[test]
    fn always_write_reaches_nested_definitions() {
        let mut registry = SerializerRegistry::new();
        registry.register_serializer::<Settings, MappingNode, _>(
            DataDefinition::new()
                .field("volume", |s: &Settings| &s.volume, |s| &mut s.volume)
                .field("tags", |s: &Settings| &s.tags, |s| &mut s.tags),
        );
        let dependencies = DependencyCollection::new();
        let manager = SerializationManager::new(&registry, &dependencies);

        let values = vec![Settings::default()];
        let sparse = manager.write(&values, false, None).unwrap();
        let dense = manager.write(&values, true, None).unwrap();

        let first = |node: &DataNode| node.as_sequence().unwrap().get(0).unwrap().clone();
        assert_eq!(first(&sparse), DataNode::from(MappingNode::new()));
        assert_eq!(first(&dense).as_mapping().unwrap().len(), 2);

        assert_eq!(manager.read::<Vec<Settings>>(&dense, None).unwrap(), values);
        assert_eq!(manager.copy(&values, None).unwrap(), values);
    }

    #[test]
    fn dyn_operations_match_typed_ones() {
        let registry = SerializerRegistry::new();
        let dependencies = DependencyCollection::new();
        let manager = SerializationManager::new(&registry, &dependencies);

        let ty = <Vec<String> as Typed>::type_info();
        let value = vec!["a".to_string()];
        let node = manager.write_dyn(ty, &value, false, None).unwrap();
        assert_eq!(node, manager.write(&value, false, None).unwrap());

        let copy = manager.copy_dyn(ty, &value, None).unwrap();
        assert_eq!(copy.downcast_ref::<Vec<String>>(), Some(&value));

        let err = manager.write_dyn(ty, &1_u8, false, None).unwrap_err();
        assert!(matches!(err, SerialError::TypeMismatch { .. }));
    }

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Gauge {
        level: u8,
        ready: bool,
    }

    impl AfterDeserialize for Gauge {
        fn after_deserialization(&mut self) -> Result<(), HookError> {
            if self.level > 100 {
                return Err(HookError::new("level above 100"));
            }
            self.ready = true;
            Ok(())
        }
    }

    impl_typed!(Gauge);

    fn gauge_registry() -> SerializerRegistry {
        let mut registry = SerializerRegistry::new();
        registry.register_serializer::<Gauge, MappingNode, _>(
            DataDefinition::new().field("level", |g: &Gauge| &g.level, |g| &mut g.level),
        );
        registry.register_hook::<Gauge>();
        registry
    }

    fn gauge(level: &str) -> DataNode {
        [(DataNode::scalar("level"), DataNode::scalar(level))]
            .into_iter()
            .collect::<MappingNode>()
            .into()
    }

    fn gauges(levels: &[&str]) -> DataNode {
        levels
            .iter()
            .map(|level| gauge(level))
            .collect::<SequenceNode>()
            .into()
    }

    #[test]
    fn top_level_value_runs_its_hook() {
        let registry = gauge_registry();
        let dependencies = DependencyCollection::new();
        let manager = SerializationManager::new(&registry, &dependencies);

        let read: Gauge = manager.read(&gauge("40"), None).unwrap();
        assert_eq!(read, Gauge { level: 40, ready: true });

        let mut hooks = HookContext::deferred();
        let read: Gauge = manager.read_with(&gauge("7"), &mut hooks, None).unwrap();
        assert!(read.ready);
        assert!(hooks.is_empty());

        let err = manager.read::<Gauge>(&gauge("200"), None).unwrap_err();
        let SerialError::Hook(failure) = err else {
            panic!("expected a hook failure, got {err:?}");
        };
        assert_eq!(failure.errors().len(), 1);
        assert_eq!(failure.errors()[0].type_path(), Some(Gauge::type_info().path()));
    }

    #[test]
    fn hooks_only_reach_values_with_a_stable_place() {
        let registry = gauge_registry();
        let dependencies = DependencyCollection::new();
        let manager = SerializationManager::new(&registry, &dependencies);

        // By value inside a list: skipped with a warning.
        let read: Vec<Gauge> = manager.read(&gauges(&["1", "2"]), None).unwrap();
        assert!(read.iter().all(|g| !g.ready));

        let read: Vec<Arc<RwLock<Gauge>>> = manager.read(&gauges(&["1", "2"]), None).unwrap();
        assert!(read.iter().all(|g| g.read().unwrap().ready));
    }

    #[test]
    fn failed_deferred_read_keeps_only_earlier_hooks() {
        let registry = gauge_registry();
        let dependencies = DependencyCollection::new();
        let manager = SerializationManager::new(&registry, &dependencies);

        let mut hooks = HookContext::deferred();
        let first: Arc<RwLock<Gauge>> = manager.read_with(&gauge("3"), &mut hooks, None).unwrap();
        assert_eq!(hooks.len(), 1);

        let err = manager
            .read_with::<Vec<Arc<RwLock<Gauge>>>>(&gauges(&["1", "x"]), &mut hooks, None)
            .unwrap_err();
        assert!(matches!(err, SerialError::InvalidScalar { .. }));
        assert_eq!(hooks.len(), 1);

        hooks.flush().unwrap();
        assert!(first.read().unwrap().ready);
    }
}
