use alloc::boxed::Box;
use alloc::sync::Arc;
use core::any::Any;

use vc_node::{DataNode, NodeKind, ValidationNode};

use crate::copy::{CopyOutcome, CopyPolicy};
use crate::info::{SharedInfo, TypeInfo, definition};
use crate::ops::Shared;
use crate::registry::{ErasedCopier, ErasedReader, ErasedValidator, ErasedWriter};
use crate::registry::{GenericSerializer, TypeSerializers};
use crate::serializers::mismatch;
use crate::{HookContext, SerialError, SerializationContext, SerializationManager};

// -----------------------------------------------------------------------------
// SharedSerializers

/// The serializer family of shared handles, `Arc<RwLock<T>>`.
///
/// A handle is written as the node of its inner value and read from any
/// node the inner type accepts. Handle identity is never serialized: two
/// handles to one value are written twice and read back as two values.
///
/// Reading into an existing handle replaces its inner value, so every
/// clone of the handle observes the read. Copying into a handle copies
/// into its inner value under the write lock, keeping the inner buffers
/// when the inner type allows it.
///
/// If the inner type has a registered
/// [`AfterDeserialize`](crate::AfterDeserialize) hook, every read queues
/// it on the [`HookContext`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SharedSerializers;

impl SharedSerializers {
    pub const DEFINITIONS: [&'static str; 1] = [definition::SHARED];
}

impl GenericSerializer for SharedSerializers {
    fn instantiate(&self, ty: &'static TypeInfo) -> Option<TypeSerializers> {
        let shared = ty.as_shared()?;
        let serializer = Arc::new(SharedSerializer { ty, shared });

        let mut table = TypeSerializers::new()
            .with_erased_writer(serializer.clone())
            .with_erased_copier(serializer);
        for kind in NodeKind::ALL {
            let reader = Arc::new(SharedReader { ty, shared, kind });
            table = table
                .with_erased_reader(reader.clone())
                .with_erased_validator(reader);
        }
        Some(table)
    }
}

// -----------------------------------------------------------------------------
// SharedSerializer

struct SharedSerializer {
    ty: &'static TypeInfo,
    shared: &'static SharedInfo,
}

impl SharedSerializer {
    fn handle<'a>(&self, value: &'a dyn Any) -> Result<&'a dyn Shared, SerialError> {
        self.shared.as_shared(value).ok_or_else(|| mismatch(self.ty))
    }

    /// Deep-copies the inner value of `source` under its read lock.
    fn copy_inner(
        &self,
        manager: SerializationManager<'_>,
        source: &dyn Any,
        context: Option<&SerializationContext>,
    ) -> Result<Box<dyn Any>, SerialError> {
        let inner = self.shared.inner();
        let mut result = Err(mismatch(self.ty));
        self.handle(source)?
            .with_inner(&mut |value| result = manager.copy_dyn(inner, value, context));
        result
    }
}

impl ErasedWriter for SharedSerializer {
    fn write(
        &self,
        manager: SerializationManager<'_>,
        value: &dyn Any,
        always_write: bool,
        context: Option<&SerializationContext>,
    ) -> Result<DataNode, SerialError> {
        let inner = self.shared.inner();
        let mut result = Err(mismatch(self.ty));
        self.handle(value)?.with_inner(&mut |value| {
            result = manager.write_dyn(inner, value, always_write, context);
        });
        result
    }
}

impl ErasedCopier for SharedSerializer {
    #[inline]
    fn policy(&self) -> CopyPolicy {
        CopyPolicy::Reuse
    }

    fn copy(
        &self,
        manager: SerializationManager<'_>,
        source: &dyn Any,
        context: Option<&SerializationContext>,
    ) -> Result<Box<dyn Any>, SerialError> {
        let inner = self.copy_inner(manager, source, context)?;
        self.shared.from_inner(inner)
    }

    fn copy_into(
        &self,
        manager: SerializationManager<'_>,
        source: &dyn Any,
        target: &mut dyn Any,
        context: Option<&SerializationContext>,
    ) -> Result<CopyOutcome, SerialError> {
        let source = self.handle(source)?;
        if source.same_handle(target) {
            return Ok(CopyOutcome::Reused);
        }
        let target = self.handle(target)?;

        let inner = self.shared.inner();
        let mut result = Err(mismatch(self.ty));
        source.with_inner(&mut |source| {
            target.with_inner_mut(&mut |target| {
                result = manager.copy_into_dyn(inner, source, target, context);
            });
        });
        // A fresh inner copy is swapped in once both locks are released.
        if let CopyOutcome::Fresh(value) = result? {
            target.replace_inner(value)?;
        }
        Ok(CopyOutcome::Reused)
    }
}

// -----------------------------------------------------------------------------
// SharedReader

/// Reader and validator of a shared handle for one node kind.
struct SharedReader {
    ty: &'static TypeInfo,
    shared: &'static SharedInfo,
    kind: NodeKind,
}

impl SharedReader {
    fn defer_hook(
        &self,
        manager: SerializationManager<'_>,
        hooks: &mut HookContext,
        value: &dyn Any,
    ) -> Result<(), SerialError> {
        let inner = self.shared.inner();
        let Some(hook) = manager.registry().hook(inner.id()) else {
            return Ok(());
        };
        let handle = self
            .shared
            .as_shared(value)
            .ok_or_else(|| mismatch(self.ty))?
            .handle();

        hooks.defer(inner.path(), move || {
            let mut result = Ok(());
            handle.with_inner_mut(&mut |value| result = hook(value));
            result
        });
        Ok(())
    }
}

impl ErasedReader for SharedReader {
    #[inline]
    fn node_kind(&self) -> NodeKind {
        self.kind
    }

    fn read(
        &self,
        manager: SerializationManager<'_>,
        node: &DataNode,
        hooks: &mut HookContext,
        context: Option<&SerializationContext>,
        existing: Option<Box<dyn Any>>,
    ) -> Result<Box<dyn Any>, SerialError> {
        let inner = manager.read_shared_inner(self.shared.inner(), node, hooks, context)?;

        let value = match existing {
            Some(existing) => {
                self.shared
                    .as_shared(&*existing)
                    .ok_or_else(|| mismatch(self.ty))?
                    .replace_inner(inner)?;
                existing
            }
            None => self.shared.from_inner(inner)?,
        };

        self.defer_hook(manager, hooks, &*value)?;
        Ok(value)
    }
}

impl ErasedValidator for SharedReader {
    #[inline]
    fn node_kind(&self) -> NodeKind {
        self.kind
    }

    #[inline]
    fn validate(
        &self,
        manager: SerializationManager<'_>,
        node: &DataNode,
        context: Option<&SerializationContext>,
    ) -> ValidationNode {
        manager.validate_dyn(self.shared.inner(), node, context)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use crate::{AfterDeserialize, DependencyCollection, HookContext, HookError, SerialError};
    use crate::{SerializationManager, SerializerRegistry, impl_typed};
    use alloc::boxed::Box;
    use alloc::string::String;
    use alloc::sync::Arc;
    use alloc::vec;
    use alloc::vec::Vec;
    use std::sync::RwLock;
    use vc_node::{DataNode, SequenceNode};

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Counter(u32);

    impl core::fmt::Display for Counter {
        fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
            write!(f, "{}", self.0)
        }
    }

    impl core::str::FromStr for Counter {
        type Err = core::num::ParseIntError;
        fn from_str(s: &str) -> Result<Self, Self::Err> {
            s.parse().map(Counter)
        }
    }

    impl AfterDeserialize for Counter {
        fn after_deserialization(&mut self) -> Result<(), HookError> {
            if self.0 == 0 {
                return Err(HookError::new("counter must not be zero"));
            }
            self.0 *= 10;
            Ok(())
        }
    }

    impl_typed!(Counter);

    fn registry() -> SerializerRegistry {
        let mut registry = SerializerRegistry::new();
        registry.register_serializer::<Counter, vc_node::ScalarNode, _>(
            crate::serializers::ScalarSerializer::new(),
        );
        registry.register_hook::<Counter>();
        registry
    }

    #[test]
    fn round_trip_inner_value() {
        let registry = SerializerRegistry::new();
        let dependencies = DependencyCollection::new();
        let manager = SerializationManager::new(&registry, &dependencies);

        let value = Arc::new(RwLock::new(vec![String::from("x")]));
        let node = manager.write(&value, false, None).unwrap();
        assert_eq!(node.as_sequence().unwrap().len(), 1);

        let back: Arc<RwLock<Vec<String>>> = manager.read(&node, None).unwrap();
        assert_eq!(*back.read().unwrap(), ["x"]);
        assert!(!Arc::ptr_eq(&back, &value));
    }

    #[test]
    fn read_into_existing_keeps_identity() {
        let registry = SerializerRegistry::new();
        let dependencies = DependencyCollection::new();
        let manager = SerializationManager::new(&registry, &dependencies);

        let handle = Arc::new(RwLock::new(1_u8));
        let observer = handle.clone();
        let read = manager
            .read_into(&DataNode::scalar("5"), Some(handle), &mut HookContext::new(), None)
            .unwrap();
        assert!(Arc::ptr_eq(&read, &observer));
        assert_eq!(*observer.read().unwrap(), 5);
    }

    #[test]
    fn hooks_run_after_the_whole_read() {
        let registry = registry();
        let dependencies = DependencyCollection::new();
        let manager = SerializationManager::new(&registry, &dependencies);

        let node: DataNode = ["1", "2"]
            .into_iter()
            .map(DataNode::scalar)
            .collect::<SequenceNode>()
            .into();
        let read: Vec<Arc<RwLock<Counter>>> = manager.read(&node, None).unwrap();
        let values: Vec<u32> = read.iter().map(|c| c.read().unwrap().0).collect();
        assert_eq!(values, [10, 20]);
    }

    #[test]
    fn hook_failures_are_aggregated() {
        let registry = registry();
        let dependencies = DependencyCollection::new();
        let manager = SerializationManager::new(&registry, &dependencies);

        let node: DataNode = ["0", "3", "0"]
            .into_iter()
            .map(DataNode::scalar)
            .collect::<SequenceNode>()
            .into();
        let err = manager
            .read::<Vec<Arc<RwLock<Counter>>>>(&node, None)
            .unwrap_err();
        let SerialError::Hook(failure) = err else {
            panic!("expected a hook failure, got {err:?}");
        };
        assert_eq!(failure.errors().len(), 2);
        assert!(failure.errors().iter().all(|e| e.message() == "counter must not be zero"));
    }

    #[test]
    fn deferred_hooks_wait_for_flush() {
        let registry = registry();
        let dependencies = DependencyCollection::new();
        let manager = SerializationManager::new(&registry, &dependencies);

        let mut hooks = HookContext::deferred();
        let first: Arc<RwLock<Counter>> = manager
            .read_with(&DataNode::scalar("1"), &mut hooks, None)
            .unwrap();
        let second: Arc<RwLock<Counter>> = manager
            .read_with(&DataNode::scalar("2"), &mut hooks, None)
            .unwrap();
        assert_eq!(first.read().unwrap().0, 1);
        assert_eq!(hooks.len(), 2);

        hooks.flush().unwrap();
        assert_eq!(first.read().unwrap().0, 10);
        assert_eq!(second.read().unwrap().0, 20);
    }

    #[test]
    fn failed_read_drops_queued_hooks() {
        let registry = registry();
        let dependencies = DependencyCollection::new();
        let manager = SerializationManager::new(&registry, &dependencies);

        let node: DataNode = ["1", "x"]
            .into_iter()
            .map(DataNode::scalar)
            .collect::<SequenceNode>()
            .into();
        let mut hooks = HookContext::new();
        let err = manager
            .read_with::<Vec<Arc<RwLock<Counter>>>>(&node, &mut hooks, None)
            .unwrap_err();
        assert!(matches!(err, SerialError::InvalidScalar { .. }));
        assert!(hooks.is_empty());
    }

    #[test]
    fn copy_into_self_does_not_deadlock() {
        let registry = SerializerRegistry::new();
        let dependencies = DependencyCollection::new();
        let manager = SerializationManager::new(&registry, &dependencies);

        let source = Arc::new(RwLock::new(vec![1_u8, 2]));
        let mut target = source.clone();
        manager.copy_into(&source, &mut target, None).unwrap();
        assert!(Arc::ptr_eq(&source, &target));
        assert_eq!(*source.read().unwrap(), [1, 2]);

        let copy = manager.copy(&source, None).unwrap();
        assert!(!Arc::ptr_eq(&source, &copy));
        assert_eq!(*copy.read().unwrap(), [1, 2]);
    }

    #[test]
    fn copy_into_reuses_the_inner_buffer() {
        let registry = SerializerRegistry::new();
        let dependencies = DependencyCollection::new();
        let manager = SerializationManager::new(&registry, &dependencies);

        let source = Arc::new(RwLock::new(vec![1_u8, 2, 3]));
        let mut target = Arc::new(RwLock::new(Vec::with_capacity(8)));
        target.write().unwrap().push(9_u8);
        let observer = target.clone();
        let buffer = target.read().unwrap().as_ptr();

        manager.copy_into(&source, &mut target, None).unwrap();
        assert!(Arc::ptr_eq(&target, &observer));
        assert_eq!(*observer.read().unwrap(), [1, 2, 3]);
        assert_eq!(observer.read().unwrap().as_ptr(), buffer);

        // Boxed slices cannot be refilled, the inner value is swapped instead.
        let source: Arc<RwLock<Box<[u8]>>> = Arc::new(RwLock::new(Box::new([4, 5])));
        let mut target: Arc<RwLock<Box<[u8]>>> = Arc::new(RwLock::new(Box::new([])));
        let observer = target.clone();
        manager.copy_into(&source, &mut target, None).unwrap();
        assert_eq!(**observer.read().unwrap(), [4, 5]);
    }
}
