use alloc::boxed::Box;
use alloc::string::ToString;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::Any;

use vc_node::{DataNode, NodeKind, SequenceNode, ValidatedSequenceNode, ValidationNode};

use crate::copy::{CopyOutcome, CopyPolicy};
use crate::info::{ListInfo, TypeInfo, definition};
use crate::registry::{ErasedCopier, ErasedReader, ErasedValidator, ErasedWriter};
use crate::registry::{GenericSerializer, TypeSerializers};
use crate::serializers::{invalid_shape, mismatch, unused_target};
use crate::{HookContext, SerialError, SerializationContext, SerializationManager};

// -----------------------------------------------------------------------------
// ListSerializers

/// The serializer family of list types, written as sequence nodes.
///
/// | shape                | read with an existing instance | copy into a target     |
/// |----------------------|--------------------------------|------------------------|
/// | `Vec`, `VecDeque`    | appends to it                  | refills it in place    |
/// | `Cow<'static, [T]>`  | drops it with a warning        | refills it if owned    |
/// | `Box<[T]>`           | drops it with a warning        | replaces it            |
/// | `Arc<[T]>`           | drops it with a warning        | replaces it            |
///
/// Element order is preserved in both directions.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListSerializers;

impl ListSerializers {
    pub const DEFINITIONS: [&'static str; 5] = [
        definition::VEC,
        definition::VEC_DEQUE,
        definition::COW_SLICE,
        definition::BOXED_SLICE,
        definition::ARC_SLICE,
    ];
}

impl GenericSerializer for ListSerializers {
    fn instantiate(&self, ty: &'static TypeInfo) -> Option<TypeSerializers> {
        let list = ty.as_list()?;
        Some(TypeSerializers::from_erased(Arc::new(ListSerializer { ty, list })))
    }
}

// -----------------------------------------------------------------------------
// ListSerializer

struct ListSerializer {
    ty: &'static TypeInfo,
    list: &'static ListInfo,
}

impl ListSerializer {
    fn copy_items(
        &self,
        manager: SerializationManager<'_>,
        source: &dyn Any,
        context: Option<&SerializationContext>,
    ) -> Result<Vec<Box<dyn Any>>, SerialError> {
        let source = self.list.as_list(source).ok_or_else(|| mismatch(self.ty))?;
        let item = self.list.item();
        source
            .iter()
            .map(|element| manager.copy_dyn(item, element, context))
            .collect()
    }
}

impl ErasedWriter for ListSerializer {
    fn write(
        &self,
        manager: SerializationManager<'_>,
        value: &dyn Any,
        always_write: bool,
        context: Option<&SerializationContext>,
    ) -> Result<DataNode, SerialError> {
        let list = self.list.as_list(value).ok_or_else(|| mismatch(self.ty))?;
        let item = self.list.item();

        let mut node = SequenceNode::with_capacity(list.len());
        for element in list.iter() {
            node.push(manager.write_dyn(item, element, always_write, context)?);
        }
        Ok(node.into())
    }
}

impl ErasedReader for ListSerializer {
    #[inline]
    fn node_kind(&self) -> NodeKind {
        NodeKind::Sequence
    }

    fn read(
        &self,
        manager: SerializationManager<'_>,
        node: &DataNode,
        hooks: &mut HookContext,
        context: Option<&SerializationContext>,
        existing: Option<Box<dyn Any>>,
    ) -> Result<Box<dyn Any>, SerialError> {
        let sequence = node
            .as_sequence()
            .ok_or_else(|| invalid_shape(self.ty, NodeKind::Sequence, node))?;
        let item = self.list.item();

        if let Some(mut existing) = existing {
            if self.list.shape().reads_into_existing()
                && let Some(storage) = self
                    .list
                    .as_list_mut(&mut *existing)
                    .and_then(|list| list.storage())
            {
                storage.reserve(sequence.len());
                for child in sequence {
                    storage.push(manager.read_dyn(item, child, None, hooks, context)?)?;
                }
                return Ok(existing);
            }
            unused_target(self.ty);
        }

        let items = sequence
            .iter()
            .map(|child| manager.read_dyn(item, child, None, hooks, context))
            .collect::<Result<Vec<_>, _>>()?;
        self.list.from_items(items)
    }
}

impl ErasedValidator for ListSerializer {
    #[inline]
    fn node_kind(&self) -> NodeKind {
        NodeKind::Sequence
    }

    fn validate(
        &self,
        manager: SerializationManager<'_>,
        node: &DataNode,
        context: Option<&SerializationContext>,
    ) -> ValidationNode {
        let Some(sequence) = node.as_sequence() else {
            return ValidationNode::fail(invalid_shape(self.ty, NodeKind::Sequence, node).to_string());
        };
        let item = self.list.item();
        sequence
            .iter()
            .map(|child| manager.validate_dyn(item, child, context))
            .collect::<ValidatedSequenceNode>()
            .into()
    }
}

impl ErasedCopier for ListSerializer {
    #[inline]
    fn policy(&self) -> CopyPolicy {
        self.list.shape().copy_policy()
    }

    fn copy(
        &self,
        manager: SerializationManager<'_>,
        source: &dyn Any,
        context: Option<&SerializationContext>,
    ) -> Result<Box<dyn Any>, SerialError> {
        let items = self.copy_items(manager, source, context)?;
        self.list.from_items(items)
    }

    fn copy_into(
        &self,
        manager: SerializationManager<'_>,
        source: &dyn Any,
        target: &mut dyn Any,
        context: Option<&SerializationContext>,
    ) -> Result<CopyOutcome, SerialError> {
        if self.policy().may_reuse()
            && let Some(storage) = self
                .list
                .as_list_mut(target)
                .and_then(|list| list.storage())
        {
            // Copy first, so that a failing element leaves the target untouched.
            let items = self.copy_items(manager, source, context)?;
            storage.clear();
            storage.reserve(items.len());
            for item in items {
                storage.push(item)?;
            }
            return Ok(CopyOutcome::Reused);
        }
        self.copy(manager, source, context).map(CopyOutcome::Fresh)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use crate::{DependencyCollection, HookContext, SerialError};
    use crate::{SerializationManager, SerializerRegistry};
    use alloc::borrow::Cow;
    use alloc::boxed::Box;
    use alloc::collections::VecDeque;
    use alloc::string::String;
    use alloc::sync::Arc;
    use alloc::vec;
    use alloc::vec::Vec;
    use vc_node::{DataNode, NodeKind, SequenceNode};

    fn sequence(values: &[&str]) -> DataNode {
        values
            .iter()
            .map(|v| DataNode::scalar(*v))
            .collect::<SequenceNode>()
            .into()
    }

    #[test]
    fn write_keeps_order() {
        let registry = SerializerRegistry::new();
        let dependencies = DependencyCollection::new();
        let manager = SerializationManager::new(&registry, &dependencies);

        let node = manager.write(&vec![3, 1, 2], false, None).unwrap();
        assert_eq!(node, sequence(&["3", "1", "2"]));

        let back: Vec<i32> = manager.read(&node, None).unwrap();
        assert_eq!(back, [3, 1, 2]);
    }

    #[test]
    fn every_list_shape_round_trips() {
        let registry = SerializerRegistry::new();
        let dependencies = DependencyCollection::new();
        let manager = SerializationManager::new(&registry, &dependencies);
        let node = sequence(&["1", "2"]);

        let deque: VecDeque<u8> = manager.read(&node, None).unwrap();
        assert_eq!(deque, [1, 2]);
        let cow: Cow<'static, [u8]> = manager.read(&node, None).unwrap();
        assert_eq!(&*cow, [1, 2]);
        let boxed: Box<[u8]> = manager.read(&node, None).unwrap();
        assert_eq!(&*boxed, [1, 2]);
        let shared: Arc<[u8]> = manager.read(&node, None).unwrap();
        assert_eq!(manager.write(&shared, false, None).unwrap(), node);
    }

    #[test]
    fn read_appends_to_existing_vec() {
        let registry = SerializerRegistry::new();
        let dependencies = DependencyCollection::new();
        let manager = SerializationManager::new(&registry, &dependencies);

        let existing = vec![9_u8];
        let read = manager
            .read_into(&sequence(&["1", "2"]), Some(existing), &mut HookContext::new(), None)
            .unwrap();
        assert_eq!(read, [9, 1, 2]);

        let existing: Box<[u8]> = Box::new([9]);
        let read = manager
            .read_into(&sequence(&["1"]), Some(existing), &mut HookContext::new(), None)
            .unwrap();
        assert_eq!(&*read, [1]);
    }

    #[test]
    fn failing_element_aborts_read() {
        let registry = SerializerRegistry::new();
        let dependencies = DependencyCollection::new();
        let manager = SerializationManager::new(&registry, &dependencies);

        let err = manager
            .read::<Vec<u8>>(&sequence(&["1", "x", "3"]), None)
            .unwrap_err();
        assert!(matches!(err, SerialError::InvalidScalar { .. }));

        let err = manager
            .read::<Vec<u8>>(&DataNode::scalar("1"), None)
            .unwrap_err();
        assert!(matches!(
            err,
            SerialError::InvalidNodeShape {
                expected: NodeKind::Sequence,
                found: NodeKind::Scalar,
                ..
            }
        ));
    }

    #[test]
    fn validate_reports_each_element() {
        let registry = SerializerRegistry::new();
        let dependencies = DependencyCollection::new();
        let manager = SerializationManager::new(&registry, &dependencies);

        let report = manager.validate::<Vec<u8>>(&sequence(&["1", "x", "3", "y"]), None);
        let errors = report.errors();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].path, "/1");
        assert_eq!(errors[1].path, "/3");

        assert!(manager.validate::<Vec<u8>>(&sequence(&[]), None).is_valid());
    }

    #[test]
    fn copy_into_vec_reuses_buffer() {
        let registry = SerializerRegistry::new();
        let dependencies = DependencyCollection::new();
        let manager = SerializationManager::new(&registry, &dependencies);

        let source = vec![vec![1_u8], vec![2, 3]];
        let mut target: Vec<Vec<u8>> = Vec::with_capacity(16);
        target.push(vec![7]);
        let buffer = target.as_ptr();

        let copied = manager.copy_into(&source, &mut target, None).unwrap();
        assert_eq!(*copied, source);
        assert_eq!(copied.as_ptr(), buffer);
        assert_ne!(copied[1].as_ptr(), source[1].as_ptr());
    }

    #[test]
    fn copy_into_follows_list_shape() {
        let registry = SerializerRegistry::new();
        let dependencies = DependencyCollection::new();
        let manager = SerializationManager::new(&registry, &dependencies);

        // Owned `Cow` storage is reused.
        let source: Cow<'static, [u8]> = Cow::Owned(vec![1, 2]);
        let mut target: Cow<'static, [u8]> = Cow::Owned(Vec::with_capacity(8));
        let buffer = target.as_ptr();
        manager.copy_into(&source, &mut target, None).unwrap();
        assert_eq!(&*target, [1, 2]);
        assert_eq!(target.as_ptr(), buffer);

        // `Arc<[T]>` is immutable: the target handle is replaced.
        let source: Arc<[u8]> = Arc::from(vec![4, 5]);
        let mut target: Arc<[u8]> = Arc::from(vec![0]);
        let previous = target.clone();
        manager.copy_into(&source, &mut target, None).unwrap();
        assert_eq!(&*target, [4, 5]);
        assert!(!Arc::ptr_eq(&target, &source));
        assert_eq!(&*previous, [0]);
    }

    #[test]
    fn copy_is_idempotent() {
        let registry = SerializerRegistry::new();
        let dependencies = DependencyCollection::new();
        let manager = SerializationManager::new(&registry, &dependencies);

        let source = vec![String::from("a"), String::from("b")];
        let mut once = manager.copy(&source, None).unwrap();
        let expected = once.clone();
        manager.copy_into(&source, &mut once, None).unwrap();
        assert_eq!(once, expected);
    }
}
