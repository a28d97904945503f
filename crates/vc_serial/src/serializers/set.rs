use alloc::boxed::Box;
use alloc::string::ToString;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::Any;

use vc_node::{DataNode, NodeKind, SequenceNode, ValidatedSequenceNode, ValidationNode};

use crate::copy::{CopyOutcome, CopyPolicy};
use crate::info::{SetInfo, TypeInfo, definition};
use crate::registry::{ErasedCopier, ErasedReader, ErasedValidator, ErasedWriter};
use crate::registry::{GenericSerializer, TypeSerializers};
use crate::serializers::{invalid_shape, mismatch};
use crate::{HookContext, SerialError, SerializationContext, SerializationManager};

// -----------------------------------------------------------------------------
// SetSerializers

/// The serializer family of set types, written as sequence nodes.
///
/// Reading with an existing set adds the read elements to it. Duplicate
/// elements in a node collapse into one.
#[derive(Debug, Clone, Copy, Default)]
pub struct SetSerializers;

impl SetSerializers {
    pub const DEFINITIONS: [&'static str; 2] = [definition::HASH_SET, definition::BTREE_SET];
}

impl GenericSerializer for SetSerializers {
    fn instantiate(&self, ty: &'static TypeInfo) -> Option<TypeSerializers> {
        let set = ty.as_set()?;
        Some(TypeSerializers::from_erased(Arc::new(SetSerializer { ty, set })))
    }
}

// -----------------------------------------------------------------------------
// SetSerializer

struct SetSerializer {
    ty: &'static TypeInfo,
    set: &'static SetInfo,
}

impl SetSerializer {
    fn copy_items(
        &self,
        manager: SerializationManager<'_>,
        source: &dyn Any,
        context: Option<&SerializationContext>,
    ) -> Result<Vec<Box<dyn Any>>, SerialError> {
        let source = self.set.as_set(source).ok_or_else(|| mismatch(self.ty))?;
        let item = self.set.item();
        source
            .iter()
            .map(|element| manager.copy_dyn(item, element, context))
            .collect()
    }
}

impl ErasedWriter for SetSerializer {
    fn write(
        &self,
        manager: SerializationManager<'_>,
        value: &dyn Any,
        always_write: bool,
        context: Option<&SerializationContext>,
    ) -> Result<DataNode, SerialError> {
        let set = self.set.as_set(value).ok_or_else(|| mismatch(self.ty))?;
        let item = self.set.item();

        let mut node = SequenceNode::with_capacity(set.len());
        for element in set.iter() {
            node.push(manager.write_dyn(item, element, always_write, context)?);
        }
        Ok(node.into())
    }
}

impl ErasedReader for SetSerializer {
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
        let item = self.set.item();

        let items = sequence
            .iter()
            .map(|child| manager.read_dyn(item, child, None, hooks, context))
            .collect::<Result<Vec<_>, _>>()?;

        let Some(mut existing) = existing else {
            return self.set.from_items(items);
        };
        let set = self
            .set
            .as_set_mut(&mut *existing)
            .ok_or_else(|| mismatch(self.ty))?;
        for item in items {
            set.insert(item)?;
        }
        Ok(existing)
    }
}

impl ErasedValidator for SetSerializer {
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
        let item = self.set.item();
        sequence
            .iter()
            .map(|child| manager.validate_dyn(item, child, context))
            .collect::<ValidatedSequenceNode>()
            .into()
    }
}

impl ErasedCopier for SetSerializer {
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
        let items = self.copy_items(manager, source, context)?;
        self.set.from_items(items)
    }

    fn copy_into(
        &self,
        manager: SerializationManager<'_>,
        source: &dyn Any,
        target: &mut dyn Any,
        context: Option<&SerializationContext>,
    ) -> Result<CopyOutcome, SerialError> {
        let items = self.copy_items(manager, source, context)?;
        let target = self.set.as_set_mut(target).ok_or_else(|| mismatch(self.ty))?;
        target.clear();
        for item in items {
            target.insert(item)?;
        }
        Ok(CopyOutcome::Reused)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use crate::{DependencyCollection, HookContext, SerializationManager, SerializerRegistry};
    use alloc::collections::BTreeSet;
    use alloc::string::String;
    use std::collections::HashSet;
    use vc_node::{DataNode, SequenceNode};

    fn sequence(values: &[&str]) -> DataNode {
        values
            .iter()
            .map(|v| DataNode::scalar(*v))
            .collect::<SequenceNode>()
            .into()
    }

    #[test]
    fn btree_set_writes_sorted() {
        let registry = SerializerRegistry::new();
        let dependencies = DependencyCollection::new();
        let manager = SerializationManager::new(&registry, &dependencies);

        let set = BTreeSet::from([3_u16, 1, 2]);
        let node = manager.write(&set, false, None).unwrap();
        assert_eq!(node, sequence(&["1", "2", "3"]));

        let back: BTreeSet<u16> = manager.read(&sequence(&["2", "2", "1"]), None).unwrap();
        assert_eq!(back, BTreeSet::from([1, 2]));
    }

    #[test]
    fn read_unions_with_existing() {
        let registry = SerializerRegistry::new();
        let dependencies = DependencyCollection::new();
        let manager = SerializationManager::new(&registry, &dependencies);

        let existing = HashSet::from([String::from("a")]);
        let read = manager
            .read_into(&sequence(&["b", "a"]), Some(existing), &mut HookContext::new(), None)
            .unwrap();
        assert_eq!(read, HashSet::from([String::from("a"), String::from("b")]));
    }

    #[test]
    fn copy_into_replaces_contents() {
        let registry = SerializerRegistry::new();
        let dependencies = DependencyCollection::new();
        let manager = SerializationManager::new(&registry, &dependencies);

        let source = HashSet::from([1_i8, 2]);
        let mut target = HashSet::from([9_i8]);
        manager.copy_into(&source, &mut target, None).unwrap();
        assert_eq!(target, source);
    }
}
