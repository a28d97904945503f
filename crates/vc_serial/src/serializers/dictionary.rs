use alloc::boxed::Box;
use alloc::string::ToString;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::Any;

use vc_node::{DataNode, MappingNode, NodeKind, ValidatedMappingNode, ValidationNode};

use crate::copy::{CopyOutcome, CopyPolicy};
use crate::info::{MapInfo, TypeInfo, definition};
use crate::registry::{ErasedCopier, ErasedReader, ErasedValidator, ErasedWriter};
use crate::registry::{GenericSerializer, TypeSerializers};
use crate::serializers::{invalid_shape, mismatch};
use crate::{HookContext, SerialError, SerializationContext, SerializationManager};

// -----------------------------------------------------------------------------
// DictionarySerializers

/// The serializer family of map types, written as mapping nodes.
///
/// Keys and values are written with the serializers of their own types, so
/// a key does not have to be a scalar. When a node repeats a key the last
/// entry wins. Reading with an existing map inserts into it, replacing
/// the values of keys it already holds.
#[derive(Debug, Clone, Copy, Default)]
pub struct DictionarySerializers;

impl DictionarySerializers {
    pub const DEFINITIONS: [&'static str; 2] = [definition::HASH_MAP, definition::BTREE_MAP];
}

impl GenericSerializer for DictionarySerializers {
    fn instantiate(&self, ty: &'static TypeInfo) -> Option<TypeSerializers> {
        let map = ty.as_map()?;
        Some(TypeSerializers::from_erased(Arc::new(DictionarySerializer { ty, map })))
    }
}

// -----------------------------------------------------------------------------
// DictionarySerializer

type Entries = Vec<(Box<dyn Any>, Box<dyn Any>)>;

struct DictionarySerializer {
    ty: &'static TypeInfo,
    map: &'static MapInfo,
}

impl DictionarySerializer {
    fn copy_entries(
        &self,
        manager: SerializationManager<'_>,
        source: &dyn Any,
        context: Option<&SerializationContext>,
    ) -> Result<Entries, SerialError> {
        let source = self.map.as_map(source).ok_or_else(|| mismatch(self.ty))?;
        let (key, value) = (self.map.key(), self.map.value());
        source
            .iter()
            .map(|(k, v)| {
                let k = manager.copy_dyn(key, k, context)?;
                Ok((k, manager.copy_dyn(value, v, context)?))
            })
            .collect()
    }

    fn read_entries(
        &self,
        manager: SerializationManager<'_>,
        mapping: &MappingNode,
        hooks: &mut HookContext,
        context: Option<&SerializationContext>,
    ) -> Result<Entries, SerialError> {
        let (key, value) = (self.map.key(), self.map.value());
        let mut entries = Vec::with_capacity(mapping.len());
        for (k, v) in mapping {
            let k = manager.read_dyn(key, k, None, hooks, context)?;
            let v = manager.read_dyn(value, v, None, hooks, context)?;
            entries.push((k, v));
        }
        Ok(entries)
    }
}

impl ErasedWriter for DictionarySerializer {
    fn write(
        &self,
        manager: SerializationManager<'_>,
        value: &dyn Any,
        always_write: bool,
        context: Option<&SerializationContext>,
    ) -> Result<DataNode, SerialError> {
        let map = self.map.as_map(value).ok_or_else(|| mismatch(self.ty))?;
        let (key_ty, value_ty) = (self.map.key(), self.map.value());

        let mut node = MappingNode::with_capacity(map.len());
        for (key, value) in map.iter() {
            node.insert(
                manager.write_dyn(key_ty, key, always_write, context)?,
                manager.write_dyn(value_ty, value, always_write, context)?,
            );
        }
        Ok(node.into())
    }
}

impl ErasedReader for DictionarySerializer {
    #[inline]
    fn node_kind(&self) -> NodeKind {
        NodeKind::Mapping
    }

    fn read(
        &self,
        manager: SerializationManager<'_>,
        node: &DataNode,
        hooks: &mut HookContext,
        context: Option<&SerializationContext>,
        existing: Option<Box<dyn Any>>,
    ) -> Result<Box<dyn Any>, SerialError> {
        let mapping = node
            .as_mapping()
            .ok_or_else(|| invalid_shape(self.ty, NodeKind::Mapping, node))?;
        let entries = self.read_entries(manager, mapping, hooks, context)?;

        let mut target = match existing {
            Some(existing) => existing,
            None => self.map.from_entries(Vec::new())?,
        };
        let map = self
            .map
            .as_map_mut(&mut *target)
            .ok_or_else(|| mismatch(self.ty))?;

        let fresh = map.is_empty();
        for (key, value) in entries {
            if map.insert(key, value)? && fresh {
                log::warn!(
                    "duplicate key in a mapping read as `{}`; the last entry wins",
                    self.ty.path()
                );
            }
        }
        Ok(target)
    }
}

impl ErasedValidator for DictionarySerializer {
    #[inline]
    fn node_kind(&self) -> NodeKind {
        NodeKind::Mapping
    }

    fn validate(
        &self,
        manager: SerializationManager<'_>,
        node: &DataNode,
        context: Option<&SerializationContext>,
    ) -> ValidationNode {
        let Some(mapping) = node.as_mapping() else {
            return ValidationNode::fail(invalid_shape(self.ty, NodeKind::Mapping, node).to_string());
        };
        let (key, value) = (self.map.key(), self.map.value());
        mapping
            .iter()
            .map(|(k, v)| {
                (
                    manager.validate_dyn(key, k, context),
                    manager.validate_dyn(value, v, context),
                )
            })
            .collect::<ValidatedMappingNode>()
            .into()
    }
}

impl ErasedCopier for DictionarySerializer {
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
        let entries = self.copy_entries(manager, source, context)?;
        self.map.from_entries(entries)
    }

    fn copy_into(
        &self,
        manager: SerializationManager<'_>,
        source: &dyn Any,
        target: &mut dyn Any,
        context: Option<&SerializationContext>,
    ) -> Result<CopyOutcome, SerialError> {
        let entries = self.copy_entries(manager, source, context)?;
        let target = self.map.as_map_mut(target).ok_or_else(|| mismatch(self.ty))?;
        target.clear();
        for (key, value) in entries {
            target.insert(key, value)?;
        }
        Ok(CopyOutcome::Reused)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use crate::{DependencyCollection, HookContext, SerialError};
    use crate::{SerializationManager, SerializerRegistry};
    use alloc::collections::BTreeMap;
    use alloc::string::String;
    use alloc::vec;
    use alloc::vec::Vec;
    use std::collections::HashMap;
    use vc_node::{DataNode, MappingNode};

    fn mapping(entries: &[(&str, &str)]) -> DataNode {
        entries
            .iter()
            .map(|(k, v)| (DataNode::scalar(*k), DataNode::scalar(*v)))
            .collect::<MappingNode>()
            .into()
    }

    #[test]
    fn round_trip_and_last_duplicate_wins() {
        let registry = SerializerRegistry::new();
        let dependencies = DependencyCollection::new();
        let manager = SerializationManager::new(&registry, &dependencies);

        let map = BTreeMap::from([(String::from("a"), 1_u32), (String::from("b"), 2)]);
        let node = manager.write(&map, false, None).unwrap();
        assert_eq!(node, mapping(&[("a", "1"), ("b", "2")]));
        assert_eq!(manager.read::<BTreeMap<String, u32>>(&node, None).unwrap(), map);

        let read: HashMap<u8, u8> = manager
            .read(&mapping(&[("1", "10"), ("1", "11")]), None)
            .unwrap();
        assert_eq!(read, HashMap::from([(1, 11)]));
    }

    #[test]
    fn read_into_existing_overwrites_keys() {
        let registry = SerializerRegistry::new();
        let dependencies = DependencyCollection::new();
        let manager = SerializationManager::new(&registry, &dependencies);

        let existing = BTreeMap::from([(1_u8, 1_u8), (2, 2)]);
        let read = manager
            .read_into(
                &mapping(&[("2", "20"), ("3", "30")]),
                Some(existing),
                &mut HookContext::new(),
                None,
            )
            .unwrap();
        assert_eq!(read, BTreeMap::from([(1, 1), (2, 20), (3, 30)]));
    }

    #[test]
    fn non_scalar_keys() {
        let registry = SerializerRegistry::new();
        let dependencies = DependencyCollection::new();
        let manager = SerializationManager::new(&registry, &dependencies);

        let map = BTreeMap::from([(vec![1_u8, 2], true)]);
        let node = manager.write(&map, false, None).unwrap();
        let back: BTreeMap<Vec<u8>, bool> = manager.read(&node, None).unwrap();
        assert_eq!(back, map);
    }

    #[test]
    fn validate_marks_key_and_value() {
        let registry = SerializerRegistry::new();
        let dependencies = DependencyCollection::new();
        let manager = SerializationManager::new(&registry, &dependencies);

        let report =
            manager.validate::<HashMap<u8, bool>>(&mapping(&[("1", "true"), ("x", "no")]), None);
        let paths: Vec<_> = report.errors().into_iter().map(|e| e.path).collect();
        assert_eq!(paths, ["/1/key", "/1/value"]);

        let err = manager
            .read::<HashMap<u8, bool>>(&DataNode::scalar("1"), None)
            .unwrap_err();
        assert!(matches!(err, SerialError::InvalidNodeShape { .. }));
    }

    #[test]
    fn copy_into_keeps_no_stale_entries() {
        let registry = SerializerRegistry::new();
        let dependencies = DependencyCollection::new();
        let manager = SerializationManager::new(&registry, &dependencies);

        let source = HashMap::from([(1_u8, String::from("one"))]);
        let mut target = HashMap::from([(2_u8, String::from("two"))]);
        manager.copy_into(&source, &mut target, None).unwrap();
        assert_eq!(target, source);
    }
}
