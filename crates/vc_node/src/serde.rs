//! `serde` support for [`DataNode`].
//!
//! Serialization emits scalars as strings, sequences as sequences and
//! mappings as maps (duplicate keys are emitted as-is). Deserialization
//! accepts any self-describing format: every primitive becomes a scalar
//! holding its textual form, and unit / `None` become the scalar `"null"`.

use alloc::string::{String, ToString};

use serde_core::de::{self, MapAccess, SeqAccess, Visitor};
use serde_core::ser::SerializeMap;
use serde_core::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{DataNode, MappingNode, ScalarNode, SequenceNode};

/// Reads a document tree out of any type-erased `serde` deserializer.
///
/// # Example
///
/// ```
/// use vc_node::{read_tree, DataNode};
///
/// let mut json = serde_json::Deserializer::from_str(r#"["a", 1]"#);
/// let mut erased = <dyn erased_serde::Deserializer>::erase(&mut json);
/// let node = read_tree(&mut erased).unwrap();
///
/// assert_eq!(node.as_sequence().unwrap().get(1), Some(&DataNode::scalar("1")));
/// ```
pub fn read_tree(
    deserializer: &mut dyn erased_serde::Deserializer<'_>,
) -> Result<DataNode, erased_serde::Error> {
    erased_serde::deserialize(deserializer)
}

/// Writes a document tree into any type-erased `serde` serializer.
pub fn write_tree(
    node: &DataNode,
    serializer: &mut dyn erased_serde::Serializer,
) -> Result<(), erased_serde::Error> {
    erased_serde::Serialize::erased_serialize(node, serializer)
}

// -----------------------------------------------------------------------------
// Serialize

impl Serialize for DataNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DataNode::Scalar(node) => serializer.serialize_str(node.value()),
            DataNode::Sequence(node) => serializer.collect_seq(node.iter()),
            DataNode::Mapping(node) => {
                let mut state = serializer.serialize_map(Some(node.len()))?;
                for (key, value) in node.iter() {
                    state.serialize_entry(key, value)?;
                }
                state.end()
            }
        }
    }
}

// -----------------------------------------------------------------------------
// Deserialize

impl<'de> Deserialize<'de> for DataNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(DataNodeVisitor)
    }
}

struct DataNodeVisitor;

impl DataNodeVisitor {
    #[inline]
    fn scalar<E>(value: impl ToString) -> Result<DataNode, E> {
        Ok(DataNode::Scalar(ScalarNode::new(value.to_string())))
    }
}

impl<'de> Visitor<'de> for DataNodeVisitor {
    type Value = DataNode;

    fn expecting(&self, formatter: &mut core::fmt::Formatter) -> core::fmt::Result {
        formatter.write_str("a scalar, a sequence or a mapping")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
        Self::scalar(v)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Self::scalar(v)
    }

    fn visit_i128<E: de::Error>(self, v: i128) -> Result<Self::Value, E> {
        Self::scalar(v)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Self::scalar(v)
    }

    fn visit_u128<E: de::Error>(self, v: u128) -> Result<Self::Value, E> {
        Self::scalar(v)
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Self::scalar(v)
    }

    fn visit_char<E: de::Error>(self, v: char) -> Result<Self::Value, E> {
        Self::scalar(v)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Self::scalar(v)
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
        Ok(DataNode::Scalar(ScalarNode::new(v)))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Self::scalar("null")
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Self::scalar("null")
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_any(self)
    }

    fn visit_newtype_struct<D: Deserializer<'de>>(
        self,
        deserializer: D,
    ) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_any(self)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut node = SequenceNode::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(child) = seq.next_element::<DataNode>()? {
            node.push(child);
        }
        Ok(DataNode::Sequence(node))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut node = MappingNode::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((key, value)) = map.next_entry::<DataNode, DataNode>()? {
            node.insert(key, value);
        }
        Ok(DataNode::Mapping(node))
    }
}

// -----------------------------------------------------------------------------
// Tests
