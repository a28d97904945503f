use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

// -----------------------------------------------------------------------------
// NodeKind

/// The three kinds of [`DataNode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKind {
    Scalar,
    Sequence,
    Mapping,
}

impl NodeKind {
    /// All kinds, in declaration order.
    pub const ALL: [NodeKind; 3] = [NodeKind::Scalar, NodeKind::Sequence, NodeKind::Mapping];

    /// Index of the kind in [`NodeKind::ALL`].
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            NodeKind::Scalar => 0,
            NodeKind::Sequence => 1,
            NodeKind::Mapping => 2,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NodeKind::Scalar => "scalar",
            NodeKind::Sequence => "sequence",
            NodeKind::Mapping => "mapping",
        })
    }
}

// -----------------------------------------------------------------------------
// DataNode

/// A node of the document tree.
///
/// A tree is built bottom-up with the `push`/`insert` methods of the owned
/// sequence and mapping nodes, then only read. There is no interior
/// mutability, so a finished tree can be shared across threads freely.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DataNode {
    Scalar(ScalarNode),
    Sequence(SequenceNode),
    Mapping(MappingNode),
}

impl DataNode {
    /// Creates a scalar node.
    #[inline]
    pub fn scalar(value: impl Into<String>) -> Self {
        DataNode::Scalar(ScalarNode::new(value))
    }

    /// Returns the kind of this node.
    #[inline]
    pub const fn kind(&self) -> NodeKind {
        match self {
            DataNode::Scalar(_) => NodeKind::Scalar,
            DataNode::Sequence(_) => NodeKind::Sequence,
            DataNode::Mapping(_) => NodeKind::Mapping,
        }
    }

    #[inline]
    pub fn as_scalar(&self) -> Option<&ScalarNode> {
        match self {
            DataNode::Scalar(node) => Some(node),
            _ => None,
        }
    }

    #[inline]
    pub fn as_sequence(&self) -> Option<&SequenceNode> {
        match self {
            DataNode::Sequence(node) => Some(node),
            _ => None,
        }
    }

    #[inline]
    pub fn as_mapping(&self) -> Option<&MappingNode> {
        match self {
            DataNode::Mapping(node) => Some(node),
            _ => None,
        }
    }
}

impl From<ScalarNode> for DataNode {
    #[inline]
    fn from(value: ScalarNode) -> Self {
        DataNode::Scalar(value)
    }
}

impl From<SequenceNode> for DataNode {
    #[inline]
    fn from(value: SequenceNode) -> Self {
        DataNode::Sequence(value)
    }
}

impl From<MappingNode> for DataNode {
    #[inline]
    fn from(value: MappingNode) -> Self {
        DataNode::Mapping(value)
    }
}

// -----------------------------------------------------------------------------
// ScalarNode

/// A leaf holding its textual value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ScalarNode {
    value: String,
}

impl ScalarNode {
    #[inline]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    #[inline]
    pub fn value(&self) -> &str {
        &self.value
    }

    #[inline]
    pub fn into_value(self) -> String {
        self.value
    }
}

// -----------------------------------------------------------------------------
// SequenceNode

/// An ordered list of nodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SequenceNode(Vec<DataNode>);

impl SequenceNode {
    #[inline]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self(Vec::with_capacity(capacity))
    }

    /// Appends a child while the node is being built.
    #[inline]
    pub fn push(&mut self, node: DataNode) {
        self.0.push(node);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&DataNode> {
        self.0.get(index)
    }

    #[inline]
    pub fn iter(&self) -> core::slice::Iter<'_, DataNode> {
        self.0.iter()
    }

    #[inline]
    pub fn as_slice(&self) -> &[DataNode] {
        &self.0
    }
}

impl From<Vec<DataNode>> for SequenceNode {
    #[inline]
    fn from(value: Vec<DataNode>) -> Self {
        Self(value)
    }
}

impl FromIterator<DataNode> for SequenceNode {
    fn from_iter<I: IntoIterator<Item = DataNode>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a SequenceNode {
    type Item = &'a DataNode;
    type IntoIter = core::slice::Iter<'a, DataNode>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// -----------------------------------------------------------------------------
// MappingNode

/// An ordered list of key/value pairs.
///
/// Keys are not required to be unique at this layer; the reader of the
/// mapping decides whether duplicates are an error.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct MappingNode(Vec<(DataNode, DataNode)>);

impl MappingNode {
    #[inline]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self(Vec::with_capacity(capacity))
    }

    /// Appends an entry while the node is being built.
    #[inline]
    pub fn insert(&mut self, key: DataNode, value: DataNode) {
        self.0.push((key, value));
    }

    /// Returns the value of the first entry whose key equals `key`.
    pub fn get(&self, key: &DataNode) -> Option<&DataNode> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Returns the value of the first entry whose key is the scalar `key`.
    pub fn get_str(&self, key: &str) -> Option<&DataNode> {
        self.0
            .iter()
            .find(|(k, _)| k.as_scalar().is_some_and(|s| s.value() == key))
            .map(|(_, v)| v)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> core::slice::Iter<'_, (DataNode, DataNode)> {
        self.0.iter()
    }
}

impl From<Vec<(DataNode, DataNode)>> for MappingNode {
    #[inline]
    fn from(value: Vec<(DataNode, DataNode)>) -> Self {
        Self(value)
    }
}

impl FromIterator<(DataNode, DataNode)> for MappingNode {
    fn from_iter<I: IntoIterator<Item = (DataNode, DataNode)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a MappingNode {
    type Item = &'a (DataNode, DataNode);
    type IntoIter = core::slice::Iter<'a, (DataNode, DataNode)>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// -----------------------------------------------------------------------------
// NodeType

/// Implemented by the concrete node structs so that readers can declare the
/// kind of node they consume at the type level.
///
/// # Example
///
/// ```
/// use vc_node::{DataNode, NodeKind, NodeType, ScalarNode, SequenceNode};
///
/// let node = DataNode::scalar("7");
/// assert_eq!(ScalarNode::KIND, NodeKind::Scalar);
/// assert!(ScalarNode::cast(&node).is_some());
/// assert!(SequenceNode::cast(&node).is_none());
/// ```
pub trait NodeType: Sized + 'static {
    /// The kind of [`DataNode`] wrapping this node.
    const KIND: NodeKind;

    /// Returns the inner node if `node` is of kind [`Self::KIND`].
    fn cast(node: &DataNode) -> Option<&Self>;
}

impl NodeType for ScalarNode {
    const KIND: NodeKind = NodeKind::Scalar;

    #[inline]
    fn cast(node: &DataNode) -> Option<&Self> {
        node.as_scalar()
    }
}

impl NodeType for SequenceNode {
    const KIND: NodeKind = NodeKind::Sequence;

    #[inline]
    fn cast(node: &DataNode) -> Option<&Self> {
        node.as_sequence()
    }
}

impl NodeType for MappingNode {
    const KIND: NodeKind = NodeKind::Mapping;

    #[inline]
    fn cast(node: &DataNode) -> Option<&Self> {
        node.as_mapping()
    }
}

// -----------------------------------------------------------------------------
// Tests
