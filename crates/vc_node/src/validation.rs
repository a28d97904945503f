use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

// -----------------------------------------------------------------------------
// ValidationNode

/// The result of validating a [`DataNode`](crate::DataNode) against a type.
///
/// A validator records one entry per child and keeps going after a failure,
/// so a `ValidationNode` for a sequence of `N` nodes always holds `N`
/// entries. Only a node of the wrong kind collapses into a single failed
/// [`ValidatedValueNode`].
///
/// # Example
///
/// ```
/// use vc_node::{ValidatedSequenceNode, ValidationNode};
///
/// let node: ValidationNode = ValidatedSequenceNode::from(vec![
///     ValidationNode::ok(),
///     ValidationNode::fail("not an integer"),
/// ])
/// .into();
///
/// assert!(!node.is_valid());
/// let errors = node.errors();
/// assert_eq!(errors[0].path, "/1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationNode {
    Value(ValidatedValueNode),
    Sequence(ValidatedSequenceNode),
    Mapping(ValidatedMappingNode),
}

impl ValidationNode {
    /// A passed leaf.
    #[inline]
    pub const fn ok() -> Self {
        ValidationNode::Value(ValidatedValueNode::ok())
    }

    /// A failed leaf with the given message.
    #[inline]
    pub fn fail(error: impl Into<String>) -> Self {
        ValidationNode::Value(ValidatedValueNode::fail(error))
    }

    /// Returns `true` if this node and every node below it passed.
    pub fn is_valid(&self) -> bool {
        match self {
            ValidationNode::Value(node) => node.passed(),
            ValidationNode::Sequence(node) => node.iter().all(ValidationNode::is_valid),
            ValidationNode::Mapping(node) => {
                node.iter().all(|(k, v)| k.is_valid() && v.is_valid())
            }
        }
    }

    /// Collects every failure below this node, depth first.
    ///
    /// Paths use `/i` for the i-th child of a sequence, and `/i/key` or
    /// `/i/value` for the two halves of the i-th mapping entry.
    pub fn errors(&self) -> Vec<ValidationError> {
        let mut out = Vec::new();
        self.collect_errors(&mut String::new(), &mut out);
        out
    }

    fn collect_errors(&self, path: &mut String, out: &mut Vec<ValidationError>) {
        match self {
            ValidationNode::Value(node) => {
                if !node.passed() {
                    out.push(ValidationError {
                        path: if path.is_empty() {
                            "/".to_string()
                        } else {
                            path.clone()
                        },
                        message: node.error().unwrap_or("invalid value").to_string(),
                    });
                }
            }
            ValidationNode::Sequence(node) => {
                for (index, child) in node.iter().enumerate() {
                    let len = path.len();
                    path.push_str(&format!("/{index}"));
                    child.collect_errors(path, out);
                    path.truncate(len);
                }
            }
            ValidationNode::Mapping(node) => {
                for (index, (key, value)) in node.iter().enumerate() {
                    let len = path.len();
                    path.push_str(&format!("/{index}/key"));
                    key.collect_errors(path, out);
                    path.truncate(len);

                    path.push_str(&format!("/{index}/value"));
                    value.collect_errors(path, out);
                    path.truncate(len);
                }
            }
        }
    }
}

impl From<ValidatedValueNode> for ValidationNode {
    #[inline]
    fn from(value: ValidatedValueNode) -> Self {
        ValidationNode::Value(value)
    }
}

impl From<ValidatedSequenceNode> for ValidationNode {
    #[inline]
    fn from(value: ValidatedSequenceNode) -> Self {
        ValidationNode::Sequence(value)
    }
}

impl From<ValidatedMappingNode> for ValidationNode {
    #[inline]
    fn from(value: ValidatedMappingNode) -> Self {
        ValidationNode::Mapping(value)
    }
}

// -----------------------------------------------------------------------------
// ValidatedValueNode

/// A pass/fail leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedValueNode {
    passed: bool,
    error: Option<String>,
}

impl ValidatedValueNode {
    #[inline]
    pub const fn ok() -> Self {
        Self {
            passed: true,
            error: None,
        }
    }

    #[inline]
    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            passed: false,
            error: Some(error.into()),
        }
    }

    #[inline]
    pub const fn passed(&self) -> bool {
        self.passed
    }

    #[inline]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

// -----------------------------------------------------------------------------
// ValidatedSequenceNode

/// One [`ValidationNode`] per child of the validated sequence.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidatedSequenceNode(Vec<ValidationNode>);

impl ValidatedSequenceNode {
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&ValidationNode> {
        self.0.get(index)
    }

    #[inline]
    pub fn iter(&self) -> core::slice::Iter<'_, ValidationNode> {
        self.0.iter()
    }
}

impl From<Vec<ValidationNode>> for ValidatedSequenceNode {
    #[inline]
    fn from(value: Vec<ValidationNode>) -> Self {
        Self(value)
    }
}

impl FromIterator<ValidationNode> for ValidatedSequenceNode {
    fn from_iter<I: IntoIterator<Item = ValidationNode>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// -----------------------------------------------------------------------------
// ValidatedMappingNode

/// One key/value pair of [`ValidationNode`]s per entry of the validated mapping.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidatedMappingNode(Vec<(ValidationNode, ValidationNode)>);

impl ValidatedMappingNode {
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&(ValidationNode, ValidationNode)> {
        self.0.get(index)
    }

    #[inline]
    pub fn iter(&self) -> core::slice::Iter<'_, (ValidationNode, ValidationNode)> {
        self.0.iter()
    }
}

impl From<Vec<(ValidationNode, ValidationNode)>> for ValidatedMappingNode {
    #[inline]
    fn from(value: Vec<(ValidationNode, ValidationNode)>) -> Self {
        Self(value)
    }
}

impl FromIterator<(ValidationNode, ValidationNode)> for ValidatedMappingNode {
    fn from_iter<I: IntoIterator<Item = (ValidationNode, ValidationNode)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// -----------------------------------------------------------------------------
// ValidationError

/// A flattened failure, see [`ValidationNode::errors`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

impl core::error::Error for ValidationError {}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{ValidatedMappingNode, ValidatedSequenceNode, ValidationNode};
    use alloc::vec;

    #[test]
    fn nested_paths() {
        let inner: ValidationNode =
            ValidatedSequenceNode::from(vec![ValidationNode::ok(), ValidationNode::fail("bad")])
                .into();
        let node: ValidationNode = ValidatedMappingNode::from(vec![
            (ValidationNode::ok(), inner),
            (ValidationNode::fail("unknown field"), ValidationNode::ok()),
        ])
        .into();

        let errors = node.errors();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].path, "/0/value/1");
        assert_eq!(errors[0].message, "bad");
        assert_eq!(errors[1].path, "/1/key");
    }

    #[test]
    fn root_failure() {
        let node = ValidationNode::fail("expected sequence");
        assert!(!node.is_valid());
        assert_eq!(node.errors()[0].path, "/");
    }

    #[test]
    fn empty_sequence_is_valid() {
        let node: ValidationNode = ValidatedSequenceNode::default().into();
        assert!(node.is_valid());
        assert!(node.errors().is_empty());
    }
}
