use alloc::string::String;
use core::fmt;

use thiserror::Error;
use vc_node::NodeKind;

use crate::hooks::HookFailure;

// -----------------------------------------------------------------------------
// Capability

/// One of the four things a serializer can do for a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Write,
    Read,
    Validate,
    Copy,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Capability::Write => "write",
            Capability::Read => "read",
            Capability::Validate => "validate",
            Capability::Copy => "copy",
        })
    }
}

// -----------------------------------------------------------------------------
// SerialError

/// An error returned by the operations of
/// [`SerializationManager`](crate::SerializationManager).
///
/// Validation never returns this type: it reports failures inside the
/// returned [`ValidationNode`](vc_node::ValidationNode) instead.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SerialError {
    /// Neither a closed registration, a context override nor a generic
    /// family provides the capability for the type.
    #[error("cannot {capability} `{type_path}`: no serializer is registered")]
    NoSerializerFound {
        type_path: &'static str,
        capability: Capability,
    },
    /// The type has readers or validators, but none for the kind of the node.
    #[error("`{type_path}` expects a {expected} node, found a {found} node")]
    InvalidNodeShape {
        type_path: &'static str,
        expected: NodeKind,
        found: NodeKind,
    },
    /// A scalar node could not be parsed as the target type.
    #[error("cannot read `{value}` as `{type_path}`: {reason}")]
    InvalidScalar {
        type_path: &'static str,
        value: String,
        reason: String,
    },
    /// A mapping key does not name a field of the target type.
    #[error("`{type_path}` has no field named `{field}`")]
    UnknownField {
        type_path: &'static str,
        field: String,
    },
    /// A type-erased value did not have the type its serializer expects.
    #[error("type-erased value is not a `{expected}`")]
    TypeMismatch { expected: &'static str },
    /// A serializer asked for a service that is not in the
    /// [`DependencyCollection`](crate::DependencyCollection).
    #[error("dependency `{type_path}` is missing from the dependency collection")]
    MissingDependency { type_path: &'static str },
    /// At least one post-read hook failed.
    #[error(transparent)]
    Hook(#[from] HookFailure),
}

// -----------------------------------------------------------------------------
// RegistrationError

/// A conflicting registration in a
/// [`SerializerRegistry`](crate::SerializerRegistry).
///
/// Conflicts are configuration mistakes. The non-`try` registration methods
/// panic with this error as the message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum RegistrationError {
    #[error("`{type_path}` already has a {capability} serializer")]
    DuplicateSerializer {
        type_path: &'static str,
        capability: Capability,
    },
    #[error("`{type_path}` already has a {capability} serializer for {node} nodes")]
    DuplicateNodeSerializer {
        type_path: &'static str,
        capability: Capability,
        node: NodeKind,
    },
    #[error("the generic definition `{definition}` already has a serializer family")]
    DuplicateGeneric { definition: &'static str },
}

// -----------------------------------------------------------------------------
// Tests
