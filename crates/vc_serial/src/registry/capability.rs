use vc_node::{DataNode, NodeType, ValidationNode};

use crate::copy::CopyPolicy;
use crate::{HookContext, SerialError, SerializationContext, SerializationManager};

// -----------------------------------------------------------------------------
// Typed capabilities

/// Writes values of `V` to document trees.
pub trait TypeWriter<V>: Send + Sync + 'static {
    /// Writes `value`.
    ///
    /// With `always_write`, values equal to their default must still be
    /// written out in full.
    fn write(
        &self,
        manager: SerializationManager<'_>,
        value: &V,
        always_write: bool,
        context: Option<&SerializationContext>,
    ) -> Result<DataNode, SerialError>;
}

/// Reads values of `V` from nodes of kind `N`.
///
/// A type may have one reader per node kind.
pub trait TypeReader<V, N: NodeType>: Send + Sync + 'static {
    /// Reads `node`.
    ///
    /// `existing` is an instance the caller would like to have reused. What
    /// reuse means is up to the reader; a reader that cannot reuse it drops
    /// it. Post-read work goes to `hooks`, never runs inline.
    fn read(
        &self,
        manager: SerializationManager<'_>,
        node: &N,
        hooks: &mut HookContext,
        context: Option<&SerializationContext>,
        existing: Option<V>,
    ) -> Result<V, SerialError>;
}

/// Checks that nodes of kind `N` could be read as `V`, without reading them.
pub trait TypeValidator<V, N: NodeType>: Send + Sync + 'static {
    fn validate(
        &self,
        manager: SerializationManager<'_>,
        node: &N,
        context: Option<&SerializationContext>,
    ) -> ValidationNode;
}

/// Deep-copies values of `V`.
pub trait TypeCopier<V>: Send + Sync + 'static {
    /// Builds an independent copy of `source`.
    fn copy(
        &self,
        manager: SerializationManager<'_>,
        source: &V,
        context: Option<&SerializationContext>,
    ) -> Result<V, SerialError>;

    /// Makes `target` a copy of `source`.
    ///
    /// Only called when [`policy`](TypeCopier::policy) allows reuse. The
    /// default replaces `target` with [`copy`](TypeCopier::copy).
    fn copy_into(
        &self,
        manager: SerializationManager<'_>,
        source: &V,
        target: &mut V,
        context: Option<&SerializationContext>,
    ) -> Result<(), SerialError> {
        *target = self.copy(manager, source, context)?;
        Ok(())
    }

    fn policy(&self) -> CopyPolicy {
        CopyPolicy::Fresh
    }
}

/// All four capabilities, for the common case of one strategy object
/// handling a type completely.
pub trait TypeSerializer<V, N: NodeType>:
    TypeWriter<V> + TypeReader<V, N> + TypeValidator<V, N> + TypeCopier<V>
{
}

impl<V, N: NodeType, S> TypeSerializer<V, N> for S where
    S: TypeWriter<V> + TypeReader<V, N> + TypeValidator<V, N> + TypeCopier<V>
{
}
