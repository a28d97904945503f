use alloc::boxed::Box;
use alloc::string::ToString;
use alloc::sync::Arc;
use core::any::Any;
use core::marker::PhantomData;

use vc_node::{DataNode, NodeKind, NodeType, ValidationNode};

use crate::copy::{CopyOutcome, CopyPolicy};
use crate::info::Typed;
use crate::ops::take;
use crate::registry::{TypeCopier, TypeReader, TypeValidator, TypeWriter};
use crate::{HookContext, SerialError, SerializationContext, SerializationManager};

// -----------------------------------------------------------------------------
// Erased capabilities

/// Type-erased [`TypeWriter`].
///
/// Generic serializer families implement the erased traits directly, since
/// they only know the type they serve through its
/// [`TypeInfo`](crate::info::TypeInfo).
pub trait ErasedWriter: Send + Sync + 'static {
    fn write(
        &self,
        manager: SerializationManager<'_>,
        value: &dyn Any,
        always_write: bool,
        context: Option<&SerializationContext>,
    ) -> Result<DataNode, SerialError>;
}

/// Type-erased [`TypeReader`].
pub trait ErasedReader: Send + Sync + 'static {
    /// The kind of node this reader accepts.
    fn node_kind(&self) -> NodeKind;

    fn read(
        &self,
        manager: SerializationManager<'_>,
        node: &DataNode,
        hooks: &mut HookContext,
        context: Option<&SerializationContext>,
        existing: Option<Box<dyn Any>>,
    ) -> Result<Box<dyn Any>, SerialError>;
}

/// Type-erased [`TypeValidator`].
pub trait ErasedValidator: Send + Sync + 'static {
    /// The kind of node this validator accepts.
    fn node_kind(&self) -> NodeKind;

    fn validate(
        &self,
        manager: SerializationManager<'_>,
        node: &DataNode,
        context: Option<&SerializationContext>,
    ) -> ValidationNode;
}

/// Type-erased [`TypeCopier`].
pub trait ErasedCopier: Send + Sync + 'static {
    fn policy(&self) -> CopyPolicy;

    fn copy(
        &self,
        manager: SerializationManager<'_>,
        source: &dyn Any,
        context: Option<&SerializationContext>,
    ) -> Result<Box<dyn Any>, SerialError>;

    /// Copies `source` into `target` if the policy allows reuse, otherwise
    /// returns a fresh copy for the caller to put in place of `target`.
    fn copy_into(
        &self,
        manager: SerializationManager<'_>,
        source: &dyn Any,
        target: &mut dyn Any,
        context: Option<&SerializationContext>,
    ) -> Result<CopyOutcome, SerialError>;
}

// -----------------------------------------------------------------------------
// Adapters

fn mismatch<V: Typed>() -> SerialError {
    SerialError::TypeMismatch {
        expected: V::type_info().path(),
    }
}

/// Turns a typed capability into its erased form.
pub(crate) struct Erased<V, N, S> {
    inner: Arc<S>,
    _marker: PhantomData<fn() -> (V, N)>,
}

impl<V, N, S> Erased<V, N, S> {
    #[inline]
    pub(crate) fn new(inner: Arc<S>) -> Self {
        Self {
            inner,
            _marker: PhantomData,
        }
    }
}

impl<V: Typed, N: 'static, S: TypeWriter<V>> ErasedWriter for Erased<V, N, S> {
    fn write(
        &self,
        manager: SerializationManager<'_>,
        value: &dyn Any,
        always_write: bool,
        context: Option<&SerializationContext>,
    ) -> Result<DataNode, SerialError> {
        let value = value.downcast_ref::<V>().ok_or_else(mismatch::<V>)?;
        self.inner.write(manager, value, always_write, context)
    }
}

impl<V: Typed, N: NodeType, S: TypeReader<V, N>> ErasedReader for Erased<V, N, S> {
    #[inline]
    fn node_kind(&self) -> NodeKind {
        N::KIND
    }

    fn read(
        &self,
        manager: SerializationManager<'_>,
        node: &DataNode,
        hooks: &mut HookContext,
        context: Option<&SerializationContext>,
        existing: Option<Box<dyn Any>>,
    ) -> Result<Box<dyn Any>, SerialError> {
        let typed = N::cast(node).ok_or_else(|| SerialError::InvalidNodeShape {
            type_path: V::type_info().path(),
            expected: N::KIND,
            found: node.kind(),
        })?;
        let existing = existing.map(take::<V>).transpose()?;
        let value = self.inner.read(manager, typed, hooks, context, existing)?;
        Ok(Box::new(value))
    }
}

impl<V: Typed, N: NodeType, S: TypeValidator<V, N>> ErasedValidator for Erased<V, N, S> {
    #[inline]
    fn node_kind(&self) -> NodeKind {
        N::KIND
    }

    fn validate(
        &self,
        manager: SerializationManager<'_>,
        node: &DataNode,
        context: Option<&SerializationContext>,
    ) -> ValidationNode {
        match N::cast(node) {
            Some(typed) => self.inner.validate(manager, typed, context),
            None => ValidationNode::fail(
                SerialError::InvalidNodeShape {
                    type_path: V::type_info().path(),
                    expected: N::KIND,
                    found: node.kind(),
                }
                .to_string(),
            ),
        }
    }
}

impl<V: Typed, N: 'static, S: TypeCopier<V>> ErasedCopier for Erased<V, N, S> {
    #[inline]
    fn policy(&self) -> CopyPolicy {
        self.inner.policy()
    }

    fn copy(
        &self,
        manager: SerializationManager<'_>,
        source: &dyn Any,
        context: Option<&SerializationContext>,
    ) -> Result<Box<dyn Any>, SerialError> {
        let source = source.downcast_ref::<V>().ok_or_else(mismatch::<V>)?;
        let value = self.inner.copy(manager, source, context)?;
        Ok(Box::new(value))
    }

    fn copy_into(
        &self,
        manager: SerializationManager<'_>,
        source: &dyn Any,
        target: &mut dyn Any,
        context: Option<&SerializationContext>,
    ) -> Result<CopyOutcome, SerialError> {
        if !self.inner.policy().may_reuse() {
            return self.copy(manager, source, context).map(CopyOutcome::Fresh);
        }
        let source = source.downcast_ref::<V>().ok_or_else(mismatch::<V>)?;
        let target = target.downcast_mut::<V>().ok_or_else(mismatch::<V>)?;
        self.inner.copy_into(manager, source, target, context)?;
        Ok(CopyOutcome::Reused)
    }
}
