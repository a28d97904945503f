use alloc::sync::Arc;
use core::fmt;

use vc_node::{NodeKind, NodeType};

use crate::info::Typed;
use crate::registry::erased::Erased;
use crate::registry::{ErasedCopier, ErasedReader, ErasedValidator, ErasedWriter};
use crate::registry::{TypeCopier, TypeReader, TypeSerializer, TypeValidator, TypeWriter};
use crate::{Capability, RegistrationError};

// -----------------------------------------------------------------------------
// TypeSerializers

/// The capability table of one type.
///
/// Holds at most one writer and one copier, and at most one reader and one
/// validator per [`NodeKind`]. Entries are shared, so cloning is cheap.
///
/// # Example
///
/// ```
/// use vc_node::{NodeKind, ScalarNode};
/// use vc_serial::TypeSerializers;
/// use vc_serial::serializers::ScalarSerializer;
///
/// let table = TypeSerializers::from_serializer::<u8, ScalarNode, _>(ScalarSerializer::new());
/// assert!(table.writer().is_some());
/// assert!(table.reader(NodeKind::Scalar).is_some());
/// assert!(table.reader(NodeKind::Sequence).is_none());
/// ```
#[derive(Clone, Default)]
pub struct TypeSerializers {
    writer: Option<Arc<dyn ErasedWriter>>,
    readers: [Option<Arc<dyn ErasedReader>>; 3],
    validators: [Option<Arc<dyn ErasedValidator>>; 3],
    copier: Option<Arc<dyn ErasedCopier>>,
}

impl TypeSerializers {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// A table filled by one strategy implementing all four capabilities.
    pub fn from_serializer<V, N, S>(serializer: S) -> Self
    where
        V: Typed,
        N: NodeType,
        S: TypeSerializer<V, N>,
    {
        let shared = Arc::new(serializer);
        Self::new()
            .with_erased_writer(Arc::new(Erased::<V, (), S>::new(shared.clone())))
            .with_erased_reader(Arc::new(Erased::<V, N, S>::new(shared.clone())))
            .with_erased_validator(Arc::new(Erased::<V, N, S>::new(shared.clone())))
            .with_erased_copier(Arc::new(Erased::<V, (), S>::new(shared)))
    }

    /// A table filled by one type-erased strategy, as built by generic families.
    pub fn from_erased<S>(serializer: Arc<S>) -> Self
    where
        S: ErasedWriter + ErasedReader + ErasedValidator + ErasedCopier,
    {
        Self::new()
            .with_erased_writer(serializer.clone())
            .with_erased_reader(serializer.clone())
            .with_erased_validator(serializer.clone())
            .with_erased_copier(serializer)
    }

    #[inline]
    pub fn with_writer<V: Typed, S: TypeWriter<V>>(self, writer: S) -> Self {
        self.with_erased_writer(Arc::new(Erased::<V, (), S>::new(Arc::new(writer))))
    }

    #[inline]
    pub fn with_reader<V: Typed, N: NodeType, S: TypeReader<V, N>>(self, reader: S) -> Self {
        self.with_erased_reader(Arc::new(Erased::<V, N, S>::new(Arc::new(reader))))
    }

    #[inline]
    pub fn with_validator<V: Typed, N: NodeType, S: TypeValidator<V, N>>(self, validator: S) -> Self {
        self.with_erased_validator(Arc::new(Erased::<V, N, S>::new(Arc::new(validator))))
    }

    #[inline]
    pub fn with_copier<V: Typed, S: TypeCopier<V>>(self, copier: S) -> Self {
        self.with_erased_copier(Arc::new(Erased::<V, (), S>::new(Arc::new(copier))))
    }

    /// Sets the writer, replacing any previous one.
    #[inline]
    pub fn with_erased_writer(mut self, writer: Arc<dyn ErasedWriter>) -> Self {
        self.writer = Some(writer);
        self
    }

    /// Sets the reader for the node kind it declares, replacing any previous one.
    #[inline]
    pub fn with_erased_reader(mut self, reader: Arc<dyn ErasedReader>) -> Self {
        let index = reader.node_kind().index();
        self.readers[index] = Some(reader);
        self
    }

    /// Sets the validator for the node kind it declares, replacing any previous one.
    #[inline]
    pub fn with_erased_validator(mut self, validator: Arc<dyn ErasedValidator>) -> Self {
        let index = validator.node_kind().index();
        self.validators[index] = Some(validator);
        self
    }

    /// Sets the copier, replacing any previous one.
    #[inline]
    pub fn with_erased_copier(mut self, copier: Arc<dyn ErasedCopier>) -> Self {
        self.copier = Some(copier);
        self
    }

    #[inline]
    pub fn writer(&self) -> Option<&Arc<dyn ErasedWriter>> {
        self.writer.as_ref()
    }

    #[inline]
    pub fn reader(&self, kind: NodeKind) -> Option<&Arc<dyn ErasedReader>> {
        self.readers[kind.index()].as_ref()
    }

    #[inline]
    pub fn validator(&self, kind: NodeKind) -> Option<&Arc<dyn ErasedValidator>> {
        self.validators[kind.index()].as_ref()
    }

    #[inline]
    pub fn copier(&self) -> Option<&Arc<dyn ErasedCopier>> {
        self.copier.as_ref()
    }

    /// The node kinds a reader is present for.
    pub fn reader_kinds(&self) -> impl Iterator<Item = NodeKind> + '_ {
        NodeKind::ALL
            .into_iter()
            .filter(|kind| self.readers[kind.index()].is_some())
    }

    /// The node kinds a validator is present for.
    pub fn validator_kinds(&self) -> impl Iterator<Item = NodeKind> + '_ {
        NodeKind::ALL
            .into_iter()
            .filter(|kind| self.validators[kind.index()].is_some())
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.writer.is_none()
            && self.copier.is_none()
            && self.readers.iter().all(Option::is_none)
            && self.validators.iter().all(Option::is_none)
    }

    /// Returns the first capability of `other` that is already present here.
    pub(crate) fn check_conflicts(
        &self,
        other: &TypeSerializers,
        type_path: &'static str,
    ) -> Result<(), RegistrationError> {
        let duplicate = |capability| RegistrationError::DuplicateSerializer {
            type_path,
            capability,
        };
        let duplicate_node = |capability, node| RegistrationError::DuplicateNodeSerializer {
            type_path,
            capability,
            node,
        };

        if self.writer.is_some() && other.writer.is_some() {
            return Err(duplicate(Capability::Write));
        }
        for kind in NodeKind::ALL {
            if self.reader(kind).is_some() && other.reader(kind).is_some() {
                return Err(duplicate_node(Capability::Read, kind));
            }
            if self.validator(kind).is_some() && other.validator(kind).is_some() {
                return Err(duplicate_node(Capability::Validate, kind));
            }
        }
        if self.copier.is_some() && other.copier.is_some() {
            return Err(duplicate(Capability::Copy));
        }
        Ok(())
    }

    /// Moves every entry of `other` into `self`, replacing on overlap.
    pub(crate) fn merge(&mut self, other: TypeSerializers) {
        let TypeSerializers {
            writer,
            readers,
            validators,
            copier,
        } = other;

        if writer.is_some() {
            self.writer = writer;
        }
        for (slot, reader) in self.readers.iter_mut().zip(readers) {
            if reader.is_some() {
                *slot = reader;
            }
        }
        for (slot, validator) in self.validators.iter_mut().zip(validators) {
            if validator.is_some() {
                *slot = validator;
            }
        }
        if copier.is_some() {
            self.copier = copier;
        }
    }
}

impl fmt::Debug for TypeSerializers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeSerializers")
            .field("writer", &self.writer.is_some())
            .field("readers", &self.reader_kinds().collect::<alloc::vec::Vec<_>>())
            .field("validators", &self.validator_kinds().collect::<alloc::vec::Vec<_>>())
            .field("copier", &self.copier.is_some())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::TypeSerializers;
    use crate::serializers::ScalarSerializer;
    use alloc::vec::Vec;
    use vc_node::{NodeKind, ScalarNode};

    #[test]
    fn readers_land_in_their_node_slot() {
        let table = TypeSerializers::new()
            .with_reader::<u8, ScalarNode, _>(ScalarSerializer::new())
            .with_validator::<u8, ScalarNode, _>(ScalarSerializer::new());

        assert_eq!(table.reader_kinds().collect::<Vec<_>>(), [NodeKind::Scalar]);
        assert_eq!(table.validator_kinds().collect::<Vec<_>>(), [NodeKind::Scalar]);
        assert!(table.writer().is_none());
        assert!(!table.is_empty());
    }

    #[test]
    fn conflicts_are_found_per_node_kind() {
        let readers = TypeSerializers::new().with_reader::<u8, ScalarNode, _>(ScalarSerializer::new());
        let writer = TypeSerializers::new().with_writer::<u8, _>(ScalarSerializer::new());

        assert!(readers.check_conflicts(&writer, "u8").is_ok());
        assert!(readers.check_conflicts(&readers.clone(), "u8").is_err());

        let mut merged = readers;
        merged.merge(writer);
        assert!(merged.writer().is_some());
        assert!(merged.reader(NodeKind::Scalar).is_some());
    }
}
