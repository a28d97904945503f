use alloc::sync::Arc;
use core::any::TypeId;
use core::fmt;

use vc_node::NodeType;
use vc_utils::TypeIdMap;

use crate::TypeSerializers;
use crate::info::Typed;
use crate::registry::TypeSerializer;

// -----------------------------------------------------------------------------
// SerializationContext

/// Per-call settings passed through every nested serializer call.
///
/// A context can override the serializers of a type for the duration of one
/// call, e.g. to write a nested `f32` with a fixed precision, and can force
/// [`always_write`](SerializationContext::always_write) on every write.
///
/// # Example
///
/// ```
/// use vc_node::ScalarNode;
/// use vc_serial::SerializationContext;
/// use vc_serial::serializers::ScalarSerializer;
///
/// let mut context = SerializationContext::new().with_always_write(true);
/// context.override_serializer::<u8, ScalarNode, _>(ScalarSerializer::new());
///
/// assert!(context.always_write());
/// assert!(context.has_override::<u8>());
/// ```
#[derive(Clone, Default)]
pub struct SerializationContext {
    overrides: TypeIdMap<Arc<TypeSerializers>>,
    always_write: bool,
}

impl SerializationContext {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every write under this context behave as if `always_write`
    /// were passed.
    #[inline]
    pub fn with_always_write(mut self, always_write: bool) -> Self {
        self.always_write = always_write;
        self
    }

    #[inline]
    pub fn always_write(&self) -> bool {
        self.always_write
    }

    /// Replaces the serializers of `V` for calls made with this context.
    ///
    /// The override hides every registration of `V`, including capabilities
    /// the override does not provide.
    pub fn override_serializer<V, N, S>(&mut self, serializer: S) -> &mut Self
    where
        V: Typed,
        N: NodeType,
        S: TypeSerializer<V, N>,
    {
        self.override_table::<V>(TypeSerializers::from_serializer::<V, N, S>(serializer))
    }

    /// Replaces the serializers of `V` with `table` for calls made with this context.
    pub fn override_table<V: Typed>(&mut self, table: TypeSerializers) -> &mut Self {
        self.overrides.insert_type::<V>(Arc::new(table));
        self
    }

    #[inline]
    pub fn has_override<V: Typed>(&self) -> bool {
        self.overrides.contains_type::<V>()
    }

    #[inline]
    pub fn get_override(&self, type_id: TypeId) -> Option<&Arc<TypeSerializers>> {
        self.overrides.get(&type_id)
    }
}

impl fmt::Debug for SerializationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerializationContext")
            .field("overrides", &self.overrides.len())
            .field("always_write", &self.always_write)
            .finish()
    }
}
