use alloc::format;
use alloc::sync::Arc;
use core::any::{Any, TypeId};
use core::fmt;
use std::sync::{PoisonError, RwLock};

use vc_node::{NodeType, ScalarNode};
use vc_utils::TypeIdMap;
use vc_utils::hash::HashMap;

use crate::info::{TypeInfo, Typed};
use crate::registry::{GenericSerializer, TypeSerializers};
use crate::registry::{TypeCopier, TypeReader, TypeSerializer, TypeValidator, TypeWriter};
use crate::serializers::{
    DictionarySerializers, ListSerializers, ScalarSerializer, SetSerializers, SharedSerializers,
};
use crate::{AfterDeserialize, HookError, RegistrationError};

/// A type-erased [`AfterDeserialize`] call.
pub type HookFn = fn(&mut dyn Any) -> Result<(), HookError>;

// -----------------------------------------------------------------------------
// SerializerRegistry

/// The central store of serializers.
///
/// Resolution of a type, most specific first:
///
/// 1. the closed registration of the exact type,
/// 2. a table previously instantiated for it by a generic family,
/// 3. the family registered under the type's generic definition, whose
///    instantiation is then cached.
///
/// A [`SerializationContext`](crate::SerializationContext) override, when
/// present, wins over all of them; see
/// [`SerializationManager`](crate::SerializationManager).
///
/// Registration takes `&mut self` and is done before serialization starts.
/// Afterwards the registry is shared immutably; the instantiation cache is
/// the only interior state.
///
/// # Example
///
/// ```
/// use vc_serial::SerializerRegistry;
///
/// let registry = SerializerRegistry::new();
///
/// assert!(registry.contains::<u32>());
/// // Not registered, but instantiated on demand by the list family.
/// assert!(!registry.contains::<Vec<u32>>());
/// assert!(registry.resolve(<Vec<u32> as vc_serial::info::Typed>::type_info()).is_some());
/// ```
pub struct SerializerRegistry {
    closed: TypeIdMap<Arc<TypeSerializers>>,
    type_path_to_id: HashMap<&'static str, TypeId>,
    generics: HashMap<&'static str, Arc<dyn GenericSerializer>>,
    instances: RwLock<TypeIdMap<Option<Arc<TypeSerializers>>>>,
    hooks: TypeIdMap<HookFn>,
    #[cfg(feature = "auto_register")]
    auto_registered: bool,
}

impl Default for SerializerRegistry {
    /// See [`SerializerRegistry::new`].
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl SerializerRegistry {
    /// Creates an empty registry.
    pub fn empty() -> Self {
        Self {
            closed: TypeIdMap::new(),
            type_path_to_id: HashMap::default(),
            generics: HashMap::default(),
            instances: RwLock::new(TypeIdMap::new()),
            hooks: TypeIdMap::new(),
            #[cfg(feature = "auto_register")]
            auto_registered: false,
        }
    }

    /// Creates a registry with the built-in serializers.
    ///
    /// - scalars: `bool` `char` `f32` `f64` `String`, `i8 - i128` `isize`, `u8 - u128` `usize`
    /// - lists: `Vec<_>` `VecDeque<_>` `Cow<'static, [_]>` `Box<[_]>` `Arc<[_]>`
    /// - sets: `HashSet<_>` `BTreeSet<_>`
    /// - maps: `HashMap<_, _>` `BTreeMap<_, _>`
    /// - shared handles: `Arc<RwLock<_>>`
    pub fn new() -> Self {
        let mut registry = Self::empty();

        macro_rules! register_scalars {
            ($($ty:ty),+ $(,)?) => {
                $( registry.register_serializer::<$ty, ScalarNode, _>(ScalarSerializer::<$ty>::new()); )+
            };
        }
        register_scalars!(bool, char, f32, f64, alloc::string::String);
        register_scalars!(i8, i16, i32, i64, i128, isize);
        register_scalars!(u8, u16, u32, u64, u128, usize);

        for definition in ListSerializers::DEFINITIONS {
            registry.register_generic(definition, ListSerializers);
        }
        for definition in SetSerializers::DEFINITIONS {
            registry.register_generic(definition, SetSerializers);
        }
        for definition in DictionarySerializers::DEFINITIONS {
            registry.register_generic(definition, DictionarySerializers);
        }
        for definition in SharedSerializers::DEFINITIONS {
            registry.register_generic(definition, SharedSerializers);
        }
        registry
    }

    /// Runs every function submitted with
    /// [`submit_registration!`](crate::submit_registration).
    ///
    /// Repeated calls are cheap and register nothing twice.
    ///
    /// ## Return Value
    ///
    /// Returns `false` if the `auto_register` feature is disabled.
    ///
    /// ## Platform Support
    ///
    /// Link-time collection is provided by the `inventory` crate, which
    /// supports the major platforms (Linux, macOS, Windows, iOS, Android
    /// and Web).
    #[cfg_attr(not(feature = "auto_register"), inline(always))]
    pub fn auto_register(&mut self) -> bool {
        #[cfg(feature = "auto_register")]
        {
            if !self.auto_registered {
                self.auto_registered = true;
                for registration in inventory::iter::<crate::registry::AutoRegistration> {
                    registration.apply(self);
                }
                log::debug!("auto registration done, {} closed type(s)", self.closed.len());
            }
            true
        }
        #[cfg(not(feature = "auto_register"))]
        {
            false
        }
    }

    // -------------------------------------------------------------------------
    // Closed registrations

    /// Registers `table` for the type described by `ty`.
    ///
    /// Fails without registering anything if any entry of `table` is
    /// already present for the type.
    pub fn try_register_table(
        &mut self,
        ty: &'static TypeInfo,
        table: TypeSerializers,
    ) -> Result<(), RegistrationError> {
        let type_id = ty.id();
        if let Some(existing) = self.closed.get(&type_id) {
            existing.check_conflicts(&table, ty.path())?;
        }

        let entry = self.closed.get_or_insert(type_id, Default::default);
        Arc::make_mut(entry).merge(table);
        self.type_path_to_id.insert(ty.path(), type_id);
        self.invalidate_instances();

        log::debug!("registered serializers for `{}`", ty.path());
        Ok(())
    }

    /// Registers a strategy providing all four capabilities of `V` for
    /// nodes of kind `N`.
    #[inline]
    pub fn try_register_serializer<V, N, S>(&mut self, serializer: S) -> Result<(), RegistrationError>
    where
        V: Typed,
        N: NodeType,
        S: TypeSerializer<V, N>,
    {
        self.try_register_table(
            V::type_info(),
            TypeSerializers::from_serializer::<V, N, S>(serializer),
        )
    }

    /// Panicking form of [`try_register_serializer`](Self::try_register_serializer).
    ///
    /// # Panics
    ///
    /// If any capability of `V` is already registered.
    #[track_caller]
    pub fn register_serializer<V, N, S>(&mut self, serializer: S)
    where
        V: Typed,
        N: NodeType,
        S: TypeSerializer<V, N>,
    {
        if let Err(err) = self.try_register_serializer::<V, N, S>(serializer) {
            panic!("{err}");
        }
    }

    #[inline]
    pub fn try_register_writer<V: Typed, S: TypeWriter<V>>(
        &mut self,
        writer: S,
    ) -> Result<(), RegistrationError> {
        self.try_register_table(V::type_info(), TypeSerializers::new().with_writer(writer))
    }

    /// # Panics
    ///
    /// If `V` already has a writer.
    #[track_caller]
    pub fn register_writer<V: Typed, S: TypeWriter<V>>(&mut self, writer: S) {
        if let Err(err) = self.try_register_writer::<V, S>(writer) {
            panic!("{err}");
        }
    }

    #[inline]
    pub fn try_register_reader<V: Typed, N: NodeType, S: TypeReader<V, N>>(
        &mut self,
        reader: S,
    ) -> Result<(), RegistrationError> {
        self.try_register_table(
            V::type_info(),
            TypeSerializers::new().with_reader::<V, N, S>(reader),
        )
    }

    /// # Panics
    ///
    /// If `V` already has a reader for nodes of kind `N`.
    #[track_caller]
    pub fn register_reader<V: Typed, N: NodeType, S: TypeReader<V, N>>(&mut self, reader: S) {
        if let Err(err) = self.try_register_reader::<V, N, S>(reader) {
            panic!("{err}");
        }
    }

    #[inline]
    pub fn try_register_validator<V: Typed, N: NodeType, S: TypeValidator<V, N>>(
        &mut self,
        validator: S,
    ) -> Result<(), RegistrationError> {
        self.try_register_table(
            V::type_info(),
            TypeSerializers::new().with_validator::<V, N, S>(validator),
        )
    }

    /// # Panics
    ///
    /// If `V` already has a validator for nodes of kind `N`.
    #[track_caller]
    pub fn register_validator<V: Typed, N: NodeType, S: TypeValidator<V, N>>(
        &mut self,
        validator: S,
    ) {
        if let Err(err) = self.try_register_validator::<V, N, S>(validator) {
            panic!("{err}");
        }
    }

    #[inline]
    pub fn try_register_copier<V: Typed, S: TypeCopier<V>>(
        &mut self,
        copier: S,
    ) -> Result<(), RegistrationError> {
        self.try_register_table(V::type_info(), TypeSerializers::new().with_copier(copier))
    }

    /// # Panics
    ///
    /// If `V` already has a copier.
    #[track_caller]
    pub fn register_copier<V: Typed, S: TypeCopier<V>>(&mut self, copier: S) {
        if let Err(err) = self.try_register_copier::<V, S>(copier) {
            panic!("{err}");
        }
    }

    // -------------------------------------------------------------------------
    // Generic families

    /// Registers `family` for every instance of `definition`.
    pub fn try_register_generic(
        &mut self,
        definition: &'static str,
        family: impl GenericSerializer,
    ) -> Result<(), RegistrationError> {
        if self.generics.contains_key(definition) {
            return Err(RegistrationError::DuplicateGeneric { definition });
        }
        self.generics.insert(definition, Arc::new(family));
        self.invalidate_instances();

        log::debug!("registered serializer family for `{definition}`");
        Ok(())
    }

    /// # Panics
    ///
    /// If `definition` already has a family.
    #[track_caller]
    pub fn register_generic(&mut self, definition: &'static str, family: impl GenericSerializer) {
        if let Err(err) = self.try_register_generic(definition, family) {
            panic!("{err}");
        }
    }

    // -------------------------------------------------------------------------
    // Hooks

    /// Registers the [`AfterDeserialize`] hook of `T`.
    ///
    /// Registering the same type twice is harmless.
    pub fn register_hook<T: AfterDeserialize + Typed>(&mut self) {
        self.hooks.insert_type::<T>(|value| match value.downcast_mut::<T>() {
            Some(value) => value.after_deserialization(),
            None => Err(HookError::new(format!(
                "hook called with a value that is not a `{}`",
                T::type_info().path()
            ))),
        });
    }

    /// The post-read hook of the type, if any.
    #[inline]
    pub fn hook(&self, type_id: TypeId) -> Option<HookFn> {
        self.hooks.get(&type_id).copied()
    }

    // -------------------------------------------------------------------------
    // Lookup

    /// Returns `true` if `T` has a closed registration.
    #[inline]
    pub fn contains<T: Typed>(&self) -> bool {
        self.closed.contains_type::<T>()
    }

    /// Returns `true` if a family is registered under `definition`.
    #[inline]
    pub fn contains_generic(&self, definition: &str) -> bool {
        self.generics.contains_key(definition)
    }

    /// The closed registration of the type, if any.
    #[inline]
    pub fn get(&self, type_id: TypeId) -> Option<&Arc<TypeSerializers>> {
        self.closed.get(&type_id)
    }

    /// The closed registration of the type with the given full path, if any.
    pub fn get_with_type_path(&self, type_path: &str) -> Option<&Arc<TypeSerializers>> {
        self.type_path_to_id
            .get(type_path)
            .and_then(|type_id| self.closed.get(type_id))
    }

    /// Number of types with a closed registration.
    #[inline]
    pub fn len(&self) -> usize {
        self.closed.len()
    }

    /// Resolves the serializers of `ty`, instantiating a generic family if
    /// needed. See the type-level documentation for the order.
    pub fn resolve(&self, ty: &'static TypeInfo) -> Option<Arc<TypeSerializers>> {
        if let Some(table) = self.closed.get(&ty.id()) {
            return Some(table.clone());
        }
        let generic = ty.generic()?;

        if let Some(cached) = self
            .instances
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&ty.id())
        {
            log::trace!("serializer cache hit for `{}`", ty.path());
            return cached.clone();
        }

        // Instantiate outside the lock; a racing thread's result is equivalent.
        let instance = self
            .generics
            .get(generic.definition())
            .and_then(|family| family.instantiate(ty))
            .map(Arc::new);
        match &instance {
            Some(_) => log::debug!(
                "instantiated `{}` serializers for `{}`",
                generic.definition(),
                ty.path()
            ),
            None => log::trace!("no serializer family can handle `{}`", ty.path()),
        }

        self.instances
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .get_or_insert(ty.id(), || instance)
            .clone()
    }

    fn invalidate_instances(&mut self) {
        self.instances
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl fmt::Debug for SerializerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut generics: alloc::vec::Vec<_> = self.generics.keys().copied().collect();
        generics.sort_unstable();
        f.debug_struct("SerializerRegistry")
            .field("closed", &self.closed.len())
            .field("generics", &generics)
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::SerializerRegistry;
    use crate::info::{Typed, definition};
    use crate::registry::TypeWriter;
    use crate::serializers::{ListSerializers, ScalarSerializer};
    use crate::{Capability, RegistrationError, SerialError};
    use crate::{DependencyCollection, SerializationContext, SerializationManager};
    use alloc::string::ToString;
    use alloc::sync::Arc;
    use alloc::vec::Vec;
    use core::any::TypeId;
    use vc_node::{DataNode, NodeKind, ScalarNode};

    struct Hex;

    impl TypeWriter<u32> for Hex {
        fn write(
            &self,
            _manager: SerializationManager<'_>,
            value: &u32,
            _always_write: bool,
            _context: Option<&SerializationContext>,
        ) -> Result<DataNode, SerialError> {
            Ok(DataNode::scalar(alloc::format!("{value:#x}")))
        }
    }

    #[test]
    fn duplicates_are_rejected_without_side_effects() {
        let mut registry = SerializerRegistry::empty();
        registry.register_writer::<u32, _>(Hex);

        let err = registry
            .try_register_serializer::<u32, ScalarNode, _>(ScalarSerializer::new())
            .unwrap_err();
        assert_eq!(
            err,
            RegistrationError::DuplicateSerializer {
                type_path: "u32",
                capability: Capability::Write,
            }
        );

        let table = registry.get(TypeId::of::<u32>()).unwrap();
        assert!(table.writer().is_some());
        assert!(table.reader(NodeKind::Scalar).is_none());

        // Capabilities that do not overlap merge.
        registry
            .try_register_reader::<u32, ScalarNode, _>(ScalarSerializer::new())
            .unwrap();
        let err = registry
            .try_register_reader::<u32, ScalarNode, _>(ScalarSerializer::new())
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "`u32` already has a read serializer for scalar nodes"
        );
        assert!(registry.get_with_type_path("u32").is_some());
    }

    #[test]
    #[should_panic(expected = "`u8` already has a write serializer")]
    fn register_panics_on_duplicate() {
        let mut registry = SerializerRegistry::new();
        registry.register_serializer::<u8, ScalarNode, _>(ScalarSerializer::new());
    }

    #[test]
    fn duplicate_generic_family() {
        let mut registry = SerializerRegistry::new();
        assert!(registry.contains_generic(definition::VEC));
        let err = registry
            .try_register_generic(definition::VEC, ListSerializers)
            .unwrap_err();
        assert_eq!(
            err,
            RegistrationError::DuplicateGeneric {
                definition: definition::VEC
            }
        );
    }

    #[test]
    fn instances_are_cached_until_registration() {
        let mut registry = SerializerRegistry::new();
        let ty = <Vec<u32> as Typed>::type_info();

        let first = registry.resolve(ty).unwrap();
        let second = registry.resolve(ty).unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        registry.register_generic("test::Other<_>", ListSerializers);
        let third = registry.resolve(ty).unwrap();
        assert!(!Arc::ptr_eq(&first, &third));
    }

    #[test]
    fn empty_registry_resolves_nothing() {
        let registry = SerializerRegistry::empty();
        assert_eq!(registry.len(), 0);
        assert!(registry.resolve(<u8 as Typed>::type_info()).is_none());
        assert!(registry.resolve(<Vec<u8> as Typed>::type_info()).is_none());
    }

    #[test]
    fn concurrent_resolution_shares_one_instance() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SerializerRegistry>();
        assert_send_sync::<SerializationManager<'static>>();

        let registry = SerializerRegistry::new();
        let dependencies = DependencyCollection::new();
        let manager = SerializationManager::new(&registry, &dependencies);
        let ty = <Vec<u32> as Typed>::type_info();
        let registry = &registry;

        let tables: Vec<_> = std::thread::scope(|scope| {
            let workers: Vec<_> = (0..8_u32)
                .map(|index| {
                    scope.spawn(move || {
                        let node = manager.write(&alloc::vec![index, index + 1], false, None).unwrap();
                        assert_eq!(node.as_sequence().unwrap().len(), 2);
                        registry.resolve(ty).unwrap()
                    })
                })
                .collect();
            workers
                .into_iter()
                .map(|worker| worker.join().unwrap())
                .collect()
        });

        let cached = registry.resolve(ty).unwrap();
        assert_eq!(tables.len(), 8);
        assert!(tables.iter().all(|table| Arc::ptr_eq(table, &cached)));
    }
}
