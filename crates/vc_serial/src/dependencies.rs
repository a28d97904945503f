use alloc::boxed::Box;
use core::any::{Any, type_name};
use core::fmt;

use vc_utils::TypeIdMap;

use crate::SerialError;

// -----------------------------------------------------------------------------
// DependencyCollection

/// Services a serializer may need, looked up by type.
///
/// # Example
///
/// ```
/// use vc_serial::DependencyCollection;
///
/// struct Units {
///     meters_per_unit: f32,
/// }
///
/// let mut dependencies = DependencyCollection::new();
/// dependencies.insert(Units { meters_per_unit: 0.5 });
///
/// let units = dependencies.resolve::<Units>().unwrap();
/// assert_eq!(units.meters_per_unit, 0.5);
/// assert!(dependencies.resolve::<String>().is_err());
/// ```
#[derive(Default)]
pub struct DependencyCollection {
    services: TypeIdMap<Box<dyn Any + Send + Sync>>,
}

impl DependencyCollection {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a service, returning the one it replaces.
    pub fn insert<T: Any + Send + Sync>(&mut self, service: T) -> Option<T> {
        self.services
            .insert_type::<T>(Box::new(service))
            .and_then(|previous| previous.downcast::<T>().ok())
            .map(|previous| *previous)
    }

    #[inline]
    pub fn get<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.services
            .get_type::<T>()
            .and_then(|service| service.downcast_ref::<T>())
    }

    /// Like [`get`](Self::get), but a missing service is an error.
    pub fn resolve<T: Any + Send + Sync>(&self) -> Result<&T, SerialError> {
        self.get::<T>().ok_or(SerialError::MissingDependency {
            type_path: type_name::<T>(),
        })
    }

    #[inline]
    pub fn contains<T: Any + Send + Sync>(&self) -> bool {
        self.services.contains_type::<T>()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.services.len()
    }
}

impl fmt::Debug for DependencyCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DependencyCollection")
            .field("services", &self.services.len())
            .finish()
    }
}
