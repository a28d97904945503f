use alloc::boxed::Box;
use alloc::sync::Arc;
use core::any::Any;
use std::sync::{PoisonError, RwLock};

use crate::SerialError;
use crate::info::{GenericTypeInfoCell, TypeInfo, Typed, definition};
use crate::ops::{Shared, take};

impl<T: Typed> Typed for Arc<RwLock<T>> {
    fn type_info() -> &'static TypeInfo {
        static CELL: GenericTypeInfoCell = GenericTypeInfoCell::new();
        CELL.get_or_insert::<Self>(|| TypeInfo::shared::<Self, T>(definition::SHARED))
    }
}

impl<T: Any> Shared for Arc<RwLock<T>> {
    fn with_inner(&self, f: &mut dyn FnMut(&dyn Any)) {
        let inner = self.read().unwrap_or_else(PoisonError::into_inner);
        f(&*inner);
    }

    fn with_inner_mut(&self, f: &mut dyn FnMut(&mut dyn Any)) {
        let mut inner = self.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut *inner);
    }

    fn replace_inner(&self, value: Box<dyn Any>) -> Result<(), SerialError> {
        let value = take::<T>(value)?;
        *self.write().unwrap_or_else(PoisonError::into_inner) = value;
        Ok(())
    }

    #[inline]
    fn same_handle(&self, other: &dyn Any) -> bool {
        other.downcast_ref::<Self>().is_some_and(|other| Arc::ptr_eq(self, other))
    }

    #[inline]
    fn handle(&self) -> Box<dyn Shared> {
        Box::new(Arc::clone(self))
    }

    fn from_inner(value: Box<dyn Any>) -> Result<Self, SerialError> {
        take::<T>(value).map(|value| Arc::new(RwLock::new(value)))
    }
}

// -----------------------------------------------------------------------------
// Tests
