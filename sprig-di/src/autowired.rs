//! Injection points filled by the container after all components are created.
//!
//! An [Autowired] field starts empty when its owner is constructed. During the injection phase
//! the container assigns the first compatible bean (or its proxy) exactly once. Fields for which
//! no compatible bean exists stay empty.

use crate::instance_provider::ComponentInstancePtr;
use once_cell::sync::OnceCell;
use std::any::{type_name, Any};
use std::fmt::{Debug, Formatter};
use thiserror::Error;

/// Errors related to writing a value into an injection point.
#[derive(Error, Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum AssignmentError {
    #[error("owner instance does not match the declaring component")]
    IncompatibleOwner,
    #[error("injected value does not match the field type")]
    IncompatibleValue,
    #[error("field has already been injected")]
    AlreadyAssigned,
}

/// A field which receives a bean of type `T` from the container. `T` is either a concrete
/// component type or a `dyn Trait + Send + Sync` capability.
pub struct Autowired<T: ?Sized> {
    cell: OnceCell<ComponentInstancePtr<T>>,
}

impl<T: ?Sized> Autowired<T> {
    /// Returns the injected instance, if any.
    #[inline]
    pub fn get(&self) -> Option<&ComponentInstancePtr<T>> {
        self.cell.get()
    }

    #[inline]
    pub fn is_wired(&self) -> bool {
        self.cell.get().is_some()
    }

    /// Manually wires given instance. Fails if the field is already wired.
    pub fn wire(&self, instance: ComponentInstancePtr<T>) -> Result<(), AssignmentError> {
        self.cell
            .set(instance)
            .map_err(|_| AssignmentError::AlreadyAssigned)
    }
}

impl<T: ?Sized> Default for Autowired<T> {
    fn default() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }
}

impl<T: ?Sized> Debug for Autowired<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Autowired")
            .field("type", &type_name::<T>())
            .field("wired", &self.is_wired())
            .finish()
    }
}

/// Type-erased access to an injection point, used by generated field injectors.
pub trait InjectionPoint {
    /// The requested bean type.
    type Target: ?Sized + 'static;

    /// Assigns a `Box<ComponentInstancePtr<Self::Target>>`.
    fn assign(&self, value: Box<dyn Any>) -> Result<(), AssignmentError>;
}

impl<T: ?Sized + 'static> InjectionPoint for Autowired<T> {
    type Target = T;

    fn assign(&self, value: Box<dyn Any>) -> Result<(), AssignmentError> {
        let value = value
            .downcast::<ComponentInstancePtr<T>>()
            .map_err(|_| AssignmentError::IncompatibleValue)?;
        self.wire(*value)
    }
}
