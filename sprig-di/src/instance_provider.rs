//! Shared pointer types and generic access to container-managed instances.

use crate::component::Injectable;
use crate::error::InjectionError;
use std::any::{type_name, Any, TypeId};
use std::error::Error;
use std::sync::Arc;

pub type ComponentInstancePtr<T> = Arc<T>;

pub type ComponentInstanceAnyPtr = ComponentInstancePtr<dyn Any + Send + Sync + 'static>;

/// Type-erased error returned by user code, e.g. custom constructors or runners.
pub type ErrorPtr = Arc<dyn Error + Send + Sync + 'static>;

/// Casts a type-erased instance to a `Box<ComponentInstancePtr<T>>` for a concrete type or a
/// `dyn Trait`, erased again as `Box<dyn Any>`. Returns the original instance on failure.
pub type CastFunction =
    fn(instance: ComponentInstanceAnyPtr) -> Result<Box<dyn Any>, ComponentInstanceAnyPtr>;

/// Generic provider for bean instances of a wired container.
pub trait ComponentInstanceProvider {
    /// Returns the first bean assignable to the given type, using the same rule as field
    /// injection: if the bean is proxied, the proxy is returned.
    fn instance(
        &self,
        type_id: TypeId,
        type_name: &'static str,
    ) -> Result<Option<Box<dyn Any>>, InjectionError>;

    /// Returns the first bean assignable to the given type, ignoring any proxies.
    fn raw_instance(
        &self,
        type_id: TypeId,
        type_name: &'static str,
    ) -> Result<Option<Box<dyn Any>>, InjectionError>;
}

/// Helper trait for [ComponentInstanceProvider] providing strongly-typed access.
pub trait TypedComponentInstanceProvider {
    /// Typesafe version of [ComponentInstanceProvider::instance].
    fn instance_typed<T: Injectable + ?Sized>(
        &self,
    ) -> Result<Option<ComponentInstancePtr<T>>, InjectionError>;

    /// Typesafe version of [ComponentInstanceProvider::raw_instance].
    fn raw_instance_typed<T: Injectable + ?Sized>(
        &self,
    ) -> Result<Option<ComponentInstancePtr<T>>, InjectionError>;
}

impl<CIP: ComponentInstanceProvider + ?Sized> TypedComponentInstanceProvider for CIP {
    fn instance_typed<T: Injectable + ?Sized>(
        &self,
    ) -> Result<Option<ComponentInstancePtr<T>>, InjectionError> {
        self.instance(TypeId::of::<T>(), type_name::<T>())?
            .map(downcast::<T>)
            .transpose()
    }

    fn raw_instance_typed<T: Injectable + ?Sized>(
        &self,
    ) -> Result<Option<ComponentInstancePtr<T>>, InjectionError> {
        self.raw_instance(TypeId::of::<T>(), type_name::<T>())?
            .map(downcast::<T>)
            .transpose()
    }
}

fn downcast<T: Injectable + ?Sized>(
    instance: Box<dyn Any>,
) -> Result<ComponentInstancePtr<T>, InjectionError> {
    instance
        .downcast::<ComponentInstancePtr<T>>()
        .map(|instance| *instance)
        .map_err(|_| InjectionError::TypeMismatch(type_name::<T>()))
}
