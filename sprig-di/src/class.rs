//! Static metadata describing component classes: their markers, injection points, advice methods
//! and capabilities. Descriptors are normally generated by the derive/attribute macros, but can
//! also be assembled by hand.

use crate::autowired::{AssignmentError, InjectionPoint};
use crate::component::{Component, ComponentDowncast};
use crate::instance_provider::{
    CastFunction, ComponentInstanceAnyPtr, ComponentInstancePtr, ErrorPtr,
};
use crate::proxy::{AdviceFunction, AdviceHandle, Capability, InterceptorPtr};
use derivative::Derivative;
use std::any::{type_name, Any, TypeId};
use std::fmt::{Display, Formatter};

/// Creates a fresh, type-erased instance of a class.
pub type ConstructorFunction = fn() -> Result<ComponentInstanceAnyPtr, ErrorPtr>;

/// Writes a value (`Box<ComponentInstancePtr<T>>`) into a field of the given owner.
pub type FieldInjector =
    fn(owner: &ComponentInstanceAnyPtr, value: Box<dyn Any>) -> Result<(), AssignmentError>;

/// Wraps the given instance in a proxy viewed as a given capability. The result is a
/// `Box<ComponentInstancePtr<dyn Trait>>` erased as `Box<dyn Any>`.
pub type ProxyFactory = fn(
    instance: ComponentInstanceAnyPtr,
    interceptor: InterceptorPtr,
) -> Result<Box<dyn Any>, ComponentInstanceAnyPtr>;

/// Markers placed on a class.
#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub enum ClassMarker {
    /// The class should be instantiated and registered as a bean.
    Component,
    /// The class is a source of advice.
    Aspect,
}

/// Markers placed on a field.
#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub enum FieldMarker {
    /// The field should receive a compatible bean.
    Autowired,
}

/// Kind of advice a method can provide.
#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub enum AdviceKind {
    Before,
    After,
}

impl Display for AdviceKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AdviceKind::Before => write!(f, "before"),
            AdviceKind::After => write!(f, "after"),
        }
    }
}

/// Markers placed on a method. Both carry a `<class>.<method>` target specification.
#[derive(Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub enum MethodMarker {
    Before(String),
    After(String),
}

impl MethodMarker {
    #[inline]
    pub fn kind(&self) -> AdviceKind {
        match self {
            MethodMarker::Before(_) => AdviceKind::Before,
            MethodMarker::After(_) => AdviceKind::After,
        }
    }

    #[inline]
    pub fn target(&self) -> &str {
        match self {
            MethodMarker::Before(target) | MethodMarker::After(target) => target,
        }
    }
}

/// Converts a Rust path into a dotted class identifier, e.g. `app::svc::Greeter` becomes
/// `app.svc.Greeter`.
pub fn class_id_from_path(path: &str) -> String {
    path.replace("::", ".")
}

/// A declared field.
#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub markers: Vec<FieldMarker>,
    /// Bean type requested by the field.
    pub requested_type: TypeId,
    pub requested_type_name: &'static str,
    #[derivative(Debug = "ignore")]
    pub inject: FieldInjector,
}

impl FieldDescriptor {
    /// Creates an autowired field descriptor for a given injection point type.
    pub fn autowired<P: InjectionPoint>(name: &'static str, inject: FieldInjector) -> Self {
        Self {
            name,
            markers: vec![FieldMarker::Autowired],
            requested_type: TypeId::of::<P::Target>(),
            requested_type_name: type_name::<P::Target>(),
            inject,
        }
    }

    #[inline]
    pub fn has_marker(&self, marker: FieldMarker) -> bool {
        self.markers.contains(&marker)
    }
}

/// A declared method, invocable as advice.
#[derive(Clone, Debug)]
pub struct MethodDescriptor {
    pub markers: Vec<MethodMarker>,
    pub handle: AdviceHandle,
}

impl MethodDescriptor {
    pub fn new(name: &'static str, markers: Vec<MethodMarker>, invoke: AdviceFunction) -> Self {
        Self {
            markers,
            handle: AdviceHandle {
                method_name: name,
                invoke,
            },
        }
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.handle.method_name
    }
}

/// A type a class can be injected as - either the concrete class itself, or a `dyn Trait`.
#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub struct CapabilityDescriptor {
    pub type_id: TypeId,
    pub type_name: &'static str,
    /// Methods callable through this capability.
    pub methods: &'static [&'static str],
    #[derivative(Debug = "ignore")]
    pub cast: CastFunction,
    /// Proxy factory - only available for traits.
    #[derivative(Debug = "ignore")]
    pub proxy: Option<ProxyFactory>,
}

impl CapabilityDescriptor {
    /// Creates a descriptor for a concrete component type.
    pub fn concrete<T: Component>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            methods: &[],
            cast: cast_concrete::<T>,
            proxy: None,
        }
    }

    /// Creates a descriptor for a proxyable trait capability.
    pub fn of<T: Capability + ?Sized>(cast: CastFunction, proxy: Option<ProxyFactory>) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            methods: T::METHODS,
            cast,
            proxy,
        }
    }
}

/// Full description of a class.
#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub struct ClassDescriptor {
    pub class_id: String,
    pub type_id: TypeId,
    pub type_name: &'static str,
    pub markers: Vec<ClassMarker>,
    #[derivative(Debug = "ignore")]
    pub constructor: ConstructorFunction,
    pub fields: Vec<FieldDescriptor>,
    pub methods: Vec<MethodDescriptor>,
    pub capabilities: Vec<CapabilityDescriptor>,
}

impl ClassDescriptor {
    /// Creates a bare descriptor without markers, members or capabilities.
    pub fn new(
        class_id: impl Into<String>,
        type_id: TypeId,
        type_name: &'static str,
        constructor: ConstructorFunction,
    ) -> Self {
        Self {
            class_id: class_id.into(),
            type_id,
            type_name,
            markers: vec![],
            constructor,
            fields: vec![],
            methods: vec![],
            capabilities: vec![],
        }
    }

    /// Creates a descriptor of a component class, with the component marker and its concrete
    /// type as the only capability. The class identifier is derived from the type path.
    pub fn of<T: Component>() -> Self {
        Self::new(
            class_id_from_path(type_name::<T>()),
            TypeId::of::<T>(),
            type_name::<T>(),
            construct::<T>,
        )
        .with_marker(ClassMarker::Component)
        .with_capability(CapabilityDescriptor::concrete::<T>())
    }

    pub fn with_class_id(mut self, class_id: impl Into<String>) -> Self {
        self.class_id = class_id.into();
        self
    }

    pub fn with_marker(mut self, marker: ClassMarker) -> Self {
        if !self.markers.contains(&marker) {
            self.markers.push(marker);
        }
        self
    }

    pub fn with_field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_method(mut self, method: MethodDescriptor) -> Self {
        self.methods.push(method);
        self
    }

    pub fn with_capability(mut self, capability: CapabilityDescriptor) -> Self {
        self.capabilities.push(capability);
        self
    }

    #[inline]
    pub fn has_marker(&self, marker: ClassMarker) -> bool {
        self.markers.contains(&marker)
    }

    /// Returns the capability for given type, if the class is assignable to it.
    pub fn capability(&self, type_id: TypeId) -> Option<&CapabilityDescriptor> {
        self.capabilities
            .iter()
            .find(|capability| capability.type_id == type_id)
    }

    #[inline]
    pub fn is_assignable_to(&self, type_id: TypeId) -> bool {
        self.capability(type_id).is_some()
    }

    /// Checks if any capability declares a method with given name.
    pub fn declares_method(&self, name: &str) -> bool {
        self.capabilities
            .iter()
            .flat_map(|capability| capability.methods.iter())
            .any(|method| *method == name)
    }
}

fn construct<T: Component>() -> Result<ComponentInstanceAnyPtr, ErrorPtr> {
    T::create().map(|instance| ComponentInstancePtr::new(instance) as ComponentInstanceAnyPtr)
}

fn cast_concrete<T: Component>(
    instance: ComponentInstanceAnyPtr,
) -> Result<Box<dyn Any>, ComponentInstanceAnyPtr> {
    <T as ComponentDowncast<T>>::downcast(instance).map(|p| Box::new(p) as Box<dyn Any>)
}
