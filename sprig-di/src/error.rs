use crate::autowired::AssignmentError;
use crate::class::AdviceKind;
use crate::instance_provider::ErrorPtr;
use thiserror::Error;

/// Errors related to discovering classes and instantiating components.
#[derive(Error, Clone, Debug)]
pub enum DiscoveryError {
    #[error("Cannot load class: {0}")]
    ClassNotFound(String),
    #[error("Cannot instantiate component {class_id}: {error}")]
    Instantiation { class_id: String, error: ErrorPtr },
    #[error("Attempted to register a duplicated class: {0}")]
    DuplicateClass(String),
    #[error("Attempted to register a duplicated bean for class: {0}")]
    DuplicateBean(String),
    #[error("Missing base component of type {target_type} for capability: {capability_type}")]
    MissingBaseComponent {
        capability_type: String,
        target_type: String,
    },
}

/// Errors related to collecting advice and building proxies.
#[derive(Error, Clone, Debug)]
pub enum WeavingError {
    #[error("Invalid advice target '{specification}' in aspect {aspect} - expected <class>.<method>")]
    InvalidTargetSpecification {
        aspect: String,
        specification: String,
    },
    #[error("Aspect {aspect} declares multiple {kind} advice methods: {first} and {second}")]
    DuplicateAdvice {
        aspect: String,
        kind: AdviceKind,
        first: &'static str,
        second: &'static str,
    },
    #[error("Aspect {aspect} advises {existing}, but also declares advice for {conflicting}")]
    ConflictingAdviceTarget {
        aspect: String,
        existing: String,
        conflicting: String,
    },
    #[error("Cannot instantiate aspect {aspect}: {error}")]
    AspectInstantiation { aspect: String, error: ErrorPtr },
    #[error("Aspect {aspect} advises unknown class: {target}")]
    UnknownTargetClass { aspect: String, target: String },
    #[error("Aspect {aspect} advises class {target}, which is not a registered component")]
    MissingTargetBean { aspect: String, target: String },
    #[error("Attempted to register a second proxy for class: {0}")]
    DuplicateProxy(String),
}

/// Errors related to assigning beans to injection points.
#[derive(Error, Clone, Debug)]
pub enum InjectionError {
    #[error("Cannot inject field {field} of {class_id}: {error}")]
    Assignment {
        class_id: String,
        field: &'static str,
        error: AssignmentError,
    },
    #[error("Component {class_id} is proxied and cannot be injected as its concrete type: {requested}")]
    ProxyNotAssignable {
        class_id: String,
        requested: &'static str,
    },
    #[error("Component {class_id} cannot be cast to: {requested}")]
    IncompatibleComponent {
        class_id: String,
        requested: &'static str,
    },
    #[error("Tried to downcast component to incompatible type: {0}")]
    TypeMismatch(&'static str),
}

/// Error of the whole wiring sequence.
#[derive(Error, Clone, Debug)]
pub enum ContainerError {
    #[error("Discovery error: {0}")]
    Discovery(#[from] DiscoveryError),
    #[error("Weaving error: {0}")]
    Weaving(#[from] WeavingError),
    #[error("Injection error: {0}")]
    Injection(#[from] InjectionError),
}
