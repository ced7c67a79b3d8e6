//! One of the basic blocks of the container is a [Component]. Components are singleton objects
//! created with a zero-argument constructor, whose `#[component(autowired)]` fields are filled in
//! afterwards with other components.
//!
//! ## Registering concrete components
//!
//! Any type which wants to be managed by the container, needs to implement `Component`. For
//! convenience, the trait can be automatically derived with all infrastructure if the `derive`
//! feature is enabled:
//!
//! ```
//! use sprig_di::autowired::Autowired;
//! use sprig_di::{component_alias, injectable, Component};
//!
//! #[injectable]
//! trait TestTrait {}
//!
//! #[derive(Component)]
//! struct TestDependency;
//!
//! #[component_alias]
//! impl TestTrait for TestDependency {}
//!
//! #[derive(Component)]
//! #[component(class = "app.TestComponent")]
//! struct TestComponent {
//!     // concrete type dependency
//!     #[component(autowired)]
//!     dependency_1: Autowired<TestDependency>,
//!     // dyn Trait dependency - note the Send + Sync bounds
//!     #[component(autowired)]
//!     dependency_2: Autowired<dyn TestTrait + Send + Sync>,
//!     // not an injection point - initialized with Default::default()
//!     counter: i8,
//!     #[component(default = "dummy_expr")]
//!     default_expr: i8,
//! }
//!
//! fn dummy_expr() -> i8 {
//!     -1
//! }
//! ```
//!
//! ### Supported `#[component]` struct configuration
//!
//! * `class = "a.b.Name"` - use given class identifier, instead of the one generated from the
//! module path and type name
//! * `constructor = "expr"` - call `expr()` to construct the component, instead of using
//! standard struct construction; must return `Result<Self, ErrorPtr>`
//!
//! ### Supported `#[component]` field configuration
//!
//! * `autowired` - mark the field as an injection point; the field type must be
//! [Autowired](crate::autowired::Autowired)
//! * `default = "expr"` - call `expr()` for initialization
//!
//! ## Registering capabilities
//!
//! Capabilities are `dyn Trait` types a component can be injected as. Each injectable trait must
//! be marked with the `#[injectable]` attribute, which also generates the proxy used when an
//! aspect advises the component. Capabilities are registered with `#[component_alias]` on a
//! trait implementation.

use crate::instance_provider::{ComponentInstanceAnyPtr, ComponentInstancePtr, ErrorPtr};

/// Base trait for components managed by the container.
///
/// Components are created with a zero-argument constructor and receive their dependencies only
/// afterwards, through [Autowired](crate::autowired::Autowired) fields.
pub trait Component: ComponentDowncast<Self> + Send + Sync + Sized {
    /// Creates a fresh instance of this component. Injection points are left empty.
    fn create() -> Result<Self, ErrorPtr>;
}

/// Helper trait for types implemented by components, thus allowing injection of components based
/// on `dyn Trait` types. The type `C` refers to a concrete component type. Typically automatically
/// derived when using the `#[component_alias]` attribute.
pub trait ComponentDowncast<C: Component>: Injectable {
    fn downcast(
        source: ComponentInstanceAnyPtr,
    ) -> Result<ComponentInstancePtr<Self>, ComponentInstanceAnyPtr>;
}

/// Marker trait for injectable types - components and capabilities.
pub trait Injectable: 'static {}
