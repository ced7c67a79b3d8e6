//! A minimal inversion-of-control container. Component classes are discovered from a
//! [ClassUniverse](catalog::ClassUniverse), instantiated as singletons, optionally wrapped in
//! call-intercepting proxies by aspects, and finally wired together through
//! [Autowired](autowired::Autowired) fields.
//!
//! Wiring is a strictly sequential, all-or-nothing process:
//!
//! 1. [scanning](scanner::scan) - every class carrying the component marker is instantiated,
//! 2. [weaving](weaver::weave) - advice of aspect components is collected and a proxy is built
//!    for every advised component,
//! 3. [injection](injector::inject) - autowired fields receive the first compatible bean, or its
//!    proxy if one exists.
//!
//! See [component] for registering components and [proxy] for details about interception.

pub mod autowired;
pub mod catalog;
pub mod class;
pub mod component;
pub mod container;
pub mod error;
pub mod injector;
pub mod instance_provider;
pub mod proxy;
pub mod registry;
pub mod scanner;
pub mod weaver;

#[cfg(feature = "derive")]
pub use sprig_di_derive::{aspect, component_alias, injectable, Component};
