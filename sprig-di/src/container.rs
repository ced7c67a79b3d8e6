//! The container runs the whole wiring sequence - scanning, weaving and injection - and owns the
//! resulting registries.
//!
//! ```
//! use sprig_di::autowired::Autowired;
//! use sprig_di::catalog::ClassCatalog;
//! use sprig_di::container::Container;
//! use sprig_di::instance_provider::TypedComponentInstanceProvider;
//! use sprig_di::Component;
//! use std::any::TypeId;
//!
//! #[derive(Component)]
//! struct Dependency;
//!
//! #[derive(Component)]
//! struct Service {
//!     #[component(autowired)]
//!     dependency: Autowired<Dependency>,
//! }
//!
//! let catalog =
//!     ClassCatalog::select([TypeId::of::<Dependency>(), TypeId::of::<Service>()]).unwrap();
//! let container = Container::bootstrap(&catalog).unwrap();
//!
//! let service = container.instance_typed::<Service>().unwrap().unwrap();
//! assert!(service.dependency.is_wired());
//! ```

use crate::catalog::ClassUniverse;
use crate::error::{ContainerError, InjectionError};
use crate::injector::{inject, resolve};
use crate::instance_provider::ComponentInstanceProvider;
use crate::registry::{BeanRegistry, ProxyRegistry};
use crate::scanner::scan;
use crate::weaver::{weave, WeaverConfig};
use std::any::{Any, TypeId};
use tracing::info;

/// Builder for [Container]s with custom weaving configuration.
#[derive(Copy, Clone, Debug, Default)]
pub struct ContainerBuilder {
    weaver_config: WeaverConfig,
}

impl ContainerBuilder {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_weaver_config(mut self, weaver_config: WeaverConfig) -> Self {
        self.weaver_config = weaver_config;
        self
    }

    /// Allows later advice methods of one aspect to replace earlier ones of the same kind.
    pub fn with_advice_overriding(mut self, allow: bool) -> Self {
        self.weaver_config.allow_advice_overriding = allow;
        self
    }

    /// Runs scanning, weaving and injection over given universe. Any failure aborts the whole
    /// sequence.
    pub fn bootstrap(&self, universe: &dyn ClassUniverse) -> Result<Container, ContainerError> {
        let beans = scan(universe)?;
        let proxies = weave(universe, &beans, &self.weaver_config)?;
        inject(&beans, &proxies)?;

        info!(
            beans = beans.len(),
            proxies = proxies.len(),
            "Container bootstrapped."
        );

        Ok(Container { beans, proxies })
    }
}

/// Fully wired set of beans and proxies.
#[derive(Clone, Debug)]
pub struct Container {
    beans: BeanRegistry,
    proxies: ProxyRegistry,
}

impl Container {
    /// Bootstraps a container with default configuration.
    #[inline]
    pub fn bootstrap(universe: &dyn ClassUniverse) -> Result<Self, ContainerError> {
        ContainerBuilder::new().bootstrap(universe)
    }

    #[inline]
    pub fn beans(&self) -> &BeanRegistry {
        &self.beans
    }

    #[inline]
    pub fn proxies(&self) -> &ProxyRegistry {
        &self.proxies
    }
}

impl ComponentInstanceProvider for Container {
    fn instance(
        &self,
        type_id: TypeId,
        type_name: &'static str,
    ) -> Result<Option<Box<dyn Any>>, InjectionError> {
        resolve(&self.beans, Some(&self.proxies), type_id, type_name)
    }

    fn raw_instance(
        &self,
        type_id: TypeId,
        type_name: &'static str,
    ) -> Result<Option<Box<dyn Any>>, InjectionError> {
        resolve(&self.beans, None, type_id, type_name)
    }
}
