//! Bean and proxy registries owned by a single wiring sequence.

use crate::class::{CapabilityDescriptor, ClassDescriptor};
use crate::error::{DiscoveryError, WeavingError};
use crate::instance_provider::ComponentInstanceAnyPtr;
use crate::proxy::InterceptorPtr;
use derivative::Derivative;
use fxhash::FxHashMap;
use std::any::{Any, TypeId};

/// A singleton instance of a component class, together with its descriptor.
#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub struct Bean {
    descriptor: ClassDescriptor,
    #[derivative(Debug = "ignore")]
    instance: ComponentInstanceAnyPtr,
}

impl Bean {
    #[inline]
    pub fn class_id(&self) -> &str {
        &self.descriptor.class_id
    }

    #[inline]
    pub fn descriptor(&self) -> &ClassDescriptor {
        &self.descriptor
    }

    #[inline]
    pub fn instance(&self) -> &ComponentInstanceAnyPtr {
        &self.instance
    }
}

/// Class identifier to bean mapping, iterated in registration order.
#[derive(Clone, Debug, Default)]
pub struct BeanRegistry {
    beans: Vec<Bean>,
    index: FxHashMap<String, usize>,
}

impl BeanRegistry {
    pub(crate) fn try_register(
        &mut self,
        descriptor: ClassDescriptor,
        instance: ComponentInstanceAnyPtr,
    ) -> Result<(), DiscoveryError> {
        if self.index.contains_key(&descriptor.class_id) {
            return Err(DiscoveryError::DuplicateBean(descriptor.class_id));
        }

        self.index
            .insert(descriptor.class_id.clone(), self.beans.len());
        self.beans.push(Bean {
            descriptor,
            instance,
        });

        Ok(())
    }

    #[inline]
    pub fn get(&self, class_id: &str) -> Option<&Bean> {
        self.index
            .get(class_id)
            .and_then(|index| self.beans.get(*index))
    }

    #[inline]
    pub fn contains(&self, class_id: &str) -> bool {
        self.index.contains_key(class_id)
    }

    /// Returns the first bean, in registration order, assignable to given type.
    pub fn first_assignable(&self, type_id: TypeId) -> Option<(&Bean, &CapabilityDescriptor)> {
        self.beans.iter().find_map(|bean| {
            bean.descriptor
                .capability(type_id)
                .map(|capability| (bean, capability))
        })
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Bean> {
        self.beans.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.beans.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.beans.is_empty()
    }
}

/// Intercepting stand-in for a bean. Views for particular capabilities are created on demand,
/// all sharing the same [Interceptor](crate::proxy::Interceptor).
#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub struct ProxyBean {
    target_class_id: String,
    #[derivative(Debug = "ignore")]
    target: ComponentInstanceAnyPtr,
    interceptor: InterceptorPtr,
}

impl ProxyBean {
    pub fn new(
        target_class_id: String,
        target: ComponentInstanceAnyPtr,
        interceptor: InterceptorPtr,
    ) -> Self {
        Self {
            target_class_id,
            target,
            interceptor,
        }
    }

    #[inline]
    pub fn target_class_id(&self) -> &str {
        &self.target_class_id
    }

    #[inline]
    pub fn interceptor(&self) -> &InterceptorPtr {
        &self.interceptor
    }

    /// Creates a view of this proxy as given capability. Returns `None` if the capability cannot
    /// be proxied (concrete types).
    pub fn view(
        &self,
        capability: &CapabilityDescriptor,
    ) -> Option<Result<Box<dyn Any>, ComponentInstanceAnyPtr>> {
        capability
            .proxy
            .map(|factory| factory(self.target.clone(), self.interceptor.clone()))
    }
}

/// Target class identifier to proxy mapping.
#[derive(Clone, Debug, Default)]
pub struct ProxyRegistry {
    proxies: FxHashMap<String, ProxyBean>,
}

impl ProxyRegistry {
    pub(crate) fn try_register(&mut self, proxy: ProxyBean) -> Result<(), WeavingError> {
        if self.proxies.contains_key(&proxy.target_class_id) {
            return Err(WeavingError::DuplicateProxy(proxy.target_class_id));
        }

        self.proxies.insert(proxy.target_class_id.clone(), proxy);
        Ok(())
    }

    #[inline]
    pub fn get(&self, class_id: &str) -> Option<&ProxyBean> {
        self.proxies.get(class_id)
    }

    #[inline]
    pub fn contains(&self, class_id: &str) -> bool {
        self.proxies.contains_key(class_id)
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &ProxyBean> {
        self.proxies.values()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.proxies.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.proxies.is_empty()
    }
}
