//! The universe of classes known to the container. Components, capabilities and aspect methods
//! registered with the derive/attribute macros are collected statically at link time and
//! assembled into a [ClassCatalog], which then serves as the [ClassUniverse] for wiring.

use crate::class::{ClassDescriptor, ClassMarker};
use crate::error::DiscoveryError;
use fxhash::{FxHashMap, FxHashSet};
use itertools::Itertools;
#[cfg(test)]
use mockall::automock;
use std::any::TypeId;
use tracing::{debug, warn};

/// Source of candidate classes for a deployment.
#[cfg_attr(test, automock)]
pub trait ClassUniverse {
    /// Returns identifiers of all classes in this universe.
    fn class_ids(&self) -> Vec<String>;

    /// Loads the descriptor of a class with given identifier.
    fn load(&self, class_id: &str) -> Option<ClassDescriptor>;

    /// Returns the identifier of the class describing the given type.
    fn class_id_of(&self, type_id: TypeId) -> Option<String>;
}

/// A [ClassUniverse] backed by a list of class descriptors.
#[derive(Clone, Debug, Default)]
pub struct ClassCatalog {
    classes: Vec<ClassDescriptor>,
    by_id: FxHashMap<String, usize>,
    by_type: FxHashMap<TypeId, usize>,
}

impl ClassCatalog {
    /// Creates a catalog from all statically registered classes. Classes are ordered by their
    /// identifiers. Fails if a capability is registered for a type which is not a component.
    /// Aspect methods of such types are skipped.
    pub fn discover() -> Result<Self, DiscoveryError> {
        Self::assemble(|_| true, true)
    }

    /// Creates a catalog from statically registered classes of given types only. Capabilities and
    /// aspect methods of other types are ignored.
    pub fn select<I: IntoIterator<Item = TypeId>>(types: I) -> Result<Self, DiscoveryError> {
        let types: FxHashSet<TypeId> = types.into_iter().collect();
        Self::assemble(|type_id| types.contains(&type_id), false)
    }

    /// Creates a catalog from explicit descriptors, keeping their order.
    pub fn from_descriptors(classes: Vec<ClassDescriptor>) -> Result<Self, DiscoveryError> {
        let mut by_id = FxHashMap::default();
        let mut by_type = FxHashMap::default();

        for (index, descriptor) in classes.iter().enumerate() {
            if by_id.insert(descriptor.class_id.clone(), index).is_some() {
                return Err(DiscoveryError::DuplicateClass(descriptor.class_id.clone()));
            }

            by_type.entry(descriptor.type_id).or_insert(index);
        }

        Ok(Self {
            classes,
            by_id,
            by_type,
        })
    }

    #[inline]
    pub fn descriptors(&self) -> &[ClassDescriptor] {
        &self.classes
    }

    fn assemble<F: Fn(TypeId) -> bool>(
        include: F,
        strict: bool,
    ) -> Result<Self, DiscoveryError> {
        let mut classes: FxHashMap<TypeId, ClassDescriptor> = FxHashMap::default();
        for registerer in inventory::iter::<internal::ComponentRegisterer> {
            let descriptor = (registerer.register)();
            if !include(descriptor.type_id) {
                continue;
            }

            if classes.contains_key(&descriptor.type_id) {
                return Err(DiscoveryError::DuplicateClass(descriptor.class_id));
            }

            classes.insert(descriptor.type_id, descriptor);
        }

        for registerer in inventory::iter::<internal::CapabilityRegisterer> {
            let definition = (registerer.register)();
            match classes.get_mut(&definition.target_type) {
                Some(descriptor) => descriptor.capabilities.push(definition.capability),
                None if strict => {
                    return Err(DiscoveryError::MissingBaseComponent {
                        capability_type: definition.capability.type_name.to_string(),
                        target_type: definition.target_name.to_string(),
                    })
                }
                None => {}
            }
        }

        for registerer in inventory::iter::<internal::AspectRegisterer> {
            let definition = (registerer.register)();
            match classes.get_mut(&definition.aspect_type) {
                Some(descriptor) => {
                    descriptor.markers.push(ClassMarker::Aspect);
                    descriptor.methods.extend(definition.methods);
                }
                // aspects are only woven when they are beans themselves
                None => warn!(
                    aspect = definition.aspect_name,
                    "Skipping aspect methods of a type which is not a component."
                ),
            }
        }

        let classes = classes
            .into_values()
            .map(|mut descriptor| {
                descriptor.markers.sort_unstable();
                descriptor.markers.dedup();
                descriptor
            })
            .sorted_by(|a, b| a.class_id.cmp(&b.class_id))
            .collect_vec();

        debug!(count = classes.len(), "Assembled class catalog.");

        Self::from_descriptors(classes)
    }
}

impl ClassUniverse for ClassCatalog {
    fn class_ids(&self) -> Vec<String> {
        self.classes
            .iter()
            .map(|descriptor| descriptor.class_id.clone())
            .collect()
    }

    fn load(&self, class_id: &str) -> Option<ClassDescriptor> {
        self.by_id
            .get(class_id)
            .and_then(|index| self.classes.get(*index))
            .cloned()
    }

    fn class_id_of(&self, type_id: TypeId) -> Option<String> {
        self.by_type
            .get(&type_id)
            .and_then(|index| self.classes.get(*index))
            .map(|descriptor| descriptor.class_id.clone())
    }
}

#[doc(hidden)]
pub mod internal {
    use crate::class::{CapabilityDescriptor, ClassDescriptor, MethodDescriptor};
    use inventory::collect;
    pub use inventory::submit;
    use std::any::TypeId;

    pub struct ComponentRegisterer {
        pub register: fn() -> ClassDescriptor,
    }

    #[derive(Clone, Debug)]
    pub struct CapabilityDefinition {
        pub target_type: TypeId,
        pub target_name: &'static str,
        pub capability: CapabilityDescriptor,
    }

    pub struct CapabilityRegisterer {
        pub register: fn() -> CapabilityDefinition,
    }

    #[derive(Clone, Debug)]
    pub struct AspectDefinition {
        pub aspect_type: TypeId,
        pub aspect_name: &'static str,
        pub methods: Vec<MethodDescriptor>,
    }

    pub struct AspectRegisterer {
        pub register: fn() -> AspectDefinition,
    }

    collect!(ComponentRegisterer);
    collect!(CapabilityRegisterer);
    collect!(AspectRegisterer);
}
