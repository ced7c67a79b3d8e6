//! Discovery phase: instantiates every component class of a [ClassUniverse].

use crate::catalog::ClassUniverse;
use crate::class::ClassMarker;
use crate::error::DiscoveryError;
use crate::registry::BeanRegistry;
use tracing::{debug, info, trace};

/// Creates one bean per class carrying the component marker. Any instantiation failure aborts
/// the scan.
pub fn scan(universe: &dyn ClassUniverse) -> Result<BeanRegistry, DiscoveryError> {
    info!("Scanning for components...");

    let mut registry = BeanRegistry::default();
    for class_id in universe.class_ids() {
        let descriptor = universe
            .load(&class_id)
            .ok_or_else(|| DiscoveryError::ClassNotFound(class_id.clone()))?;

        if !descriptor.has_marker(ClassMarker::Component) {
            trace!(class_id = %class_id, "Skipping class without component marker.");
            continue;
        }

        let instance =
            (descriptor.constructor)().map_err(|error| DiscoveryError::Instantiation {
                class_id: descriptor.class_id.clone(),
                error,
            })?;

        debug!(class_id = %descriptor.class_id, "Registered bean.");
        registry.try_register(descriptor, instance)?;
    }

    Ok(registry)
}

#[cfg(test)]
mod tests {
    use crate::catalog::MockClassUniverse;
    use crate::class::{ClassDescriptor, ClassMarker};
    use crate::error::DiscoveryError;
    use crate::instance_provider::{ComponentInstanceAnyPtr, ComponentInstancePtr, ErrorPtr};
    use crate::scanner::scan;
    use mockall::predicate::*;
    use std::any::{type_name, TypeId};
    use std::fmt::{Display, Formatter};
    use std::sync::Arc;

    #[derive(Debug)]
    struct ConstructionError;

    impl Display for ConstructionError {
        fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
            write!(f, "no accessible constructor")
        }
    }

    impl std::error::Error for ConstructionError {}

    fn constructor() -> Result<ComponentInstanceAnyPtr, ErrorPtr> {
        Ok(ComponentInstancePtr::new(0_u8) as ComponentInstanceAnyPtr)
    }

    fn error_constructor() -> Result<ComponentInstanceAnyPtr, ErrorPtr> {
        Err(Arc::new(ConstructionError) as ErrorPtr)
    }

    fn create_descriptor(class_id: &str, component: bool) -> ClassDescriptor {
        let descriptor =
            ClassDescriptor::new(class_id, TypeId::of::<u8>(), type_name::<u8>(), constructor);
        if component {
            descriptor.with_marker(ClassMarker::Component)
        } else {
            descriptor
        }
    }

    #[test]
    fn should_register_only_components() {
        let mut universe = MockClassUniverse::new();
        universe
            .expect_class_ids()
            .times(1)
            .return_const(vec!["app.Service".to_string(), "app.Plain".to_string()]);
        universe
            .expect_load()
            .with(eq("app.Service"))
            .times(1)
            .return_const(Some(create_descriptor("app.Service", true)));
        universe
            .expect_load()
            .with(eq("app.Plain"))
            .times(1)
            .return_const(Some(create_descriptor("app.Plain", false)));

        let registry = scan(&universe).unwrap();

        assert_eq!(registry.len(), 1);
        assert!(registry.contains("app.Service"));
        assert!(!registry.contains("app.Plain"));
    }

    #[test]
    fn should_fail_on_unknown_class() {
        let mut universe = MockClassUniverse::new();
        universe
            .expect_class_ids()
            .return_const(vec!["app.Missing".to_string()]);
        universe
            .expect_load()
            .with(eq("app.Missing"))
            .return_const(None);

        assert!(matches!(
            scan(&universe).unwrap_err(),
            DiscoveryError::ClassNotFound(class_id) if class_id == "app.Missing"
        ));
    }

    #[test]
    fn should_abort_on_constructor_error() {
        let mut descriptor = create_descriptor("app.Broken", true);
        descriptor.constructor = error_constructor;

        let mut universe = MockClassUniverse::new();
        universe.expect_class_ids().return_const(vec![
            "app.Broken".to_string(),
            "app.Never".to_string(),
        ]);
        universe
            .expect_load()
            .with(eq("app.Broken"))
            .times(1)
            .return_const(Some(descriptor));
        universe.expect_load().with(eq("app.Never")).never();

        assert!(matches!(
            scan(&universe).unwrap_err(),
            DiscoveryError::Instantiation { class_id, .. } if class_id == "app.Broken"
        ));
    }
}
