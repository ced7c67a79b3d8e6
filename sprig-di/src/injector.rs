//! Injection phase: fills `#[component(autowired)]` fields of every bean.

use crate::class::FieldMarker;
use crate::error::InjectionError;
use crate::registry::{BeanRegistry, ProxyRegistry};
use std::any::{Any, TypeId};
use tracing::{debug, info};

/// Assigns the first compatible bean to each autowired field, in registry order. If the selected
/// bean is proxied, its proxy is assigned instead. Fields without a compatible bean are left
/// empty.
pub fn inject(beans: &BeanRegistry, proxies: &ProxyRegistry) -> Result<(), InjectionError> {
    info!("Injecting dependencies...");

    for bean in beans.iter() {
        for field in bean
            .descriptor()
            .fields
            .iter()
            .filter(|field| field.has_marker(FieldMarker::Autowired))
        {
            let value = resolve(
                beans,
                Some(proxies),
                field.requested_type,
                field.requested_type_name,
            )?;

            match value {
                Some(value) => {
                    (field.inject)(bean.instance(), value).map_err(|error| {
                        InjectionError::Assignment {
                            class_id: bean.class_id().to_string(),
                            field: field.name,
                            error,
                        }
                    })?;

                    debug!(
                        class_id = %bean.class_id(),
                        field = field.name,
                        requested = field.requested_type_name,
                        "Injected field."
                    );
                }
                None => debug!(
                    class_id = %bean.class_id(),
                    field = field.name,
                    requested = field.requested_type_name,
                    "No compatible bean found - leaving field empty."
                ),
            }
        }
    }

    Ok(())
}

/// Finds the first bean assignable to given type and returns it as a
/// `Box<ComponentInstancePtr<T>>`. When `proxies` are given and the bean is proxied, a proxy view
/// is returned instead.
pub(crate) fn resolve(
    beans: &BeanRegistry,
    proxies: Option<&ProxyRegistry>,
    type_id: TypeId,
    type_name: &'static str,
) -> Result<Option<Box<dyn Any>>, InjectionError> {
    let (bean, capability) = match beans.first_assignable(type_id) {
        Some(found) => found,
        None => return Ok(None),
    };

    let incompatible = |_| InjectionError::IncompatibleComponent {
        class_id: bean.class_id().to_string(),
        requested: type_name,
    };

    if let Some(proxy) = proxies.and_then(|proxies| proxies.get(bean.class_id())) {
        return match proxy.view(capability) {
            Some(view) => view.map(Some).map_err(incompatible),
            None => Err(InjectionError::ProxyNotAssignable {
                class_id: bean.class_id().to_string(),
                requested: type_name,
            }),
        };
    }

    (capability.cast)(bean.instance().clone())
        .map(Some)
        .map_err(incompatible)
}
