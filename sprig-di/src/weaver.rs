//! Aspect weaving phase: collects advice declared by aspect components and builds a proxy for
//! every advised component.
//!
//! Weaving happens in two passes. First, each aspect bean's methods are examined in declaration
//! order and folded into a single [AspectBinding] per aspect class. Only after all aspects are
//! collected, a fresh instance of each aspect is created and a [ProxyBean] for the advised
//! component is registered under the advised class identifier.

use crate::catalog::ClassUniverse;
use crate::class::{AdviceKind, ClassMarker, ConstructorFunction};
use crate::error::WeavingError;
use crate::instance_provider::ComponentInstancePtr;
use crate::proxy::{AdviceHandle, Interceptor};
use crate::registry::{BeanRegistry, ProxyBean, ProxyRegistry};
use derivative::Derivative;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Weaving configuration.
#[derive(Copy, Clone, Eq, PartialEq, Default, Debug)]
pub struct WeaverConfig {
    /// If `true`, a later advice method of the same kind on one aspect replaces the earlier one.
    /// Otherwise, such duplicates are rejected.
    pub allow_advice_overriding: bool,
}

#[derive(Error, Clone, Eq, PartialEq, Debug)]
#[error("Invalid target specification: '{0}'")]
pub struct InvalidTargetSpec(pub String);

/// Target of advice - `<class>.<method>` split on the last separator.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct TargetSpec {
    class_id: String,
    method: String,
}

impl TargetSpec {
    #[inline]
    pub fn class_id(&self) -> &str {
        &self.class_id
    }

    #[inline]
    pub fn method(&self) -> &str {
        &self.method
    }
}

impl FromStr for TargetSpec {
    type Err = InvalidTargetSpec;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.rsplit_once('.') {
            Some((class_id, method)) if !class_id.is_empty() && !method.is_empty() => Ok(Self {
                class_id: class_id.to_string(),
                method: method.to_string(),
            }),
            _ => Err(InvalidTargetSpec(s.to_string())),
        }
    }
}

impl Display for TargetSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.class_id, self.method)
    }
}

/// How much advice has been bound for an aspect so far.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum BindingState {
    PartiallyBound(AdviceKind),
    FullyBound,
}

/// Advice collected from a single aspect class.
#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub struct AspectBinding {
    pub aspect_class_id: String,
    #[derivative(Debug = "ignore")]
    pub aspect_constructor: ConstructorFunction,
    pub target: TargetSpec,
    pub before: Option<AdviceHandle>,
    pub after: Option<AdviceHandle>,
}

impl AspectBinding {
    fn new(
        aspect_class_id: String,
        aspect_constructor: ConstructorFunction,
        target: TargetSpec,
    ) -> Self {
        Self {
            aspect_class_id,
            aspect_constructor,
            target,
            before: None,
            after: None,
        }
    }

    pub fn state(&self) -> BindingState {
        match (&self.before, &self.after) {
            (Some(_), Some(_)) => BindingState::FullyBound,
            (None, Some(_)) => BindingState::PartiallyBound(AdviceKind::After),
            _ => BindingState::PartiallyBound(AdviceKind::Before),
        }
    }

    fn bind(
        &mut self,
        kind: AdviceKind,
        handle: AdviceHandle,
        config: &WeaverConfig,
    ) -> Result<(), WeavingError> {
        let slot = match kind {
            AdviceKind::Before => &mut self.before,
            AdviceKind::After => &mut self.after,
        };

        if let Some(previous) = slot {
            if !config.allow_advice_overriding {
                return Err(WeavingError::DuplicateAdvice {
                    aspect: self.aspect_class_id.clone(),
                    kind,
                    first: previous.method_name,
                    second: handle.method_name,
                });
            }

            debug!(
                aspect = %self.aspect_class_id,
                previous = previous.method_name,
                current = handle.method_name,
                "Overriding {} advice.",
                kind
            );
        }

        *slot = Some(handle);
        Ok(())
    }
}

/// Runs both weaving passes over the given beans.
pub fn weave(
    universe: &dyn ClassUniverse,
    beans: &BeanRegistry,
    config: &WeaverConfig,
) -> Result<ProxyRegistry, WeavingError> {
    info!("Weaving aspects...");

    let bindings = collect_bindings(beans, config)?;
    build_proxies(universe, beans, bindings)
}

/// First pass: folds advice methods of every aspect bean into bindings, in bean order.
/// Before and after advice of one aspect naming different targets is rejected.
pub fn collect_bindings(
    beans: &BeanRegistry,
    config: &WeaverConfig,
) -> Result<Vec<AspectBinding>, WeavingError> {
    let mut bindings = vec![];

    for bean in beans
        .iter()
        .filter(|bean| bean.descriptor().has_marker(ClassMarker::Aspect))
    {
        let aspect_class_id = bean.class_id();
        let mut binding: Option<AspectBinding> = None;

        for method in &bean.descriptor().methods {
            for marker in &method.markers {
                let target = marker.target().parse::<TargetSpec>().map_err(|error| {
                    WeavingError::InvalidTargetSpecification {
                        aspect: aspect_class_id.to_string(),
                        specification: error.0,
                    }
                })?;

                let current = binding.get_or_insert_with(|| {
                    AspectBinding::new(
                        aspect_class_id.to_string(),
                        bean.descriptor().constructor,
                        target.clone(),
                    )
                });

                if current.target != target {
                    return Err(WeavingError::ConflictingAdviceTarget {
                        aspect: aspect_class_id.to_string(),
                        existing: current.target.to_string(),
                        conflicting: target.to_string(),
                    });
                }

                current.bind(marker.kind(), method.handle, config)?;
            }
        }

        if let Some(binding) = binding {
            debug!(
                aspect = %binding.aspect_class_id,
                target = %binding.target,
                state = ?binding.state(),
                "Collected aspect binding."
            );
            bindings.push(binding);
        }
    }

    Ok(bindings)
}

/// Second pass: creates a fresh aspect instance per binding and registers a proxy for the
/// advised bean.
pub fn build_proxies(
    universe: &dyn ClassUniverse,
    beans: &BeanRegistry,
    bindings: Vec<AspectBinding>,
) -> Result<ProxyRegistry, WeavingError> {
    let mut proxies = ProxyRegistry::default();

    for binding in bindings {
        let aspect =
            (binding.aspect_constructor)().map_err(|error| WeavingError::AspectInstantiation {
                aspect: binding.aspect_class_id.clone(),
                error,
            })?;

        let target_descriptor = universe.load(binding.target.class_id()).ok_or_else(|| {
            WeavingError::UnknownTargetClass {
                aspect: binding.aspect_class_id.clone(),
                target: binding.target.class_id().to_string(),
            }
        })?;

        let target = beans.get(&target_descriptor.class_id).ok_or_else(|| {
            WeavingError::MissingTargetBean {
                aspect: binding.aspect_class_id.clone(),
                target: target_descriptor.class_id.clone(),
            }
        })?;

        if !target_descriptor.declares_method(binding.target.method()) {
            warn!(
                aspect = %binding.aspect_class_id,
                target = %binding.target,
                "Advised method is not declared by any injectable trait of the target."
            );
        }

        let interceptor = Interceptor::new(
            binding.aspect_class_id,
            aspect,
            binding.target.method().to_string(),
            binding.before,
            binding.after,
        );

        debug!(target = %target_descriptor.class_id, "Registered proxy.");

        proxies.try_register(ProxyBean::new(
            target_descriptor.class_id.clone(),
            target.instance().clone(),
            ComponentInstancePtr::new(interceptor),
        ))?;
    }

    Ok(proxies)
}

#[cfg(test)]
mod tests {
    use crate::catalog::MockClassUniverse;
    use crate::class::{AdviceKind, ClassDescriptor, ClassMarker, MethodDescriptor, MethodMarker};
    use crate::error::WeavingError;
    use crate::instance_provider::{ComponentInstanceAnyPtr, ComponentInstancePtr, ErrorPtr};
    use crate::proxy::Invocation;
    use crate::registry::BeanRegistry;
    use crate::weaver::{collect_bindings, weave, BindingState, TargetSpec, WeaverConfig};
    use mockall::predicate::*;
    use std::any::{type_name, Any, TypeId};

    fn constructor() -> Result<ComponentInstanceAnyPtr, ErrorPtr> {
        Ok(ComponentInstancePtr::new(0_u8) as ComponentInstanceAnyPtr)
    }

    fn advice(_aspect: &(dyn Any + Send + Sync), _invocation: &Invocation) {}

    fn create_target(class_id: &str) -> ClassDescriptor {
        ClassDescriptor::new(class_id, TypeId::of::<u8>(), type_name::<u8>(), constructor)
            .with_marker(ClassMarker::Component)
    }

    fn create_aspect(
        class_id: &str,
        methods: Vec<(&'static str, MethodMarker)>,
    ) -> ClassDescriptor {
        methods.into_iter().fold(
            ClassDescriptor::new(class_id, TypeId::of::<u16>(), type_name::<u16>(), constructor)
                .with_marker(ClassMarker::Component)
                .with_marker(ClassMarker::Aspect),
            |descriptor, (name, marker)| {
                descriptor.with_method(MethodDescriptor::new(name, vec![marker], advice))
            },
        )
    }

    fn create_beans(descriptors: Vec<ClassDescriptor>) -> BeanRegistry {
        let mut beans = BeanRegistry::default();
        for descriptor in descriptors {
            beans.try_register(descriptor, constructor().unwrap()).unwrap();
        }
        beans
    }

    fn before(target: &str) -> MethodMarker {
        MethodMarker::Before(target.to_string())
    }

    fn after(target: &str) -> MethodMarker {
        MethodMarker::After(target.to_string())
    }

    #[test]
    fn should_parse_target_specs() {
        let spec: TargetSpec = "svc.Greeter.greet".parse().unwrap();
        assert_eq!(spec.class_id(), "svc.Greeter");
        assert_eq!(spec.method(), "greet");
        assert_eq!(spec.to_string(), "svc.Greeter.greet");

        assert!("greet".parse::<TargetSpec>().is_err());
        assert!(".greet".parse::<TargetSpec>().is_err());
        assert!("svc.Greeter.".parse::<TargetSpec>().is_err());
    }

    #[test]
    fn should_bind_before_and_after_advice() {
        let beans = create_beans(vec![
            create_target("svc.Greeter"),
            create_aspect(
                "svc.LogAspect",
                vec![
                    ("log_before", before("svc.Greeter.greet")),
                    ("log_after", after("svc.Greeter.greet")),
                ],
            ),
        ]);

        let bindings = collect_bindings(&beans, &WeaverConfig::default()).unwrap();

        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0].aspect_class_id, "svc.LogAspect");
        assert_eq!(bindings[0].target.class_id(), "svc.Greeter");
        assert_eq!(bindings[0].before.unwrap().method_name, "log_before");
        assert_eq!(bindings[0].after.unwrap().method_name, "log_after");
        assert_eq!(bindings[0].state(), BindingState::FullyBound);
    }

    #[test]
    fn should_report_partial_binding_state() {
        let beans = create_beans(vec![create_aspect(
            "svc.LogAspect",
            vec![("log_after", after("svc.Greeter.greet"))],
        )]);

        let bindings = collect_bindings(&beans, &WeaverConfig::default()).unwrap();
        assert_eq!(
            bindings[0].state(),
            BindingState::PartiallyBound(AdviceKind::After)
        );
    }

    #[test]
    fn should_ignore_beans_without_aspect_marker() {
        let target = create_target("svc.Greeter").with_method(MethodDescriptor::new(
            "log",
            vec![before("svc.Other.run")],
            advice,
        ));
        let beans = create_beans(vec![target]);

        assert!(collect_bindings(&beans, &WeaverConfig::default())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn should_reject_duplicate_advice_by_default() {
        let beans = create_beans(vec![create_aspect(
            "svc.LogAspect",
            vec![
                ("first", before("svc.Greeter.greet")),
                ("second", before("svc.Greeter.greet")),
            ],
        )]);

        assert!(matches!(
            collect_bindings(&beans, &WeaverConfig::default()).unwrap_err(),
            WeavingError::DuplicateAdvice {
                kind: AdviceKind::Before,
                first: "first",
                second: "second",
                ..
            }
        ));
    }

    #[test]
    fn should_override_duplicate_advice_when_allowed() {
        let beans = create_beans(vec![create_aspect(
            "svc.LogAspect",
            vec![
                ("first", after("svc.Greeter.greet")),
                ("second", after("svc.Greeter.greet")),
            ],
        )]);

        let bindings = collect_bindings(
            &beans,
            &WeaverConfig {
                allow_advice_overriding: true,
            },
        )
        .unwrap();

        assert_eq!(bindings[0].after.unwrap().method_name, "second");
        assert!(bindings[0].before.is_none());
    }

    #[test]
    fn should_reject_conflicting_targets() {
        let beans = create_beans(vec![create_aspect(
            "svc.LogAspect",
            vec![
                ("log_before", before("svc.Greeter.greet")),
                ("log_after", after("svc.Greeter.wave")),
            ],
        )]);

        assert!(matches!(
            collect_bindings(&beans, &WeaverConfig::default()).unwrap_err(),
            WeavingError::ConflictingAdviceTarget { existing, conflicting, .. }
                if existing == "svc.Greeter.greet" && conflicting == "svc.Greeter.wave"
        ));
    }

    #[test]
    fn should_reject_invalid_target_specification() {
        let beans = create_beans(vec![create_aspect(
            "svc.LogAspect",
            vec![("log_before", before("greet"))],
        )]);

        assert!(matches!(
            collect_bindings(&beans, &WeaverConfig::default()).unwrap_err(),
            WeavingError::InvalidTargetSpecification { specification, .. }
                if specification == "greet"
        ));
    }

    #[test]
    fn should_build_proxy_for_target() {
        let target = create_target("svc.Greeter");
        let beans = create_beans(vec![
            target.clone(),
            create_aspect(
                "svc.LogAspect",
                vec![("log_before", before("svc.Greeter.greet"))],
            ),
        ]);

        let mut universe = MockClassUniverse::new();
        universe
            .expect_load()
            .with(eq("svc.Greeter"))
            .times(1)
            .return_const(Some(target));

        let proxies = weave(&universe, &beans, &WeaverConfig::default()).unwrap();

        assert_eq!(proxies.len(), 1);
        let proxy = proxies.get("svc.Greeter").unwrap();
        assert_eq!(proxy.target_class_id(), "svc.Greeter");
        assert_eq!(proxy.interceptor().aspect_class_id(), "svc.LogAspect");
        assert_eq!(proxy.interceptor().target_method(), "greet");
        assert!(proxy.interceptor().advises("greet"));
        assert!(!proxy.interceptor().advises("wave"));
    }

    #[test]
    fn should_fail_on_unknown_target_class() {
        let beans = create_beans(vec![create_aspect(
            "svc.LogAspect",
            vec![("log_before", before("svc.Missing.greet"))],
        )]);

        let mut universe = MockClassUniverse::new();
        universe
            .expect_load()
            .with(eq("svc.Missing"))
            .return_const(None);

        assert!(matches!(
            weave(&universe, &beans, &WeaverConfig::default()).unwrap_err(),
            WeavingError::UnknownTargetClass { target, .. } if target == "svc.Missing"
        ));
    }

    #[test]
    fn should_fail_on_target_without_bean() {
        let beans = create_beans(vec![create_aspect(
            "svc.LogAspect",
            vec![("log_before", before("svc.Plain.greet"))],
        )]);

        let mut universe = MockClassUniverse::new();
        universe
            .expect_load()
            .with(eq("svc.Plain"))
            .return_const(Some(ClassDescriptor::new(
                "svc.Plain",
                TypeId::of::<u32>(),
                type_name::<u32>(),
                constructor,
            )));

        assert!(matches!(
            weave(&universe, &beans, &WeaverConfig::default()).unwrap_err(),
            WeavingError::MissingTargetBean { target, .. } if target == "svc.Plain"
        ));
    }

    #[test]
    fn should_reject_second_proxy_for_target() {
        let target = create_target("svc.Greeter");
        let beans = create_beans(vec![
            target.clone(),
            create_aspect(
                "svc.LogAspect",
                vec![("log_before", before("svc.Greeter.greet"))],
            ),
            ClassDescriptor::new(
                "svc.TimingAspect",
                TypeId::of::<u64>(),
                type_name::<u64>(),
                constructor,
            )
            .with_marker(ClassMarker::Component)
            .with_marker(ClassMarker::Aspect)
            .with_method(MethodDescriptor::new(
                "time",
                vec![after("svc.Greeter.greet")],
                advice,
            )),
        ]);

        let mut universe = MockClassUniverse::new();
        universe
            .expect_load()
            .with(eq("svc.Greeter"))
            .return_const(Some(target));

        assert!(matches!(
            weave(&universe, &beans, &WeaverConfig::default()).unwrap_err(),
            WeavingError::DuplicateProxy(target) if target == "svc.Greeter"
        ));
    }
}
