#[cfg(feature = "derive")]
mod discovery_test {
    use sprig_di::catalog::{ClassCatalog, ClassUniverse};
    use sprig_di::class::{ClassMarker, MethodMarker};
    use sprig_di::container::Container;
    use sprig_di::proxy::Invocation;
    use sprig_di::{aspect, component_alias, injectable, Component};
    use std::any::TypeId;

    #[injectable]
    trait Greeter {
        fn greet(&self) -> String;
    }

    #[derive(Component)]
    #[component(class = "svc.Greeter")]
    struct GreeterImpl;

    #[component_alias]
    impl Greeter for GreeterImpl {
        fn greet(&self) -> String {
            "hi".to_string()
        }
    }

    #[derive(Component)]
    #[component(class = "aop.LogAspect")]
    struct LogAspect;

    #[aspect]
    impl LogAspect {
        #[before("svc.Greeter.greet")]
        fn log_before(&self, _invocation: &Invocation) {}

        #[after("svc.Greeter.greet")]
        fn log_after(&self, _invocation: &Invocation) {}
    }

    #[derive(Component)]
    #[component(class = "app.Plain")]
    struct Plain;

    // not a component, so its advice is never collected
    struct NotAComponent;

    #[aspect]
    impl NotAComponent {
        #[before("svc.Greeter.greet")]
        fn log(&self, _invocation: &Invocation) {}
    }

    #[test]
    fn should_order_classes_by_id() {
        let catalog = ClassCatalog::discover().unwrap();

        assert_eq!(
            catalog.class_ids(),
            vec!["aop.LogAspect", "app.Plain", "svc.Greeter"]
        );
        assert_eq!(
            catalog.class_id_of(TypeId::of::<GreeterImpl>()),
            Some("svc.Greeter".to_string())
        );
        assert!(catalog.class_id_of(TypeId::of::<NotAComponent>()).is_none());
    }

    #[test]
    fn should_attach_capabilities() {
        let catalog = ClassCatalog::discover().unwrap();
        let greeter = catalog.load("svc.Greeter").unwrap();

        assert!(greeter.is_assignable_to(TypeId::of::<GreeterImpl>()));
        assert!(greeter.is_assignable_to(TypeId::of::<dyn Greeter + Send + Sync>()));
        assert!(greeter.declares_method("greet"));
        assert!(!greeter.has_marker(ClassMarker::Aspect));

        let plain = catalog.load("app.Plain").unwrap();
        assert!(!plain.is_assignable_to(TypeId::of::<dyn Greeter + Send + Sync>()));
    }

    #[test]
    fn should_attach_aspect_methods_in_declaration_order() {
        let catalog = ClassCatalog::discover().unwrap();
        let aspect = catalog.load("aop.LogAspect").unwrap();

        assert_eq!(
            aspect.markers,
            vec![ClassMarker::Component, ClassMarker::Aspect]
        );
        assert_eq!(
            aspect
                .methods
                .iter()
                .map(|method| method.name())
                .collect::<Vec<_>>(),
            vec!["log_before", "log_after"]
        );
        assert_eq!(
            aspect.methods[0].markers,
            vec![MethodMarker::Before("svc.Greeter.greet".to_string())]
        );
        assert_eq!(
            aspect.methods[1].markers,
            vec![MethodMarker::After("svc.Greeter.greet".to_string())]
        );
    }

    #[test]
    fn should_skip_aspects_which_are_not_components() {
        let discovered = ClassCatalog::discover().unwrap();
        let selected = ClassCatalog::select([
            TypeId::of::<GreeterImpl>(),
            TypeId::of::<LogAspect>(),
            TypeId::of::<Plain>(),
        ])
        .unwrap();

        assert_eq!(discovered.class_ids(), selected.class_ids());

        let container = Container::bootstrap(&discovered).unwrap();
        assert_eq!(container.beans().len(), 3);
        assert_eq!(container.proxies().len(), 1);
        assert_eq!(
            container
                .proxies()
                .get("svc.Greeter")
                .unwrap()
                .interceptor()
                .aspect_class_id(),
            "aop.LogAspect"
        );
    }
}
