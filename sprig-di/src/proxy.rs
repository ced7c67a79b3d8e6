//! Call interception for advised components.
//!
//! When an aspect advises a component, the container builds a single [Interceptor] for it. Every
//! `dyn Trait` the component is injected as is then wrapped in a [Proxy], which forwards calls to
//! the original instance and runs the advice around calls whose method name matches the advised
//! one. Proxy implementations of injectable traits are generated by the `#[injectable]`
//! attribute:
//!
//! ```
//! use sprig_di::injectable;
//!
//! #[injectable]
//! trait Greeter {
//!     fn greet(&self, name: &str) -> String;
//! }
//! ```
//!
//! The above generates, roughly:
//!
//! ```ignore
//! impl Greeter for Proxy<dyn Greeter + Send + Sync> {
//!     fn greet(&self, name: &str) -> String {
//!         let invocation = self.invocation("greet", || vec![format!("{:?}", name)]);
//!         self.interceptor().before(&invocation);
//!         let result = self.target().greet(name);
//!         self.interceptor().after(&invocation);
//!         result
//!     }
//! }
//! ```

use crate::component::Injectable;
use crate::instance_provider::{ComponentInstanceAnyPtr, ComponentInstancePtr};
use derivative::Derivative;
use std::any::{type_name, Any};
use tracing::trace;

/// Describes the method being invoked through a proxy.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct InvokedMethod {
    /// Name of the capability (trait object type) the call was made through.
    pub capability: &'static str,
    pub name: &'static str,
}

/// A single intercepted call, as seen by advice.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Invocation {
    method: InvokedMethod,
    arguments: Vec<String>,
}

impl Invocation {
    pub fn new(method: InvokedMethod, arguments: Vec<String>) -> Self {
        Self { method, arguments }
    }

    #[inline]
    pub fn method(&self) -> &InvokedMethod {
        &self.method
    }

    /// Call arguments rendered with their `Debug` implementation. Only rendered when the method
    /// is advised - empty otherwise.
    #[inline]
    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }
}

/// Type-erased advice method: calls the advice on the given aspect instance.
pub type AdviceFunction = fn(aspect: &(dyn Any + Send + Sync), invocation: &Invocation);

/// Handle to a single advice method of an aspect.
#[derive(Derivative, Copy, Clone)]
#[derivative(Debug)]
pub struct AdviceHandle {
    pub method_name: &'static str,
    #[derivative(Debug = "ignore")]
    pub invoke: AdviceFunction,
}

/// Dispatch table shared by all proxy views of one advised component: the aspect instance, the
/// advised method name and the advice to run before and after it.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct Interceptor {
    aspect_class_id: String,
    #[derivative(Debug = "ignore")]
    aspect: ComponentInstanceAnyPtr,
    target_method: String,
    before: Option<AdviceHandle>,
    after: Option<AdviceHandle>,
}

pub type InterceptorPtr = ComponentInstancePtr<Interceptor>;

impl Interceptor {
    pub fn new(
        aspect_class_id: String,
        aspect: ComponentInstanceAnyPtr,
        target_method: String,
        before: Option<AdviceHandle>,
        after: Option<AdviceHandle>,
    ) -> Self {
        Self {
            aspect_class_id,
            aspect,
            target_method,
            before,
            after,
        }
    }

    #[inline]
    pub fn aspect_class_id(&self) -> &str {
        &self.aspect_class_id
    }

    #[inline]
    pub fn target_method(&self) -> &str {
        &self.target_method
    }

    /// Checks if any advice runs for a method with given name. Methods are matched by name only.
    #[inline]
    pub fn advises(&self, method: &str) -> bool {
        method == self.target_method && (self.before.is_some() || self.after.is_some())
    }

    /// Runs the before advice, if the invoked method is the advised one.
    pub fn before(&self, invocation: &Invocation) {
        self.invoke(self.before.as_ref(), invocation);
    }

    /// Runs the after advice, if the invoked method is the advised one.
    pub fn after(&self, invocation: &Invocation) {
        self.invoke(self.after.as_ref(), invocation);
    }

    fn invoke(&self, advice: Option<&AdviceHandle>, invocation: &Invocation) {
        if invocation.method.name != self.target_method {
            return;
        }

        if let Some(advice) = advice {
            trace!(
                aspect = %self.aspect_class_id,
                advice = advice.method_name,
                method = invocation.method.name,
                "Invoking advice."
            );
            (advice.invoke)(self.aspect.as_ref(), invocation);
        }
    }
}

/// Capability (a `dyn Trait`) which can be proxied. Implemented by `#[injectable]`.
pub trait Capability: Injectable {
    /// Names of all methods declared by the trait.
    const METHODS: &'static [&'static str];
}

/// Call-intercepting stand-in for a component, viewed as capability `T`.
pub struct Proxy<T: ?Sized> {
    target: ComponentInstancePtr<T>,
    interceptor: InterceptorPtr,
}

impl<T: ?Sized> Proxy<T> {
    pub fn new(target: ComponentInstancePtr<T>, interceptor: InterceptorPtr) -> Self {
        Self {
            target,
            interceptor,
        }
    }

    /// The original instance calls are forwarded to.
    #[inline]
    pub fn target(&self) -> &T {
        &self.target
    }

    #[inline]
    pub fn interceptor(&self) -> &Interceptor {
        &self.interceptor
    }

    /// Creates an [Invocation] for a call of given method. Arguments are only rendered when the
    /// method is advised.
    pub fn invocation<F: FnOnce() -> Vec<String>>(
        &self,
        method: &'static str,
        arguments: F,
    ) -> Invocation {
        let arguments = if self.interceptor.advises(method) {
            arguments()
        } else {
            Vec::new()
        };

        Invocation {
            method: InvokedMethod {
                capability: type_name::<T>(),
                name: method,
            },
            arguments,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::instance_provider::{ComponentInstanceAnyPtr, ComponentInstancePtr};
    use crate::proxy::{AdviceHandle, Interceptor, Invocation, InvokedMethod, Proxy};
    use std::any::Any;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingAspect {
        calls: Mutex<Vec<String>>,
    }

    impl RecordingAspect {
        fn record(&self, prefix: &str, invocation: &Invocation) {
            self.calls.lock().unwrap().push(format!(
                "{prefix}:{}:{}",
                invocation.method().name,
                invocation.arguments().join(",")
            ));
        }
    }

    fn before(aspect: &(dyn Any + Send + Sync), invocation: &Invocation) {
        if let Some(aspect) = aspect.downcast_ref::<RecordingAspect>() {
            aspect.record("before", invocation);
        }
    }

    fn after(aspect: &(dyn Any + Send + Sync), invocation: &Invocation) {
        if let Some(aspect) = aspect.downcast_ref::<RecordingAspect>() {
            aspect.record("after", invocation);
        }
    }

    trait Counter: Send + Sync {
        fn add(&self, value: u32) -> u32;
        fn reset(&self) -> u32;
    }

    struct FixedCounter;

    impl Counter for FixedCounter {
        fn add(&self, value: u32) -> u32 {
            value + 1
        }

        fn reset(&self) -> u32 {
            0
        }
    }

    impl Counter for Proxy<dyn Counter> {
        fn add(&self, value: u32) -> u32 {
            let invocation = self.invocation("add", || vec![format!("{:?}", value)]);
            self.interceptor().before(&invocation);
            let result = self.target().add(value);
            self.interceptor().after(&invocation);
            result
        }

        fn reset(&self) -> u32 {
            let invocation = self.invocation("reset", Vec::new);
            self.interceptor().before(&invocation);
            let result = self.target().reset();
            self.interceptor().after(&invocation);
            result
        }
    }

    fn create_proxy(
        aspect: ComponentInstancePtr<RecordingAspect>,
        with_before: bool,
        with_after: bool,
    ) -> Proxy<dyn Counter> {
        let interceptor = Interceptor::new(
            "test.RecordingAspect".to_string(),
            aspect as ComponentInstanceAnyPtr,
            "add".to_string(),
            with_before.then_some(AdviceHandle {
                method_name: "before",
                invoke: before,
            }),
            with_after.then_some(AdviceHandle {
                method_name: "after",
                invoke: after,
            }),
        );

        Proxy::new(
            ComponentInstancePtr::new(FixedCounter) as ComponentInstancePtr<dyn Counter>,
            ComponentInstancePtr::new(interceptor),
        )
    }

    #[test]
    fn should_run_advice_around_advised_method() {
        let aspect = ComponentInstancePtr::new(RecordingAspect::default());
        let proxy = create_proxy(aspect.clone(), true, true);

        assert_eq!(proxy.add(1), 2);
        assert_eq!(
            *aspect.calls.lock().unwrap(),
            vec!["before:add:1".to_string(), "after:add:1".to_string()]
        );
    }

    #[test]
    fn should_not_run_advice_for_other_methods() {
        let aspect = ComponentInstancePtr::new(RecordingAspect::default());
        let proxy = create_proxy(aspect.clone(), true, true);

        assert_eq!(proxy.reset(), 0);
        assert!(aspect.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn should_run_only_present_advice() {
        let aspect = ComponentInstancePtr::new(RecordingAspect::default());
        let proxy = create_proxy(aspect.clone(), true, false);

        assert_eq!(proxy.add(5), 6);
        assert_eq!(*aspect.calls.lock().unwrap(), vec!["before:add:5".to_string()]);
    }

    #[test]
    fn should_not_render_arguments_of_unadvised_methods() {
        let aspect = ComponentInstancePtr::new(RecordingAspect::default());
        let proxy = create_proxy(aspect, false, false);

        let invocation = proxy.invocation("add", || vec!["rendered".to_string()]);
        assert!(invocation.arguments().is_empty());
        assert_eq!(
            *invocation.method(),
            InvokedMethod {
                capability: std::any::type_name::<dyn Counter>(),
                name: "add",
            }
        );
    }
}
