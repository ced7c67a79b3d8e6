use sprig_di::autowired::Autowired;
use sprig_di::catalog::ClassCatalog;
use sprig_di::container::Container;
use sprig_di::instance_provider::TypedComponentInstanceProvider;
use sprig_di::proxy::Invocation;
use sprig_di::{aspect, component_alias, injectable, Component};

// a capability other components can depend on; #[injectable] also generates a proxy for it, so
// calls can be intercepted by aspects
#[injectable]
trait Greeter {
    fn greet(&self, name: &str) -> String;
}

// the class identifier is used by aspects to find their target
#[derive(Component)]
#[component(class = "svc.Greeter")]
struct PoliteGreeter;

#[component_alias]
impl Greeter for PoliteGreeter {
    fn greet(&self, name: &str) -> String {
        format!("Hello, {name}!")
    }
}

// aspects are components too
#[derive(Component)]
struct LogAspect;

#[aspect]
impl LogAspect {
    #[before("svc.Greeter.greet")]
    fn before_greet(&self, invocation: &Invocation) {
        println!(
            "About to call {} with {:?}",
            invocation.method().name,
            invocation.arguments()
        );
    }

    #[after("svc.Greeter.greet")]
    fn after_greet(&self, invocation: &Invocation) {
        println!("Finished {}", invocation.method().name);
    }
}

#[derive(Component)]
struct Reception {
    // receives the proxy, since PoliteGreeter is advised
    #[component(autowired)]
    greeter: Autowired<dyn Greeter + Send + Sync>,
}

// note: for the sake of simplicity, errors are unwrapped, rather than gracefully handled
fn main() {
    let catalog = ClassCatalog::discover().expect("error discovering classes");
    let container = Container::bootstrap(&catalog).expect("error bootstrapping container");

    let reception = container
        .instance_typed::<Reception>()
        .expect("error retrieving Reception")
        .expect("missing Reception");

    // prints:
    // About to call greet with ["\"visitor\""]
    // Finished greet
    // Hello, visitor!
    println!("{}", reception.greeter.get().expect("greeter not wired").greet("visitor"));
}
