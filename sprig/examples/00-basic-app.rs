use sprig::application;
use sprig::runner::{CommandLineRunner, ErrorPtr};
use sprig_di::autowired::Autowired;
use sprig_di::{component_alias, injectable, Component};

#[injectable]
trait MessageSource {
    fn message(&self) -> String;
}

#[derive(Component)]
struct StaticMessageSource;

#[component_alias]
impl MessageSource for StaticMessageSource {
    fn message(&self) -> String {
        "Hello world!".to_string()
    }
}

// this is the root application type; being a runner, it gets run once all components are wired
#[derive(Component)]
struct HelloWorldApp {
    #[component(autowired)]
    source: Autowired<dyn MessageSource + Send + Sync>,
}

#[component_alias]
impl CommandLineRunner for HelloWorldApp {
    fn run(&self) -> Result<(), ErrorPtr> {
        if let Some(source) = self.source.get() {
            println!("{}", source.message());
        }

        Ok(())
    }
}

// note: for the sake of simplicity, errors are unwrapped, rather than gracefully handled
fn main() {
    let args: Vec<String> = std::env::args().collect();

    // prints "Hello world!"
    application::run::<HelloWorldApp>(&args).expect("error running application");
}
