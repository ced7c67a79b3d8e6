//! Runners executing actual application logic.

#[cfg(test)]
use mockall::automock;
use sprig_di::injectable;
pub use sprig_di::instance_provider::ErrorPtr;

pub type CommandLineRunnerPtr = dyn CommandLineRunner + Send + Sync;

/// Runs application logic. If the root application type is registered as a component with this
/// capability, the [Application](crate::application::Application) runs it exactly once, after
/// all dependencies are injected.
#[injectable]
#[cfg_attr(test, automock)]
pub trait CommandLineRunner {
    /// Runs any application code.
    fn run(&self) -> Result<(), ErrorPtr>;
}
