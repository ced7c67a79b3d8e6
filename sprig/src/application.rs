//! Core application framework functionality.

use crate::config::ApplicationConfig;
use crate::runner::CommandLineRunnerPtr;
use derive_more::Constructor;
use sprig_di::catalog::{ClassCatalog, ClassUniverse};
use sprig_di::container::{Container, ContainerBuilder};
use sprig_di::error::ContainerError;
use sprig_di::instance_provider::{ComponentInstancePtr, ErrorPtr};
use std::any::{type_name, TypeId};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

#[derive(Clone, Error, Debug)]
pub enum ApplicationError {
    #[error("Error loading configuration: {0}")]
    Configuration(ErrorPtr),
    #[error("Error wiring the container: {0}")]
    Container(#[from] ContainerError),
    #[error("Root application class {0} is a runner, but is not a registered component")]
    MissingRootBean(String),
    #[error("Root application class {0} cannot be cast to a runner")]
    IncompatibleRunner(String),
    #[error("Runner error: {0}")]
    RunnerError(ErrorPtr),
}

/// Main entrypoint for the application. Wires the container from the given
/// [ClassUniverse](ClassUniverse) and runs the root
/// [CommandLineRunner](crate::runner::CommandLineRunner), if there is one.
#[derive(Constructor)]
pub struct Application<CU: ClassUniverse> {
    universe: CU,
    config: ApplicationConfig,
}

impl Application<ClassCatalog> {
    /// Creates an application over all statically registered classes, with configuration loaded
    /// from the environment.
    pub fn create_default() -> Result<Self, ApplicationError> {
        let config = ApplicationConfig::init_from_environment()
            .map_err(|error| ApplicationError::Configuration(Arc::new(error) as ErrorPtr))?;

        let universe = ClassCatalog::discover().map_err(ContainerError::from)?;
        Ok(Self::new(universe, config))
    }
}

fn install_tracing_logger() {
    // a logger might have been installed already by the user or a previous run
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}

impl<CU: ClassUniverse> Application<CU> {
    #[inline]
    pub fn config(&self) -> &ApplicationConfig {
        &self.config
    }

    /// Wires the container and runs the root runner. The root type is the application type whose
    /// class is checked for the runner capability. Arguments are currently not interpreted.
    /// Returns the wired container on success. Installs a tracing logger first, if configured to
    /// do so.
    pub fn run<App: ?Sized + 'static>(
        &self,
        args: &[String],
    ) -> Result<Container, ApplicationError> {
        if self.config.install_tracing_logger {
            install_tracing_logger();
        }

        let result = self.try_run::<App>(args);
        if let Err(error) = &result {
            error!(%error, root = type_name::<App>(), "Application failed.");
        }

        result
    }

    fn try_run<App: ?Sized + 'static>(
        &self,
        args: &[String],
    ) -> Result<Container, ApplicationError> {
        debug!(args = ?args, "Starting application.");

        let container = ContainerBuilder::new()
            .with_weaver_config(self.config.weaver_config())
            .bootstrap(&self.universe)?;

        let class_id = match self.universe.class_id_of(TypeId::of::<App>()) {
            Some(class_id) => class_id,
            None => {
                debug!(
                    root = type_name::<App>(),
                    "Root application type is not a known class - nothing to run."
                );
                return Ok(container);
            }
        };

        let runner_type = TypeId::of::<CommandLineRunnerPtr>();
        let is_runner = self
            .universe
            .load(&class_id)
            .map(|descriptor| descriptor.is_assignable_to(runner_type))
            .unwrap_or_default();

        if !is_runner {
            debug!(
                class_id = %class_id,
                "Root application class is not a runner - nothing to run."
            );
            return Ok(container);
        }

        let runner = {
            let bean = container
                .beans()
                .get(&class_id)
                .ok_or_else(|| ApplicationError::MissingRootBean(class_id.clone()))?;

            bean.descriptor()
                .capability(runner_type)
                .and_then(|capability| (capability.cast)(bean.instance().clone()).ok())
                .and_then(|runner| {
                    runner
                        .downcast::<ComponentInstancePtr<CommandLineRunnerPtr>>()
                        .ok()
                })
                .ok_or_else(|| ApplicationError::IncompatibleRunner(class_id.clone()))?
        };

        info!(class_id = %class_id, "Running application runner...");
        runner.run().map_err(ApplicationError::RunnerError)?;

        Ok(container)
    }
}

/// Creates a default [Application] and runs it with `App` as the root type.
pub fn run<App: ?Sized + 'static>(args: &[String]) -> Result<Container, ApplicationError> {
    Application::create_default()?.run::<App>(args)
}
