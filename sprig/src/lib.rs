//! Application framework based on [sprig_di] dependency injection.
//!
//! With dependency injection in place, application components become decoupled and form a
//! dependency graph managed by the container. This, in turn, requires an entrypoint which wires
//! the container and runs the actual business logic of the application. This crate provides such
//! entrypoint in the form of [Application](application::Application), which also configures
//! additional supporting infrastructure, e.g. logging.
//!
//! ```no_run
//! use sprig::runner::{CommandLineRunner, ErrorPtr};
//! use sprig_di::{component_alias, Component};
//!
//! #[derive(Component)]
//! struct App;
//!
//! #[component_alias]
//! impl CommandLineRunner for App {
//!     fn run(&self) -> Result<(), ErrorPtr> {
//!         println!("Hello world!");
//!         Ok(())
//!     }
//! }
//!
//! let args: Vec<String> = std::env::args().collect();
//! sprig::application::run::<App>(&args).unwrap();
//! ```

pub mod application;
pub mod config;
pub mod runner;
