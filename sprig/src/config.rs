//! Framework configuration. Only tunes the runtime - the component graph itself is never read
//! from configuration.
//!
//! By default, the config is created with opinionated default values, which can then be overwritten
//! by environment variables prefixed with `SPRIG_` or a `sprig.json` file.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use sprig_di::weaver::WeaverConfig;

const CONFIG_ENV_PREFIX: &str = "SPRIG";

/// Name of the default config file.
pub const CONFIG_FILE: &str = "sprig.json";

/// Framework configuration used by [Application](crate::application::Application).
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApplicationConfig {
    /// Should a default tracing logger be installed in the scope of the application.
    pub install_tracing_logger: bool,
    /// Should later advice methods of an aspect replace earlier ones of the same kind, instead of
    /// failing the application.
    pub allow_advice_overriding: bool,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            install_tracing_logger: true,
            allow_advice_overriding: false,
        }
    }
}

impl From<OptionalApplicationConfig> for ApplicationConfig {
    fn from(value: OptionalApplicationConfig) -> Self {
        let default = Self::default();
        Self {
            install_tracing_logger: value
                .install_tracing_logger
                .unwrap_or(default.install_tracing_logger),
            allow_advice_overriding: value
                .allow_advice_overriding
                .unwrap_or(default.allow_advice_overriding),
        }
    }
}

impl ApplicationConfig {
    /// Loads the config from the optional config file and the environment.
    pub fn init_from_environment() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(Environment::with_prefix(CONFIG_ENV_PREFIX))
            .build()
            .and_then(|config| config.try_deserialize::<OptionalApplicationConfig>())
            .map(|config| config.into())
    }

    pub fn with_install_tracing_logger(mut self, install_tracing_logger: bool) -> Self {
        self.install_tracing_logger = install_tracing_logger;
        self
    }

    pub fn with_allow_advice_overriding(mut self, allow_advice_overriding: bool) -> Self {
        self.allow_advice_overriding = allow_advice_overriding;
        self
    }

    #[inline]
    pub fn weaver_config(&self) -> WeaverConfig {
        WeaverConfig {
            allow_advice_overriding: self.allow_advice_overriding,
        }
    }
}

#[derive(Deserialize)]
struct OptionalApplicationConfig {
    install_tracing_logger: Option<bool>,
    allow_advice_overriding: Option<bool>,
}

#[cfg(test)]
mod tests {
    use crate::config::{ApplicationConfig, OptionalApplicationConfig};

    #[test]
    fn should_fall_back_to_defaults() {
        let config: ApplicationConfig = OptionalApplicationConfig {
            install_tracing_logger: None,
            allow_advice_overriding: None,
        }
        .into();

        assert_eq!(config, ApplicationConfig::default());
        assert!(config.install_tracing_logger);
        assert!(!config.weaver_config().allow_advice_overriding);
    }

    #[test]
    fn should_override_defaults() {
        let config: ApplicationConfig = OptionalApplicationConfig {
            install_tracing_logger: Some(false),
            allow_advice_overriding: Some(true),
        }
        .into();

        assert!(!config.install_tracing_logger);
        assert!(config.weaver_config().allow_advice_overriding);
    }
}
