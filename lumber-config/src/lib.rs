//! # Lumber Configuration
//!
//! Hierarchical configuration for the lumber logger registry.
//!
//! The only tree consumed here is `logging`, split into three sections
//! (`formatters`, `handlers`, `loggers`). Each section holds a `default`
//! entry and any number of named overrides; see [`Section`].

#![warn(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

mod entries;
mod error;
mod section;

pub use entries::{FormatterConfig, HandlerConfig, LoggerConfig, DEFAULT_MAX_BYTES};
pub use error::ConfigError;
pub use section::{Section, DEFAULT_ENTRY};

/// Built-in defaults, always the lowest layer.
pub const DEFAULTS_YAML: &str = include_str!("../defaults.yaml");

const ENV_PREFIX: &str = "LUMBER_";
const BASE_FILE: &str = "config/lumber.yaml";

/// Top-level configuration document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct Settings {
    #[validate(nested)]
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// The `logging` tree.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct LoggingSettings {
    #[validate(custom(function = section::validate_has_default))]
    #[serde(default)]
    pub formatters: Section,

    #[validate(custom(function = section::validate_has_default))]
    #[serde(default)]
    pub handlers: Section,

    #[validate(custom(function = section::validate_has_default))]
    #[serde(default)]
    pub loggers: Section,
}

impl LoggingSettings {
    pub fn formatter(&self, name: &str) -> Result<FormatterConfig, ConfigError> {
        self.formatters.entry("formatters", name)
    }

    pub fn handler(&self, name: &str) -> Result<HandlerConfig, ConfigError> {
        self.handlers.entry("handlers", name)
    }

    pub fn logger(&self, name: &str) -> Result<LoggerConfig, ConfigError> {
        self.loggers.entry("loggers", name)
    }
}

impl Settings {
    /// Load configuration from default files and environment.
    ///
    /// Hierarchy:
    /// 1. Built-in defaults ([`DEFAULTS_YAML`])
    /// 2. `config/lumber.yaml`, if present
    /// 3. `config/<LUMBER_ENV>.yaml`, if present (`LUMBER_ENV` defaults to `production`)
    /// 4. `LUMBER_*` environment variables, nested with `__`
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Self::defaults();

        if Path::new(BASE_FILE).exists() {
            figment = figment.merge(Yaml::file(BASE_FILE));
        }

        let env = std::env::var("LUMBER_ENV").unwrap_or_else(|_| "production".into());
        let env_file = format!("config/{}.yaml", env);
        if Path::new(&env_file).exists() {
            figment = figment.merge(Yaml::file(env_file));
        }

        Self::finish(figment.merge(Self::env()))
    }

    /// Load configuration from a specific file layered over the defaults.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(PathBuf::from(path)));
        }

        Self::finish(Self::defaults().merge(Yaml::file(path)).merge(Self::env()))
    }

    /// Parse a YAML document layered over the defaults, ignoring the environment.
    pub fn from_yaml_str(document: &str) -> Result<Self, ConfigError> {
        Self::finish(Self::defaults().merge(Yaml::string(document)))
    }

    /// Built-in defaults only.
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::finish(Self::defaults())
    }

    fn defaults() -> Figment {
        Figment::from(Yaml::string(DEFAULTS_YAML))
    }

    fn env() -> Env {
        Env::prefixed(ENV_PREFIX)
            .ignore(&["ENV"])
            .split("__")
    }

    fn finish(figment: Figment) -> Result<Self, ConfigError> {
        let settings: Self = figment.extract()?;
        settings.validate()?;
        Ok(settings)
    }
}
