//! Configuration loading for the envsync CLI

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use config::{ConfigBuilder, Environment, File};
use envsync_core::registry::{DEFAULT_STORE_PATH, DEFAULT_TEMPLATE_PATH};
use envsync_core::RegistryOptions;
use serde::Deserialize;

/// Name of the CLI's own configuration file
pub const CONFIG_FILE_NAME: &str = "envsync.toml";

/// Configuration for the CLI
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub paths: PathsConfig,
    pub logging: LoggingConfig,
    pub registry: RegistryConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub template: PathBuf,
    pub store: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            template: PathBuf::from(DEFAULT_TEMPLATE_PATH),
            store: PathBuf::from(DEFAULT_STORE_PATH),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Exported environment variables win over store entries
    pub env_override: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self { env_override: true }
    }
}

impl Config {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self> {
        let config_path = Self::find_config_file();
        Self::load_from(config_path.as_deref())
    }

    /// Load with an explicit (optional) config file, then `ENVSYNC__*` variables
    pub fn load_from(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = ConfigBuilder::<config::builder::DefaultState>::default();

        if let Some(path) = config_path {
            tracing::debug!("Loading config from: {:?}", path);
            builder = builder.add_source(File::from(path.to_path_buf()).required(false));
        } else {
            tracing::debug!("No config file found, using defaults");
        }

        // ENVSYNC__PATHS__STORE=... etc.
        builder = builder.add_source(
            Environment::with_prefix("ENVSYNC")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Find the configuration file
    pub fn find_config_file() -> Option<PathBuf> {
        // Check in order: ENVSYNC_CONFIG env, ./envsync.toml, <config dir>/envsync/envsync.toml
        if let Ok(path) = std::env::var("ENVSYNC_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        let local = PathBuf::from(CONFIG_FILE_NAME);
        if local.exists() {
            return Some(local);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("envsync").join(CONFIG_FILE_NAME);
            if user_config.exists() {
                return Some(user_config);
            }
        }

        None
    }

    pub fn registry_options(&self) -> RegistryOptions {
        RegistryOptions {
            template_path: self.paths.template.clone(),
            store_path: self.paths.store.clone(),
            env_override: self.registry.env_override,
        }
    }
}

/// Contents written by `envsync config init`
pub const DEFAULT_CONFIG_TOML: &str = r#"[paths]
template = ".env.template"
store = ".env"

[logging]
level = "info"

[registry]
env_override = true
"#;
