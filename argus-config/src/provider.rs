//! Configuration providers for loading Argus configuration from various sources.

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use tracing::debug;

use crate::{ArgusConfig, ConfigError};

/// Environment variable prefix for overrides (`ARGUS_MONITORING__BURST_THRESHOLD=10`).
pub const ENV_PREFIX: &str = "ARGUS_";

/// Trait for loading Argus configuration from different sources.
pub trait ConfigProvider {
    /// Loads the configuration and returns a Figment instance.
    fn load(&self) -> Result<Figment, ConfigError>;
}

/// Defaults, then `<dir>/argus.yaml`, then `<dir>/<ARGUS_ENV>.yaml`, then `ARGUS_*` variables.
#[derive(Debug, Clone)]
pub struct LayeredProvider {
    pub config_dir: PathBuf,
}

impl Default for LayeredProvider {
    fn default() -> Self {
        Self {
            config_dir: PathBuf::from("config"),
        }
    }
}

impl ConfigProvider for LayeredProvider {
    fn load(&self) -> Result<Figment, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(ArgusConfig::default()));

        let base = self.config_dir.join("argus.yaml");
        if base.exists() {
            figment = figment.merge(Yaml::file(&base));
        } else {
            debug!("{} not found, using default configuration", base.display());
        }

        let env = std::env::var("ARGUS_ENV").unwrap_or_else(|_| "production".into());
        let env_file = self.config_dir.join(format!("{env}.yaml"));
        if env_file.exists() {
            figment = figment.merge(Yaml::file(env_file));
        }

        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }
}

/// A single YAML file on top of defaults, plus `ARGUS_*` variables.
#[derive(Debug, Clone)]
pub struct FileProvider {
    pub path: PathBuf,
}

impl FileProvider {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl ConfigProvider for FileProvider {
    fn load(&self) -> Result<Figment, ConfigError> {
        if !self.path.exists() {
            return Err(ConfigError::FileNotFound(self.path.clone()));
        }

        Ok(Figment::from(Serialized::defaults(ArgusConfig::default()))
            .merge(Yaml::file(&self.path))
            .merge(Env::prefixed(ENV_PREFIX).split("__")))
    }
}
