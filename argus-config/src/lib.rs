//! # Argus Configuration System
//!
//! Hierarchical configuration management for the Argus burst tripwire.
//!
//! ## Features
//! - **Unified Configuration**: Single source of truth across all components
//! - **Validation**: Boundary validation of addresses, topics and thresholds
//! - **Environment Awareness**: Per-environment YAML overrides and `ARGUS_*` variables

#![warn(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::path::Path;

use serde::{Deserialize, Serialize};
use validator::Validate;

mod alerts;
mod demo;
mod engine;
mod error;
mod monitoring;
pub mod provider;
pub mod validation;

pub use alerts::AlertConfig;
pub use demo::DemoConfig;
pub use engine::{EngineConfig, StreamConfig};
pub use error::{format_validation_errors, ConfigError};
pub use monitoring::{
    parse_window, warning_threshold_for, MonitoringConfig, MonitoringConfigPatch, RiskProfile,
    MIN_BURST_THRESHOLD,
};
pub use provider::{ConfigProvider, FileProvider, LayeredProvider};

/// Top-level configuration container for all Argus components.
#[derive(Debug, Serialize, Deserialize, Validate, Default, Clone)]
pub struct ArgusConfig {
    /// Tripwire parameters for the monitoring session.
    #[validate(nested)]
    #[serde(default)]
    pub monitoring: MonitoringConfig,

    /// Event pipeline parameters.
    #[validate(nested)]
    #[serde(default)]
    pub engine: EngineConfig,

    /// Upstream subscription reconnect behaviour.
    #[validate(nested)]
    #[serde(default)]
    pub stream: StreamConfig,

    /// Alert feed parameters.
    #[validate(nested)]
    #[serde(default)]
    pub alerts: AlertConfig,

    /// Synthetic event generation.
    #[validate(nested)]
    #[serde(default)]
    pub demo: DemoConfig,
}

impl ArgusConfig {
    /// Load configuration from default files and environment.
    ///
    /// Hierarchy:
    /// 1. Default Values
    /// 2. `config/argus.yaml` - Base settings. If missing, defaults are used.
    /// 3. `config/<environment>.yaml` - Environment-specific overrides (`ARGUS_ENV`).
    /// 4. `ARGUS_*` environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(&LayeredProvider::default())
    }

    /// Load configuration from a specific path for testing/validation.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Self::load_with(&FileProvider::new(path))
    }

    /// Extract and validate from any provider.
    pub fn load_with(provider: &dyn ConfigProvider) -> Result<Self, ConfigError> {
        provider
            .load()?
            .extract()
            .map_err(ConfigError::from)
            .and_then(|config: Self| {
                config.validate()?;
                Ok(config)
            })
    }
}
