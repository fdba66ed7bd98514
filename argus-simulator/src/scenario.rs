//! Scenario files: a monitoring config plus timed steps, in YAML.
//!
//! ```yaml
//! seed: 42
//! config:
//!   enabled: true
//!   target_identifier: "0x68b3465833fb72A70ecDF485E0e4C7bD8665Fc45"
//!   burst_threshold: 8
//!   window_seconds: 12s
//! steps:
//!   - at_ms: 0
//!     action: observe
//!     count: 8
//!     spacing_ms: 1000
//!   - at_ms: 20000
//!     action: tick
//! ```

use std::path::Path;

use argus_config::{MonitoringConfig, MonitoringConfigPatch};
use serde::{Deserialize, Serialize};

use crate::error::SimulationError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default = "default_seed")]
    pub seed: u64,
    pub config: MonitoringConfig,
    #[serde(default)]
    pub steps: Vec<ScenarioStep>,
    /// Hex BLAKE3 digest the replay must reproduce.
    #[serde(default)]
    pub expected_hash: Option<String>,
}

fn default_seed() -> u64 {
    42
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioStep {
    /// Milliseconds since the scenario epoch.
    pub at_ms: i64,
    #[serde(flatten)]
    pub action: StepAction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum StepAction {
    /// `count` events, `spacing_ms` apart, starting at `at_ms`.
    Observe {
        #[serde(default = "default_count")]
        count: u32,
        #[serde(default)]
        spacing_ms: i64,
        #[serde(default)]
        synthetic: bool,
        /// Overrides the generated topic, e.g. to exercise the topic filter.
        #[serde(default)]
        topic: Option<String>,
    },
    Tick,
    Resolve,
    Reset,
    Reconfigure {
        patch: MonitoringConfigPatch,
    },
    BurstDemo {
        #[serde(default = "default_spacing")]
        spacing_ms: u64,
    },
}

fn default_count() -> u32 {
    1
}

fn default_spacing() -> u64 {
    crate::burst::DEFAULT_BURST_SPACING_MS
}

impl Scenario {
    pub fn from_yaml(source: &str) -> Result<Self, SimulationError> {
        Ok(serde_yaml::from_str(source)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SimulationError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SimulationError::FileNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn to_yaml(&self) -> Result<String, SimulationError> {
        Ok(serde_yaml::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIO: &str = r#"
config:
  enabled: true
  target_identifier: "0x68b3465833fb72A70ecDF485E0e4C7bD8665Fc45"
  burst_threshold: 8
  window_seconds: 12s
steps:
  - at_ms: 0
    action: observe
    count: 8
    spacing_ms: 1000
  - at_ms: 20000
    action: tick
  - at_ms: 21000
    action: resolve
  - at_ms: 22000
    action: reconfigure
    patch:
      burst_threshold: 10
  - at_ms: 23000
    action: burst_demo
"#;

    #[test]
    fn parses_steps() {
        let scenario = Scenario::from_yaml(SCENARIO).unwrap();
        assert_eq!(scenario.seed, 42);
        assert_eq!(scenario.config.window_seconds, 12);
        assert_eq!(scenario.steps.len(), 5);
        assert_eq!(
            scenario.steps[0].action,
            StepAction::Observe {
                count: 8,
                spacing_ms: 1000,
                synthetic: false,
                topic: None
            }
        );
        assert_eq!(scenario.steps[1].action, StepAction::Tick);
        assert_eq!(
            scenario.steps[4].action,
            StepAction::BurstDemo { spacing_ms: 220 }
        );
        assert!(scenario.expected_hash.is_none());
    }

    #[test]
    fn rejects_unknown_action() {
        let yaml = "config: {}\nsteps:\n  - at_ms: 0\n    action: explode\n";
        assert!(matches!(
            Scenario::from_yaml(yaml),
            Err(SimulationError::Scenario(_))
        ));
    }

    #[test]
    fn missing_file() {
        assert!(matches!(
            Scenario::load("does/not/exist.yaml"),
            Err(SimulationError::FileNotFound(_))
        ));
    }
}
