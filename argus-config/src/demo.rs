//! Synthetic event generation settings.

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct DemoConfig {
    /// Seed for the synthetic event generator.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Spacing between injected burst-demo events (milliseconds).
    #[validate(range(min = 1, max = 10_000))]
    #[serde(default = "default_burst_spacing")]
    pub burst_spacing_ms: u64,
}

fn default_seed() -> u64 {
    42
}

fn default_burst_spacing() -> u64 {
    220
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            burst_spacing_ms: default_burst_spacing(),
        }
    }
}
