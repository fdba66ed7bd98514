//! Alert feed configuration.

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

use crate::validation;

/// Alert feed configuration.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct AlertConfig {
    /// Number of alerts retained by the in-memory feed.
    #[validate(range(min = 1, max = 10_000))]
    #[serde(default = "default_feed_capacity")]
    pub feed_capacity: usize,

    /// Minimum alert level forwarded to sinks.
    #[validate(custom(function = validation::validate_alert_level))]
    #[serde(default = "default_min_level")]
    pub min_level: String,
}

fn default_feed_capacity() -> usize {
    120
}

fn default_min_level() -> String {
    "info".into()
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            feed_capacity: default_feed_capacity(),
            min_level: default_min_level(),
        }
    }
}
