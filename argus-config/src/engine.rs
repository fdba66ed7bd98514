//! Runtime configuration for the monitor engine.
//!
//! Manages properties of the event pipeline around the monitor:
//! - Inbound event bus sizing
//! - Tick cadence for window decay

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

use crate::validation;

/// Engine runtime configuration.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct EngineConfig {
    /// Interval between monitor ticks (milliseconds).
    #[validate(range(min = 100, max = 60_000))]
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,

    /// Capacity of the inbound event bus (must be a power of two).
    #[serde(default = "default_capacity")]
    #[validate(range(min = 128, max = 1048576))]
    #[validate(custom(function = validation::validate_power_of_two))]
    pub bus_capacity: usize,
}

fn default_tick_interval() -> u64 {
    1000
}

fn default_capacity() -> usize {
    4096
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval(),
            bus_capacity: default_capacity(),
        }
    }
}

/// Upstream subscription behaviour. The transport itself lives outside Argus.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct StreamConfig {
    /// First reconnect delay (milliseconds); doubled per failed attempt.
    #[validate(range(min = 100, max = 60_000))]
    #[serde(default = "default_reconnect_base")]
    pub reconnect_base_ms: u64,

    /// Upper bound for the reconnect delay (milliseconds).
    #[validate(range(min = 100, max = 600_000))]
    #[serde(default = "default_reconnect_max")]
    pub reconnect_max_ms: u64,

    /// Minimum spacing between connection-state alerts (seconds).
    #[serde(default = "default_connection_alert_cooldown")]
    pub connection_alert_cooldown_secs: u64,
}

fn default_reconnect_base() -> u64 {
    1000
}

fn default_reconnect_max() -> u64 {
    15_000
}

fn default_connection_alert_cooldown() -> u64 {
    8
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            reconnect_base_ms: default_reconnect_base(),
            reconnect_max_ms: default_reconnect_max(),
            connection_alert_cooldown_secs: default_connection_alert_cooldown(),
        }
    }
}
