//! Burst levels and monitor status.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Rate classification of a single observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BurstLevel {
    Normal,
    Suspicious,
    Blocked,
}

impl BurstLevel {
    /// First match wins: burst threshold, then warning threshold.
    #[inline]
    pub fn classify(count: usize, warning_threshold: u32, burst_threshold: u32) -> Self {
        if count >= burst_threshold as usize {
            BurstLevel::Blocked
        } else if count >= warning_threshold as usize {
            BurstLevel::Suspicious
        } else {
            BurstLevel::Normal
        }
    }
}

impl fmt::Display for BurstLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BurstLevel::Normal => "normal",
            BurstLevel::Suspicious => "suspicious",
            BurstLevel::Blocked => "blocked",
        };
        f.write_str(label)
    }
}

/// Tripwire state. `Triggered` is sticky until the incident is resolved.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Safe,
    Monitoring,
    Triggered,
}

impl Status {
    #[inline]
    pub fn is_triggered(self) -> bool {
        self == Status::Triggered
    }

    /// Short operator-facing description.
    pub fn description(self) -> &'static str {
        match self {
            Status::Safe => "No suspicious burst in configured window.",
            Status::Monitoring => "Burst pattern detected, threshold not yet breached.",
            Status::Triggered => "Burst threshold breached, investigate recovery panel.",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Status::Safe => "SAFE",
            Status::Monitoring => "MONITORING",
            Status::Triggered => "TRIGGERED",
        };
        f.write_str(label)
    }
}
