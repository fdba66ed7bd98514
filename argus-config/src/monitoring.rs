//! Tripwire configuration for a single monitoring session.
//!
//! Defines the watched contract, the optional topic filter and the burst
//! thresholds. The warning threshold is always derived from the burst
//! threshold and never stored.

use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use validator::{self, Validate};

use crate::validation;

/// Smallest burst threshold accepted at the configuration boundary.
pub const MIN_BURST_THRESHOLD: u32 = 2;

/// Monitoring session configuration.
#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq, Eq)]
#[validate(schema(function = validation::validate_monitoring_target))]
pub struct MonitoringConfig {
    /// Whether the monitor accepts events.
    #[serde(default)]
    pub enabled: bool,

    /// Contract address whose events are watched.
    #[validate(custom(function = validation::validate_target))]
    #[serde(default)]
    pub target_identifier: String,

    /// Optional topic0 filter (32-byte hex word).
    #[validate(custom(function = validation::validate_topic))]
    #[serde(default, deserialize_with = "deserialize_topic")]
    pub topic_filter: Option<String>,

    /// Event count inside the window that trips the wire.
    #[validate(range(min = 2, max = 100_000))]
    #[serde(default = "default_burst_threshold")]
    pub burst_threshold: u32,

    /// Rolling window length in seconds.
    #[validate(range(min = 1, max = 86_400))]
    #[serde(default = "default_window_seconds", deserialize_with = "deserialize_window")]
    pub window_seconds: u64,
}

fn default_burst_threshold() -> u32 {
    8
}

fn default_window_seconds() -> u64 {
    12
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            target_identifier: String::new(),
            topic_filter: None,
            burst_threshold: default_burst_threshold(),
            window_seconds: default_window_seconds(),
        }
    }
}

impl MonitoringConfig {
    /// Count at which the monitor starts reporting a suspicious burst.
    ///
    /// `max(2, ceil(burst_threshold * 0.6))`, computed in integers.
    #[inline]
    pub fn warning_threshold(&self) -> u32 {
        warning_threshold_for(self.burst_threshold)
    }

    /// Monitoring may start only for an enabled config with a well-formed target.
    pub fn can_monitor(&self) -> bool {
        self.enabled && argus_core::address::is_address(&self.target_identifier)
    }

    /// Topic filter for display, `any` when unset.
    pub fn topic_label(&self) -> &str {
        self.topic_filter.as_deref().unwrap_or("any")
    }

    pub fn risk_profile(&self) -> RiskProfile {
        RiskProfile::from_threshold(self.burst_threshold)
    }

    /// Returns a copy with `patch` applied on top.
    pub fn patched(&self, patch: &MonitoringConfigPatch) -> Self {
        let mut next = self.clone();
        if let Some(enabled) = patch.enabled {
            next.enabled = enabled;
        }
        if let Some(target) = &patch.target_identifier {
            next.target_identifier = target.trim().to_string();
        }
        if let Some(topic) = &patch.topic_filter {
            next.topic_filter = normalize_topic(topic.clone());
        }
        if let Some(threshold) = patch.burst_threshold {
            next.burst_threshold = threshold;
        }
        if let Some(window) = patch.window_seconds {
            next.window_seconds = window;
        }
        next
    }

    /// True when switching to `other` invalidates the events already counted.
    pub fn materially_differs(&self, other: &MonitoringConfig) -> bool {
        !self
            .target_identifier
            .eq_ignore_ascii_case(&other.target_identifier)
            || !topics_match(self.topic_filter.as_deref(), other.topic_filter.as_deref())
            || self.window_seconds != other.window_seconds
            || self.enabled != other.enabled
    }
}

/// `max(2, ceil(burst_threshold * 0.6))`.
pub fn warning_threshold_for(burst_threshold: u32) -> u32 {
    MIN_BURST_THRESHOLD.max((burst_threshold.saturating_mul(3)).div_ceil(5))
}

fn topics_match(a: Option<&str>, b: Option<&str>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
        (None, None) => true,
        _ => false,
    }
}

/// Partial update for [`MonitoringConfig`]. `None` leaves a field untouched.
///
/// `topic_filter: Some(None)` clears the filter.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitoringConfigPatch {
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub target_identifier: Option<String>,
    #[serde(default)]
    pub topic_filter: Option<Option<String>>,
    #[serde(default)]
    pub burst_threshold: Option<u32>,
    #[serde(default)]
    pub window_seconds: Option<u64>,
}

/// How aggressive a burst threshold is, for display next to the tripwire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskProfile {
    VeryStrict,
    Strict,
    Moderate,
    Relaxed,
    VeryRelaxed,
}

impl RiskProfile {
    pub fn from_threshold(burst_threshold: u32) -> Self {
        match burst_threshold {
            0..=4 => RiskProfile::VeryStrict,
            5..=8 => RiskProfile::Strict,
            9..=12 => RiskProfile::Moderate,
            13..=18 => RiskProfile::Relaxed,
            _ => RiskProfile::VeryRelaxed,
        }
    }
}

impl fmt::Display for RiskProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RiskProfile::VeryStrict => "Very Strict",
            RiskProfile::Strict => "Strict",
            RiskProfile::Moderate => "Moderate",
            RiskProfile::Relaxed => "Relaxed",
            RiskProfile::VeryRelaxed => "Very Relaxed",
        };
        f.write_str(label)
    }
}

fn normalize_topic(topic: Option<String>) -> Option<String> {
    topic
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Empty strings mean "no filter".
fn deserialize_topic<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let topic = Option::<String>::deserialize(deserializer)?;
    Ok(normalize_topic(topic))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WindowValue {
    Num(u64),
    Str(String),
}

lazy_static! {
    static ref WINDOW_RE: Regex =
        Regex::new(r"^(\d+)\s*(s|sec|secs|seconds|m|min|mins|minutes)?$")
            .expect("window pattern compiles");
}

/// Parses a window length such as `12`, `"12s"` or `"2m"` into seconds.
pub fn parse_window(value: &str) -> Result<u64, String> {
    let value = value.trim().to_lowercase();
    let caps = WINDOW_RE
        .captures(&value)
        .ok_or_else(|| format!("Invalid window length: {value}"))?;
    let amount: u64 = caps[1].parse().map_err(|e| format!("{e}"))?;
    let multiplier = match caps.get(2).map(|m| m.as_str()) {
        None | Some("s" | "sec" | "secs" | "seconds") => 1,
        Some(_) => 60,
    };
    amount
        .checked_mul(multiplier)
        .ok_or_else(|| format!("Window length overflows: {value}"))
}

/// Custom deserializer to allow human-friendly windows ("90s", "2m") or plain seconds.
fn deserialize_window<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match WindowValue::deserialize(deserializer)? {
        WindowValue::Num(n) => Ok(n),
        WindowValue::Str(s) => parse_window(&s).map_err(serde::de::Error::custom),
    }
}
