//! Alerts emitted towards the notification collaborators.
//!
//! Delivery is fire-and-forget: nothing about an alert feeds back into the
//! monitor state.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::events::EventOrigin;

/// Live subscription traffic.
pub const CHANNEL_REACTIVITY: &str = "Reactivity";
/// Synthetic traffic from the demo generator.
pub const CHANNEL_DEMO: &str = "Demo";
/// Incident resolution workflow.
pub const CHANNEL_RECOVERY: &str = "Recovery";
/// Configuration changes.
pub const CHANNEL_CONFIG: &str = "Config";
pub const CHANNEL_SYSTEM: &str = "System";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Info,
    Success,
    Warning,
    Critical,
}

impl fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AlertLevel::Info => "info",
            AlertLevel::Success => "success",
            AlertLevel::Warning => "warning",
            AlertLevel::Critical => "critical",
        };
        f.write_str(label)
    }
}

impl FromStr for AlertLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "info" => Ok(AlertLevel::Info),
            "success" => Ok(AlertLevel::Success),
            "warning" => Ok(AlertLevel::Warning),
            "critical" => Ok(AlertLevel::Critical),
            other => Err(format!("unknown alert level: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub level: AlertLevel,
    pub message: String,
    pub channel: String,
}

impl Alert {
    pub fn new(level: AlertLevel, message: impl Into<String>, channel: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            channel: channel.into(),
        }
    }

    pub fn info(message: impl Into<String>, channel: impl Into<String>) -> Self {
        Self::new(AlertLevel::Info, message, channel)
    }

    pub fn success(message: impl Into<String>, channel: impl Into<String>) -> Self {
        Self::new(AlertLevel::Success, message, channel)
    }

    pub fn warning(message: impl Into<String>, channel: impl Into<String>) -> Self {
        Self::new(AlertLevel::Warning, message, channel)
    }

    pub fn critical(message: impl Into<String>, channel: impl Into<String>) -> Self {
        Self::new(AlertLevel::Critical, message, channel)
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.channel, self.level, self.message)
    }
}

/// Channel an event-driven alert is reported on.
pub fn channel_for(origin: EventOrigin) -> &'static str {
    match origin {
        EventOrigin::Live => CHANNEL_REACTIVITY,
        EventOrigin::Synthetic => CHANNEL_DEMO,
    }
}

/// Message prefix marking synthetic traffic.
pub fn origin_prefix(origin: EventOrigin) -> &'static str {
    match origin {
        EventOrigin::Live => "",
        EventOrigin::Synthetic => "[Demo] ",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_parsing_and_order() {
        assert_eq!("Critical".parse::<AlertLevel>().unwrap(), AlertLevel::Critical);
        assert!("loud".parse::<AlertLevel>().is_err());
        assert!(AlertLevel::Critical > AlertLevel::Warning);
        assert!(AlertLevel::Warning > AlertLevel::Info);
    }

    #[test]
    fn origin_routing() {
        assert_eq!(channel_for(EventOrigin::Live), CHANNEL_REACTIVITY);
        assert_eq!(channel_for(EventOrigin::Synthetic), CHANNEL_DEMO);
        assert_eq!(origin_prefix(EventOrigin::Synthetic), "[Demo] ");
    }

    #[test]
    fn display() {
        let alert = Alert::warning("Burst detected", CHANNEL_REACTIVITY);
        assert_eq!(alert.to_string(), "[Reactivity] warning: Burst detected");
    }
}
