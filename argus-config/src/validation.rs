//! Custom validation functions for configuration.
//!
//! Provides shared validation logic used across multiple configuration modules.

use argus_core::address;
use validator::ValidationError;

use crate::monitoring::MonitoringConfig;

/// Target may be left empty while monitoring is off; otherwise it must be an address.
pub fn validate_target(target: &str) -> Result<(), ValidationError> {
    if target.is_empty() || address::is_address(target) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_address")
            .with_message("Use an EVM address in 0x... format".into()))
    }
}

/// Topic filters are 32-byte hex words (`0x` + 64 hex digits).
pub fn validate_topic(topic: &str) -> Result<(), ValidationError> {
    if topic.is_empty() || address::is_topic_word(topic) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_topic")
            .with_message("Use a 32-byte hex topic (0x + 64 hex) or leave it empty".into()))
    }
}

/// An enabled session needs a target before it may start.
pub fn validate_monitoring_target(config: &MonitoringConfig) -> Result<(), ValidationError> {
    if config.enabled && !address::is_address(&config.target_identifier) {
        return Err(ValidationError::new("target_required")
            .with_message("Monitoring is enabled but no valid contract address is set".into()));
    }
    Ok(())
}

/// Validate that a given value is a power of two.
pub fn validate_power_of_two(value: usize) -> Result<(), ValidationError> {
    if value.is_power_of_two() {
        Ok(())
    } else {
        Err(ValidationError::new("must_be_power_of_two"))
    }
}

/// Validate alert level names.
pub fn validate_alert_level(level: &str) -> Result<(), ValidationError> {
    let valid = ["info", "warning", "critical", "success"].contains(&level.to_lowercase().as_str());
    if valid {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_alert_level"))
    }
}
