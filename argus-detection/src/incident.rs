//! Incident records and alert debouncing.

use argus_config::MonitoringConfig;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Minimum spacing between two warning alerts.
pub const WARNING_COOLDOWN: TimeDelta = TimeDelta::seconds(8);
/// Minimum spacing between two critical alerts (and incident records).
pub const CRITICAL_COOLDOWN: TimeDelta = TimeDelta::seconds(6);

/// Snapshot of the tripwire breach, taken on a rising edge into `Triggered`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentRecord {
    pub detected_at: DateTime<Utc>,
    pub target_identifier: String,
    pub topic_filter: Option<String>,
    pub event_count_at_detection: usize,
    pub window_seconds: u64,
}

impl IncidentRecord {
    pub fn new(detected_at: DateTime<Utc>, config: &MonitoringConfig, count: usize) -> Self {
        Self {
            detected_at,
            target_identifier: config.target_identifier.clone(),
            topic_filter: config.topic_filter.clone(),
            event_count_at_detection: count,
            window_seconds: config.window_seconds,
        }
    }
}

/// Last-fired stamps per severity. `None` means the severity has not fired yet.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AlertDebounce {
    pub last_warning_at: Option<DateTime<Utc>>,
    pub last_critical_at: Option<DateTime<Utc>>,
}

impl AlertDebounce {
    /// Stamps and returns true when the warning cool-down has elapsed.
    pub fn try_warning(&mut self, now: DateTime<Utc>) -> bool {
        Self::try_fire(&mut self.last_warning_at, now, WARNING_COOLDOWN)
    }

    /// Stamps and returns true when the critical cool-down has elapsed.
    pub fn try_critical(&mut self, now: DateTime<Utc>) -> bool {
        Self::try_fire(&mut self.last_critical_at, now, CRITICAL_COOLDOWN)
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    fn try_fire(last: &mut Option<DateTime<Utc>>, now: DateTime<Utc>, cooldown: TimeDelta) -> bool {
        let ready = last.map_or(true, |at| now - at > cooldown);
        if ready {
            *last = Some(now);
        }
        ready
    }
}
