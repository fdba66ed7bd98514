//! Reconnect pacing for upstream subscriptions.

use std::time::Duration;

use argus_config::StreamConfig;
use chrono::{DateTime, TimeDelta, Utc};

/// Exponential backoff: attempt `n` waits `min(max, base * 2^(n-1))`.
#[derive(Debug, Clone)]
pub struct ReconnectBackoff {
    base: Duration,
    max: Duration,
    attempt: u32,
}

impl ReconnectBackoff {
    pub fn new(base: Duration, max: Duration) -> Self {
        Self {
            base,
            max,
            attempt: 0,
        }
    }

    pub fn from_config(config: &StreamConfig) -> Self {
        Self::new(
            Duration::from_millis(config.reconnect_base_ms),
            Duration::from_millis(config.reconnect_max_ms),
        )
    }

    /// Registers a failed attempt and returns the delay before the next one.
    pub fn next_delay(&mut self) -> Duration {
        self.attempt = self.attempt.saturating_add(1);
        let factor = 1u32.checked_shl(self.attempt - 1).unwrap_or(u32::MAX);
        self.base.saturating_mul(factor).min(self.max)
    }

    pub fn reset(&mut self) {
        self.attempt = 0;
    }

    pub fn attempts(&self) -> u32 {
        self.attempt
    }
}

impl Default for ReconnectBackoff {
    fn default() -> Self {
        Self::from_config(&StreamConfig::default())
    }
}

/// Rate limit for connection-state alerts. Unlike tripwire alerts, a
/// connection alert may fire again once exactly `cooldown` has passed.
#[derive(Debug, Clone)]
pub struct ConnectionAlertGate {
    cooldown: TimeDelta,
    last: Option<DateTime<Utc>>,
}

impl ConnectionAlertGate {
    pub fn new(cooldown: TimeDelta) -> Self {
        Self {
            cooldown,
            last: None,
        }
    }

    pub fn from_config(config: &StreamConfig) -> Self {
        Self::new(TimeDelta::seconds(config.connection_alert_cooldown_secs as i64))
    }

    pub fn allow(&mut self, now: DateTime<Utc>) -> bool {
        if self.last.is_some_and(|last| now - last < self.cooldown) {
            return false;
        }
        self.last = Some(now);
        true
    }
}
