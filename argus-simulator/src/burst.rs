//! Burst demo: enough synthetic events, close enough together, to walk the
//! monitor through `Monitoring` into `Triggered`.

use argus_config::MonitoringConfig;
use argus_core::alert::{Alert, CHANNEL_DEMO};
use argus_core::events::ChainEvent;
use argus_detection::Status;
use chrono::{DateTime, TimeDelta, Utc};

use crate::generator::DemoGenerator;

pub const DEFAULT_BURST_SPACING_MS: u64 = 220;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BurstDemo {
    pub event_count: u32,
    pub spacing: TimeDelta,
}

impl BurstDemo {
    /// `None` while the monitor is triggered; otherwise
    /// `max(burst_threshold + 1, warning_threshold + 2)` events.
    pub fn plan(config: &MonitoringConfig, status: Status, spacing_ms: u64) -> Option<Self> {
        if status.is_triggered() {
            return None;
        }
        let event_count = (config.burst_threshold + 1).max(config.warning_threshold() + 2);
        Some(Self {
            event_count,
            spacing: TimeDelta::milliseconds(spacing_ms as i64),
        })
    }

    pub fn start_alert(&self) -> Alert {
        Alert::info(
            format!(
                "Burst demo started. Injecting {} synthetic events into active window.",
                self.event_count
            ),
            CHANNEL_DEMO,
        )
    }

    /// Emission times; the first event fires one spacing after `start`.
    pub fn timestamps(&self, start: DateTime<Utc>) -> impl Iterator<Item = DateTime<Utc>> + '_ {
        (1..=self.event_count as i32).map(move |i| start + self.spacing * i)
    }

    pub fn events(&self, generator: &mut DemoGenerator, start: DateTime<Utc>) -> Vec<ChainEvent> {
        self.timestamps(start)
            .map(|ts| generator.next_event(ts))
            .collect()
    }
}
