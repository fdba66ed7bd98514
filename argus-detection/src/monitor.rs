//! ## argus-detection::monitor
//! **Sliding-window burst tripwire**
//!
//! `BurstWindowMonitor` keeps a rolling window of event timestamps, classifies
//! every observation against the warning and burst thresholds, and drives the
//! `Safe -> Monitoring -> Triggered` status machine:
//!
//! - `observe` may raise the status to `Triggered`; ticks never do
//! - `Triggered` is sticky: only `resolve_incident` or `reset` leave it
//! - critical alerts (and incident records) are spaced at least 6s apart,
//!   warning alerts at least 8s apart
//!
//! All operations are local and O(window size). Concurrent hosts share one
//! instance through [`SharedMonitor`].

use std::sync::Arc;

use argus_config::{format_validation_errors, MonitoringConfig, MonitoringConfigPatch};
use argus_core::address::shorten_address;
use argus_core::alert::{channel_for, origin_prefix, Alert};
use argus_core::events::ChainEvent;
use argus_core::time::Clock;
use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};
use validator::Validate;

use crate::classify::{BurstLevel, Status};
use crate::error::DetectionError;
use crate::history::{
    BoundedLog, LogEntry, MetricPoint, MetricsSeries, Trend, EVENT_LOG_CAPACITY,
};
use crate::incident::{AlertDebounce, IncidentRecord};
use crate::window::EventWindow;

/// A status change produced by an observation or a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    pub from: Status,
    pub to: Status,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObservationResult {
    /// False when the event was ignored (monitor disabled or topic filtered out).
    pub accepted: bool,
    pub level: BurstLevel,
    pub count: usize,
    pub status: Status,
    pub status_change: Option<StatusChange>,
    pub new_incident: Option<IncidentRecord>,
    pub alert: Option<Alert>,
    pub entry: Option<LogEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TickResult {
    pub count: usize,
    pub status: Status,
    pub status_change: Option<StatusChange>,
    pub point: MetricPoint,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconfigureOutcome {
    /// Window and event log were kept.
    Retained,
    /// Target, topic, window length or enablement changed; window and event log were cleared.
    Reset,
}

/// Read-only view for UI and reporting collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorSnapshot {
    pub status: Status,
    pub incident: Option<IncidentRecord>,
    pub window_count: usize,
    pub warning_threshold: u32,
    pub burst_threshold: u32,
    pub window_seconds: u64,
    pub events: Vec<LogEntry>,
    pub metrics: Vec<MetricPoint>,
    pub trend: Trend,
}

pub struct BurstWindowMonitor {
    config: MonitoringConfig,
    clock: Arc<dyn Clock>,
    window: EventWindow,
    status: Status,
    incident: Option<IncidentRecord>,
    debounce: AlertDebounce,
    event_log: BoundedLog<LogEntry>,
    metrics: MetricsSeries,
}

impl BurstWindowMonitor {
    /// Builds a monitor, rejecting configurations that fail boundary validation.
    pub fn new(config: MonitoringConfig, clock: Arc<dyn Clock>) -> Result<Self, DetectionError> {
        validate(&config)?;
        info!(
            contract = %config.target_identifier,
            burst_threshold = config.burst_threshold,
            warning_threshold = config.warning_threshold(),
            window_seconds = config.window_seconds,
            "Burst monitor created"
        );
        Ok(Self {
            config,
            clock,
            window: EventWindow::new(),
            status: Status::Safe,
            incident: None,
            debounce: AlertDebounce::default(),
            event_log: BoundedLog::with_capacity(EVENT_LOG_CAPACITY),
            metrics: MetricsSeries::default(),
        })
    }

    /// Records one event, using its timestamp as the detection time.
    pub fn observe(&mut self, event: &ChainEvent) -> ObservationResult {
        if !self.config.enabled || !self.topic_matches(&event.topic) {
            trace!(topic = %event.topic, "Event ignored");
            return self.ignored();
        }

        let now = event.timestamp;
        self.window.record(now);
        let count = self.window.prune(self.cutoff(now));
        let level = BurstLevel::classify(
            count,
            self.config.warning_threshold(),
            self.config.burst_threshold,
        );
        debug!(count, %level, origin = %event.origin, "Event observed");

        let mut status_change = None;
        let mut new_incident = None;
        let mut alert = None;

        match level {
            BurstLevel::Blocked => {
                status_change = self.transition(Status::Triggered, now);
                if self.debounce.try_critical(now) {
                    let incident = IncidentRecord::new(now, &self.config, count);
                    info!(count, detected_at = %now, "Tripwire incident recorded");
                    self.incident = Some(incident.clone());
                    new_incident = Some(incident);
                    alert = Some(Alert::critical(
                        format!(
                            "{}Tripwire triggered: {} events/{}s on {}.",
                            origin_prefix(event.origin),
                            count,
                            self.config.window_seconds,
                            shorten_address(&self.config.target_identifier),
                        ),
                        channel_for(event.origin),
                    ));
                }
            }
            // While triggered the warning path is skipped entirely.
            BurstLevel::Suspicious if !self.status.is_triggered() => {
                status_change = self.transition(Status::Monitoring, now);
                if self.debounce.try_warning(now) {
                    alert = Some(Alert::warning(
                        format!(
                            "{}Burst detected: {}/{} events in active window.",
                            origin_prefix(event.origin),
                            count,
                            self.config.burst_threshold,
                        ),
                        channel_for(event.origin),
                    ));
                }
            }
            _ => {
                if !self.status.is_triggered() {
                    status_change = self.transition(Status::Safe, now);
                }
            }
        }

        let entry = LogEntry {
            timestamp: now,
            source_address: event.source_address.clone(),
            topic: event.topic.clone(),
            payload_preview: event.payload_preview.clone(),
            origin: event.origin,
            level,
        };
        self.event_log.push(entry.clone());

        ObservationResult {
            accepted: true,
            level,
            count,
            status: self.status,
            status_change,
            new_incident,
            alert,
            entry: Some(entry),
        }
    }

    /// Periodic decay: prunes the window and re-evaluates against the warning
    /// threshold only. Never raises the status to `Triggered`.
    pub fn tick(&mut self, now: DateTime<Utc>) -> TickResult {
        let count = self.window.prune(self.cutoff(now));
        let mut status_change = None;
        if !self.status.is_triggered() {
            let next = if count >= self.config.warning_threshold() as usize {
                Status::Monitoring
            } else {
                Status::Safe
            };
            status_change = self.transition(next, now);
        }

        let point = MetricPoint {
            timestamp: now,
            count,
        };
        self.metrics.push(point);
        trace!(count, status = %self.status, "Tick");

        TickResult {
            count,
            status: self.status,
            status_change,
            point,
        }
    }

    /// `tick` at the injected clock's current time.
    pub fn tick_now(&mut self) -> TickResult {
        let now = self.clock.now();
        self.tick(now)
    }

    /// Applies a partial configuration. Nothing changes when the merged
    /// configuration is invalid. A material change clears the window and the
    /// event log; the status is only lowered to `Safe` if not triggered.
    pub fn reconfigure(
        &mut self,
        patch: &MonitoringConfigPatch,
    ) -> Result<ReconfigureOutcome, DetectionError> {
        let next = self.config.patched(patch);
        validate(&next)?;

        let material = self.config.materially_differs(&next);
        self.config = next;
        info!(
            burst_threshold = self.config.burst_threshold,
            window_seconds = self.config.window_seconds,
            material,
            "Monitor reconfigured"
        );

        if !material {
            return Ok(ReconfigureOutcome::Retained);
        }
        self.window.clear();
        self.event_log.clear();
        if !self.status.is_triggered() {
            let now = self.clock.now();
            self.transition(Status::Safe, now);
        }
        Ok(ReconfigureOutcome::Reset)
    }

    /// Leaves `Triggered`: clears the incident (returned), returns to `Safe`
    /// and clears both debounce stamps so a new episode alerts immediately.
    pub fn resolve_incident(&mut self) -> Result<Option<IncidentRecord>, DetectionError> {
        if !self.status.is_triggered() {
            return Err(DetectionError::NotTriggered {
                status: self.status,
            });
        }
        let now = self.clock.now();
        self.transition(Status::Safe, now);
        self.debounce.clear();
        let incident = self.incident.take();
        info!(had_incident = incident.is_some(), "Incident resolved");
        Ok(incident)
    }

    /// Clears window, event log, metrics, debounce stamps and incident.
    pub fn reset(&mut self) {
        self.window.clear();
        self.event_log.clear();
        self.metrics.clear();
        self.debounce.clear();
        self.incident = None;
        self.status = Status::Safe;
        info!("Monitor state reset");
    }

    pub fn snapshot(&self) -> MonitorSnapshot {
        MonitorSnapshot {
            status: self.status,
            incident: self.incident.clone(),
            window_count: self.window.len(),
            warning_threshold: self.config.warning_threshold(),
            burst_threshold: self.config.burst_threshold,
            window_seconds: self.config.window_seconds,
            events: self.event_log.to_vec(),
            metrics: self.metrics.points(),
            trend: self.metrics.trend(self.config.burst_threshold),
        }
    }

    #[inline]
    pub fn status(&self) -> Status {
        self.status
    }

    pub fn incident(&self) -> Option<&IncidentRecord> {
        self.incident.as_ref()
    }

    pub fn config(&self) -> &MonitoringConfig {
        &self.config
    }

    pub fn window_count(&self) -> usize {
        self.window.len()
    }

    pub fn event_log(&self) -> &BoundedLog<LogEntry> {
        &self.event_log
    }

    pub fn metrics(&self) -> &MetricsSeries {
        &self.metrics
    }

    pub fn debounce(&self) -> AlertDebounce {
        self.debounce
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - TimeDelta::seconds(self.config.window_seconds as i64)
    }

    fn topic_matches(&self, topic: &str) -> bool {
        self.config
            .topic_filter
            .as_deref()
            .map_or(true, |filter| filter.eq_ignore_ascii_case(topic))
    }

    fn transition(&mut self, next: Status, at: DateTime<Utc>) -> Option<StatusChange> {
        if self.status == next {
            return None;
        }
        let change = StatusChange {
            from: self.status,
            to: next,
            at,
        };
        info!(from = %change.from, to = %change.to, "Status transition");
        self.status = next;
        Some(change)
    }

    fn ignored(&self) -> ObservationResult {
        ObservationResult {
            accepted: false,
            level: BurstLevel::Normal,
            count: self.window.len(),
            status: self.status,
            status_change: None,
            new_incident: None,
            alert: None,
            entry: None,
        }
    }
}

fn validate(config: &MonitoringConfig) -> Result<(), DetectionError> {
    config
        .validate()
        .map_err(|e| DetectionError::InvalidConfig(format_validation_errors(&e)))
}

/// A monitor behind a single lock, shared by event sources, the ticker and readers.
#[derive(Clone)]
pub struct SharedMonitor {
    inner: Arc<Mutex<BurstWindowMonitor>>,
}

impl SharedMonitor {
    pub fn new(monitor: BurstWindowMonitor) -> Self {
        Self {
            inner: Arc::new(Mutex::new(monitor)),
        }
    }

    pub fn observe(&self, event: &ChainEvent) -> ObservationResult {
        self.inner.lock().observe(event)
    }

    pub fn tick(&self, now: DateTime<Utc>) -> TickResult {
        self.inner.lock().tick(now)
    }

    pub fn tick_now(&self) -> TickResult {
        self.inner.lock().tick_now()
    }

    pub fn reconfigure(
        &self,
        patch: &MonitoringConfigPatch,
    ) -> Result<ReconfigureOutcome, DetectionError> {
        self.inner.lock().reconfigure(patch)
    }

    pub fn resolve_incident(&self) -> Result<Option<IncidentRecord>, DetectionError> {
        self.inner.lock().resolve_incident()
    }

    pub fn reset(&self) {
        self.inner.lock().reset()
    }

    pub fn snapshot(&self) -> MonitorSnapshot {
        self.inner.lock().snapshot()
    }

    pub fn status(&self) -> Status {
        self.inner.lock().status()
    }

    pub fn window_count(&self) -> usize {
        self.inner.lock().window_count()
    }

    /// Runs `f` with exclusive access to the monitor.
    pub fn with<R>(&self, f: impl FnOnce(&mut BurstWindowMonitor) -> R) -> R {
        f(&mut self.inner.lock())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argus_core::alert::{AlertLevel, CHANNEL_DEMO, CHANNEL_REACTIVITY};
    use argus_core::events::EventOrigin;
    use argus_core::time::{millis, ManualClock};
    use proptest::prelude::*;
    use tracing_test::traced_test;

    const TARGET: &str = "0x68b3465833fb72A70ecDF485E0e4C7bD8665Fc45";
    const TRANSFER: &str = "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef";

    fn config(burst_threshold: u32, window_seconds: u64) -> MonitoringConfig {
        MonitoringConfig {
            enabled: true,
            target_identifier: TARGET.into(),
            topic_filter: None,
            burst_threshold,
            window_seconds,
        }
    }

    fn monitor_with(config: MonitoringConfig) -> (BurstWindowMonitor, ManualClock) {
        let clock = ManualClock::at_epoch();
        let monitor = BurstWindowMonitor::new(config, Arc::new(clock.clone())).unwrap();
        (monitor, clock)
    }

    fn live(ms: i64) -> ChainEvent {
        ChainEvent::new(millis(ms), TARGET, TRANSFER, "0x01", EventOrigin::Live)
    }

    #[test]
    fn rejects_invalid_config_at_boundary() {
        let clock: Arc<dyn Clock> = Arc::new(ManualClock::at_epoch());
        let err = BurstWindowMonitor::new(config(1, 12), clock.clone()).err().unwrap();
        assert!(matches!(err, DetectionError::InvalidConfig(_)));

        let mut bad_target = config(8, 12);
        bad_target.target_identifier = "not-an-address".into();
        assert!(BurstWindowMonitor::new(bad_target, clock).is_err());
    }

    #[test]
    fn reference_scenario_monitoring_then_triggered() {
        let (mut monitor, _) = monitor_with(config(8, 12));
        assert_eq!(monitor.config().warning_threshold(), 5);

        let mut last = None;
        for t in 0..5 {
            last = Some(monitor.observe(&live(t * 1000)));
        }
        let fifth = last.unwrap();
        assert_eq!(fifth.count, 5);
        assert_eq!(fifth.level, BurstLevel::Suspicious);
        assert_eq!(monitor.status(), Status::Monitoring);
        assert_eq!(fifth.alert.as_ref().unwrap().level, AlertLevel::Warning);

        let mut incidents = Vec::new();
        for t in 5..8 {
            let result = monitor.observe(&live(t * 1000));
            incidents.extend(result.new_incident);
        }
        assert_eq!(monitor.status(), Status::Triggered);
        assert_eq!(incidents.len(), 1);
        assert_eq!(incidents[0].event_count_at_detection, 8);
        assert_eq!(incidents[0].detected_at, millis(7000));
        assert_eq!(monitor.incident(), Some(&incidents[0]));
    }

    #[test]
    fn triggered_is_sticky_across_ticks_and_quiet_events() {
        let (mut monitor, _) = monitor_with(config(8, 12));
        for t in 0..8 {
            monitor.observe(&live(t * 1000));
        }
        assert_eq!(monitor.status(), Status::Triggered);

        let tick = monitor.tick(millis(7000 + 12_001));
        assert_eq!(tick.count, 0);
        assert_eq!(tick.status, Status::Triggered);
        assert!(tick.status_change.is_none());

        let quiet = monitor.observe(&live(40_000));
        assert_eq!(quiet.level, BurstLevel::Normal);
        assert_eq!(quiet.status, Status::Triggered);
        assert!(monitor.incident().is_some());
    }

    #[test]
    fn double_burst_keeps_single_incident() {
        let (mut monitor, _) = monitor_with(config(8, 12));
        let mut criticals = 0;
        for t in 0..8 {
            let r = monitor.observe(&live(t * 1000));
            criticals += r.alert.iter().filter(|a| a.level == AlertLevel::Critical).count();
        }
        let first = monitor.incident().cloned().unwrap();

        let second = monitor.observe(&live(9000));
        assert_eq!(second.level, BurstLevel::Blocked);
        assert!(second.alert.is_none());
        assert!(second.new_incident.is_none());
        assert_eq!(criticals, 1);
        assert_eq!(monitor.status(), Status::Triggered);
        assert_eq!(monitor.incident(), Some(&first));
    }

    #[test]
    fn critical_refires_after_cooldown_with_new_incident() {
        let (mut monitor, _) = monitor_with(config(2, 60));
        let first = monitor.observe(&live(0));
        assert_eq!(first.level, BurstLevel::Normal);
        let trip = monitor.observe(&live(1000));
        assert!(trip.new_incident.is_some());

        let suppressed = monitor.observe(&live(7000));
        assert!(suppressed.alert.is_none());

        let refire = monitor.observe(&live(7001));
        let incident = refire.new_incident.unwrap();
        assert_eq!(incident.event_count_at_detection, 4);
        assert_eq!(monitor.incident().unwrap().detected_at, millis(7001));
    }

    #[test]
    fn tick_never_triggers_and_decays() {
        let (mut monitor, _) = monitor_with(config(8, 12));
        for t in 0..6 {
            monitor.observe(&live(t * 100));
        }
        assert_eq!(monitor.status(), Status::Monitoring);

        let tick = monitor.tick(millis(1000));
        assert_eq!(tick.status, Status::Monitoring);
        assert_eq!(tick.count, 6);

        let tick = monitor.tick(millis(12_250));
        assert_eq!(tick.count, 3);
        assert_eq!(tick.status, Status::Safe);
        assert_eq!(tick.status_change.unwrap().from, Status::Monitoring);
    }

    #[test]
    fn warnings_are_debounced() {
        let (mut monitor, _) = monitor_with(config(20, 60));
        let warnings: Vec<i64> = (0..30)
            .map(|t| t * 1000)
            .filter(|t| {
                monitor
                    .observe(&live(*t))
                    .alert
                    .is_some_and(|a| a.level == AlertLevel::Warning)
            })
            .collect();
        // Warning threshold is 12: first warning at t=11s, next after more than 8s.
        assert_eq!(warnings, vec![11_000]);
    }

    #[test]
    fn no_warning_while_triggered() {
        let (mut monitor, _) = monitor_with(config(4, 5));
        for t in 0..4 {
            monitor.observe(&live(t * 100));
        }
        assert_eq!(monitor.status(), Status::Triggered);
        // Count drops back to the warning band once older entries age out.
        let r = monitor.observe(&live(5_150));
        assert_eq!(r.level, BurstLevel::Suspicious);
        assert!(r.alert.is_none());
        assert_eq!(r.status, Status::Triggered);
    }

    #[test]
    fn synthetic_alerts_are_tagged() {
        let (mut monitor, _) = monitor_with(config(2, 12));
        monitor.observe(&ChainEvent::bare(millis(0), EventOrigin::Synthetic));
        let r = monitor.observe(&ChainEvent::bare(millis(10), EventOrigin::Synthetic));
        let alert = r.alert.unwrap();
        assert_eq!(alert.channel, CHANNEL_DEMO);
        assert_eq!(
            alert.message,
            "[Demo] Tripwire triggered: 2 events/12s on 0x68b3...Fc45."
        );
        assert_eq!(r.entry.unwrap().origin, EventOrigin::Synthetic);

        let (mut monitor, _) = monitor_with(config(8, 12));
        let mut last = None;
        for t in 0..5 {
            last = monitor.observe(&live(t)).alert.or(last);
        }
        let warning = last.unwrap();
        assert_eq!(warning.channel, CHANNEL_REACTIVITY);
        assert_eq!(warning.message, "Burst detected: 5/8 events in active window.");
    }

    #[test]
    fn resolve_requires_triggered() {
        let (mut monitor, _) = monitor_with(config(8, 12));
        monitor.observe(&live(0));
        let err = monitor.resolve_incident().unwrap_err();
        assert_eq!(err, DetectionError::NotTriggered { status: Status::Safe });
        assert_eq!(monitor.window_count(), 1);
        assert_eq!(monitor.status(), Status::Safe);
    }

    #[test]
    fn resolve_clears_incident_and_debounce() {
        let (mut monitor, clock) = monitor_with(config(2, 12));
        monitor.observe(&live(0));
        monitor.observe(&live(100));
        assert_eq!(monitor.status(), Status::Triggered);

        clock.set(millis(200));
        let resolved = monitor.resolve_incident().unwrap();
        assert_eq!(resolved.unwrap().event_count_at_detection, 2);
        assert_eq!(monitor.status(), Status::Safe);
        assert!(monitor.incident().is_none());
        assert_eq!(monitor.debounce(), AlertDebounce::default());

        // Window still holds the burst: the next event re-triggers and alerts at once.
        let again = monitor.observe(&live(300));
        assert_eq!(again.status, Status::Triggered);
        assert!(again.alert.is_some());
        assert!(again.new_incident.is_some());
    }

    #[test]
    fn reset_clears_everything() {
        let (mut monitor, _) = monitor_with(config(2, 12));
        monitor.observe(&live(0));
        monitor.observe(&live(1));
        monitor.tick(millis(1000));
        monitor.reset();

        let snapshot = monitor.snapshot();
        assert_eq!(snapshot.status, Status::Safe);
        assert!(snapshot.incident.is_none());
        assert_eq!(snapshot.window_count, 0);
        assert!(snapshot.events.is_empty());
        assert!(snapshot.metrics.is_empty());
        assert_eq!(monitor.debounce(), AlertDebounce::default());
    }

    #[test]
    fn disabled_monitor_ignores_events() {
        let mut cfg = config(8, 12);
        cfg.enabled = false;
        let (mut monitor, _) = monitor_with(cfg);
        let r = monitor.observe(&live(0));
        assert!(!r.accepted);
        assert_eq!(monitor.window_count(), 0);
        assert!(monitor.event_log().is_empty());
    }

    #[test]
    fn topic_filter_skips_other_topics() {
        let mut cfg = config(2, 12);
        cfg.topic_filter = Some(TRANSFER.to_uppercase().replace("0X", "0x"));
        let (mut monitor, _) = monitor_with(cfg);

        let other = ChainEvent::new(millis(0), TARGET, "0x1234", "0x", EventOrigin::Live);
        assert!(!monitor.observe(&other).accepted);
        assert!(monitor.observe(&live(1)).accepted);
        assert_eq!(monitor.window_count(), 1);
    }

    #[test]
    fn reconfigure_resets_on_material_change_only() {
        let (mut monitor, _) = monitor_with(config(8, 12));
        for t in 0..5 {
            monitor.observe(&live(t));
        }
        assert_eq!(monitor.status(), Status::Monitoring);

        let outcome = monitor
            .reconfigure(&MonitoringConfigPatch {
                burst_threshold: Some(10),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(outcome, ReconfigureOutcome::Retained);
        assert_eq!(monitor.window_count(), 5);
        // No retroactive reclassification.
        assert_eq!(monitor.status(), Status::Monitoring);

        let outcome = monitor
            .reconfigure(&MonitoringConfigPatch {
                window_seconds: Some(30),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(outcome, ReconfigureOutcome::Reset);
        assert_eq!(monitor.window_count(), 0);
        assert!(monitor.event_log().is_empty());
        assert_eq!(monitor.status(), Status::Safe);
    }

    #[test]
    fn reconfigure_rejects_invalid_patch_without_side_effects() {
        let (mut monitor, _) = monitor_with(config(8, 12));
        monitor.observe(&live(0));
        let err = monitor.reconfigure(&MonitoringConfigPatch {
            burst_threshold: Some(1),
            window_seconds: Some(30),
            ..Default::default()
        });
        assert!(err.is_err());
        assert_eq!(monitor.config().burst_threshold, 8);
        assert_eq!(monitor.window_count(), 1);
    }

    #[test]
    fn reconfigure_keeps_triggered_status() {
        let (mut monitor, _) = monitor_with(config(2, 12));
        monitor.observe(&live(0));
        monitor.observe(&live(1));
        monitor
            .reconfigure(&MonitoringConfigPatch {
                target_identifier: Some(format!("0x{}01", "0".repeat(38))),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(monitor.status(), Status::Triggered);
        assert!(monitor.incident().is_some());
    }

    #[test]
    fn tick_now_uses_injected_clock() {
        let (mut monitor, clock) = monitor_with(config(8, 12));
        clock.set(millis(42_000));
        let tick = monitor.tick_now();
        assert_eq!(tick.point.timestamp, millis(42_000));
    }

    #[test]
    fn log_and_series_are_bounded() {
        let (mut monitor, _) = monitor_with(config(1000, 1));
        for t in 0..60 {
            monitor.observe(&live(t * 2000));
            monitor.tick(millis(t * 2000 + 1000));
        }
        let snapshot = monitor.snapshot();
        assert_eq!(snapshot.events.len(), 25);
        assert_eq!(snapshot.metrics.len(), 45);
        assert_eq!(snapshot.events[0].timestamp, millis(59 * 2000));
        assert_eq!(snapshot.metrics[0].timestamp, millis(15 * 2000 + 1000));
    }

    #[test]
    fn shared_monitor_serializes_access() {
        let (monitor, _) = monitor_with(config(1000, 3600));
        let shared = SharedMonitor::new(monitor);
        let handles: Vec<_> = (0..4)
            .map(|p| {
                let shared = shared.clone();
                std::thread::spawn(move || {
                    for i in 0..50 {
                        shared.observe(&live(p * 10_000 + i));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(shared.with(|m| m.window_count()), 200);
    }

    #[traced_test]
    #[test]
    fn transitions_are_logged() {
        let (mut monitor, _) = monitor_with(config(2, 12));
        monitor.observe(&live(0));
        monitor.observe(&live(1));
        assert!(logs_contain("Status transition"));
        assert!(logs_contain("Tripwire incident recorded"));
    }

    proptest! {
        #[test]
        fn alerts_respect_cooldowns(gaps in proptest::collection::vec(0i64..4_000, 1..120)) {
            let (mut monitor, _) = monitor_with(config(3, 10));
            let mut now = 0;
            let mut last_critical: Option<i64> = None;
            let mut last_warning: Option<i64> = None;
            for gap in gaps {
                now += gap;
                let r = monitor.observe(&live(now));
                prop_assert!(monitor.window.iter().all(|ts| *ts >= millis(now - 10_000)));
                if let Some(alert) = r.alert {
                    match alert.level {
                        AlertLevel::Critical => {
                            if let Some(prev) = last_critical {
                                prop_assert!(now - prev > 6_000);
                            }
                            last_critical = Some(now);
                        }
                        AlertLevel::Warning => {
                            if let Some(prev) = last_warning {
                                prop_assert!(now - prev > 8_000);
                            }
                            last_warning = Some(now);
                        }
                        _ => {}
                    }
                }
                if r.count >= 3 {
                    prop_assert_eq!(monitor.status(), Status::Triggered);
                }
            }
        }

        #[test]
        fn once_triggered_stays_triggered(ticks in proptest::collection::vec(0i64..100_000, 1..50)) {
            let (mut monitor, _) = monitor_with(config(2, 5));
            monitor.observe(&live(0));
            monitor.observe(&live(1));
            for t in ticks {
                monitor.tick(millis(t));
                prop_assert_eq!(monitor.status(), Status::Triggered);
            }
        }
    }
}
