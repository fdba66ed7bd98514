//! Deterministic scenario replay.
//!
//! Every step runs against a `ManualClock` set to the step's time, so a
//! scenario always yields the same transitions, alerts and incidents. Those
//! are folded, in order, into a BLAKE3 state hash.

use std::sync::Arc;

use argus_core::alert::Alert;
use argus_core::events::{ChainEvent, EventOrigin};
use argus_core::time::{millis, ManualClock};
use argus_detection::{
    BurstWindowMonitor, IncidentRecord, MonitorSnapshot, ObservationResult, StatusChange,
};
use blake3::Hasher;
use chrono::TimeDelta;
use tracing::{debug, info, warn};

use crate::burst::BurstDemo;
use crate::error::SimulationError;
use crate::generator::DemoGenerator;
use crate::scenario::{Scenario, StepAction};

/// Outcome of one replay.
#[derive(Debug, Clone)]
pub struct ScenarioReport {
    pub hash: String,
    pub transitions: Vec<StatusChange>,
    pub alerts: Vec<Alert>,
    pub incidents: Vec<IncidentRecord>,
    pub rejected_resolves: usize,
    pub events_observed: usize,
    pub final_snapshot: MonitorSnapshot,
}

pub struct ScenarioRunner {
    monitor: BurstWindowMonitor,
    clock: ManualClock,
    generator: DemoGenerator,
    state_hasher: Hasher,
    transitions: Vec<StatusChange>,
    alerts: Vec<Alert>,
    incidents: Vec<IncidentRecord>,
    rejected_resolves: usize,
    events_observed: usize,
}

impl ScenarioRunner {
    pub fn new(scenario: &Scenario) -> Result<Self, SimulationError> {
        let clock = ManualClock::at_epoch();
        let monitor = BurstWindowMonitor::new(scenario.config.clone(), Arc::new(clock.clone()))?;
        let generator = DemoGenerator::new(scenario.seed, scenario.config.topic_filter.as_deref());
        Ok(Self {
            monitor,
            clock,
            generator,
            state_hasher: Hasher::new(),
            transitions: Vec::new(),
            alerts: Vec::new(),
            incidents: Vec::new(),
            rejected_resolves: 0,
            events_observed: 0,
        })
    }

    /// Replays `scenario` and checks its `expected_hash`, if any.
    pub fn run(scenario: &Scenario) -> Result<ScenarioReport, SimulationError> {
        let mut runner = Self::new(scenario)?;
        for step in &scenario.steps {
            runner.step(step.at_ms, &step.action)?;
        }
        let report = runner.finish();
        info!(
            hash = %report.hash,
            transitions = report.transitions.len(),
            alerts = report.alerts.len(),
            incidents = report.incidents.len(),
            "Scenario replay complete"
        );

        if let Some(expected) = &scenario.expected_hash {
            validate_hash(expected, &report.hash)?;
        }
        Ok(report)
    }

    pub fn step(&mut self, at_ms: i64, action: &StepAction) -> Result<(), SimulationError> {
        self.clock.set(millis(at_ms));
        debug!(at_ms, ?action, "Scenario step");
        match action {
            StepAction::Observe {
                count,
                spacing_ms,
                synthetic,
                topic,
            } => {
                for i in 0..*count as i64 {
                    let ts = millis(at_ms + i * spacing_ms);
                    self.clock.set(ts);
                    let mut event = self.generator.next_event(ts);
                    if !synthetic {
                        event.origin = EventOrigin::Live;
                    }
                    if let Some(topic) = topic {
                        event.topic = topic.clone();
                    }
                    self.observe(&event);
                }
            }
            StepAction::Tick => {
                let tick = self.monitor.tick_now();
                if let Some(change) = tick.status_change {
                    self.record_transition(change);
                }
            }
            StepAction::Resolve => match self.monitor.resolve_incident() {
                Ok(_) => {
                    self.state_hasher.update(format!("resolve@{at_ms}").as_bytes());
                }
                Err(e) => {
                    warn!(error = %e, "Resolve rejected");
                    self.rejected_resolves += 1;
                }
            },
            StepAction::Reset => {
                self.monitor.reset();
                self.state_hasher.update(format!("reset@{at_ms}").as_bytes());
            }
            StepAction::Reconfigure { patch } => {
                let outcome = self.monitor.reconfigure(patch)?;
                self.generator
                    .set_topic(self.monitor.config().topic_filter.as_deref());
                self.state_hasher
                    .update(format!("reconfigure@{at_ms}:{outcome:?}").as_bytes());
            }
            StepAction::BurstDemo { spacing_ms } => {
                let Some(demo) =
                    BurstDemo::plan(self.monitor.config(), self.monitor.status(), *spacing_ms)
                else {
                    debug!("Burst demo refused while triggered");
                    return Ok(());
                };
                self.record_alert(demo.start_alert());
                let mut injected = 0usize;
                for event in demo.events(&mut self.generator, millis(at_ms)) {
                    // The demo stops as soon as the tripwire fires.
                    if self.monitor.status().is_triggered() {
                        break;
                    }
                    self.clock.set(event.timestamp);
                    self.observe(&event);
                    injected += 1;
                }
                debug!(injected, planned = demo.event_count, "Burst demo replayed");
            }
        }
        Ok(())
    }

    pub fn monitor(&self) -> &BurstWindowMonitor {
        &self.monitor
    }

    pub fn finish(self) -> ScenarioReport {
        ScenarioReport {
            hash: hex::encode(self.state_hasher.finalize().as_bytes()),
            final_snapshot: self.monitor.snapshot(),
            transitions: self.transitions,
            alerts: self.alerts,
            incidents: self.incidents,
            rejected_resolves: self.rejected_resolves,
            events_observed: self.events_observed,
        }
    }

    fn observe(&mut self, event: &ChainEvent) -> ObservationResult {
        let result = self.monitor.observe(event);
        if result.accepted {
            self.events_observed += 1;
        }
        if let Some(change) = result.status_change {
            self.record_transition(change);
        }
        if let Some(alert) = &result.alert {
            self.record_alert(alert.clone());
        }
        if let Some(incident) = &result.new_incident {
            self.state_hasher.update(
                format!(
                    "incident@{}:{}",
                    incident.detected_at.timestamp_millis(),
                    incident.event_count_at_detection
                )
                .as_bytes(),
            );
            self.incidents.push(incident.clone());
        }
        result
    }

    fn record_transition(&mut self, change: StatusChange) {
        self.state_hasher.update(
            format!("{}->{}@{}", change.from, change.to, change.at.timestamp_millis()).as_bytes(),
        );
        self.transitions.push(change);
    }

    fn record_alert(&mut self, alert: Alert) {
        self.state_hasher.update(alert.to_string().as_bytes());
        self.alerts.push(alert);
    }
}

/// Case-insensitive hex comparison.
pub fn validate_hash(expected: &str, actual: &str) -> Result<(), SimulationError> {
    if expected.trim().eq_ignore_ascii_case(actual) {
        Ok(())
    } else {
        Err(SimulationError::HashMismatch {
            expected: expected.trim().to_string(),
            actual: actual.to_string(),
        })
    }
}

/// Milliseconds covered by a scenario, for reporting.
pub fn scenario_span(scenario: &Scenario) -> TimeDelta {
    let last = scenario.steps.iter().map(|s| s.at_ms).max().unwrap_or(0);
    TimeDelta::milliseconds(last)
}

#[cfg(test)]
mod tests {
    use super::*;
    use argus_core::alert::{AlertLevel, CHANNEL_DEMO};
    use argus_detection::Status;

    const REFERENCE: &str = r#"
config:
  enabled: true
  target_identifier: "0x68b3465833fb72A70ecDF485E0e4C7bD8665Fc45"
  burst_threshold: 8
  window_seconds: 12
steps:
  - at_ms: 0
    action: observe
    count: 8
    spacing_ms: 1000
  - at_ms: 9000
    action: observe
  - at_ms: 20000
    action: tick
"#;

    #[test]
    fn reference_burst_replays() {
        let scenario = Scenario::from_yaml(REFERENCE).unwrap();
        let report = ScenarioRunner::run(&scenario).unwrap();

        assert_eq!(report.events_observed, 9);
        assert_eq!(report.incidents.len(), 1);
        assert_eq!(report.incidents[0].event_count_at_detection, 8);
        let criticals = report
            .alerts
            .iter()
            .filter(|a| a.level == AlertLevel::Critical)
            .count();
        assert_eq!(criticals, 1);
        assert_eq!(
            report.transitions.iter().map(|c| c.to).collect::<Vec<_>>(),
            vec![Status::Monitoring, Status::Triggered]
        );
        assert_eq!(report.final_snapshot.status, Status::Triggered);
    }

    #[test]
    fn replay_is_deterministic() {
        let scenario = Scenario::from_yaml(REFERENCE).unwrap();
        let a = ScenarioRunner::run(&scenario).unwrap();
        let b = ScenarioRunner::run(&scenario).unwrap();
        assert_eq!(a.hash, b.hash);
        assert_eq!(a.hash.len(), 64);
    }

    #[test]
    fn expected_hash_is_enforced() {
        let mut scenario = Scenario::from_yaml(REFERENCE).unwrap();
        let hash = ScenarioRunner::run(&scenario).unwrap().hash;

        scenario.expected_hash = Some(hash.to_uppercase());
        assert!(ScenarioRunner::run(&scenario).is_ok());

        scenario.expected_hash = Some("00".repeat(32));
        assert!(matches!(
            ScenarioRunner::run(&scenario),
            Err(SimulationError::HashMismatch { .. })
        ));
    }

    #[test]
    fn resolve_outside_trigger_is_counted() {
        let yaml = r#"
config:
  enabled: true
  target_identifier: "0x68b3465833fb72A70ecDF485E0e4C7bD8665Fc45"
steps:
  - at_ms: 0
    action: resolve
"#;
        let report = ScenarioRunner::run(&Scenario::from_yaml(yaml).unwrap()).unwrap();
        assert_eq!(report.rejected_resolves, 1);
        assert_eq!(report.final_snapshot.status, Status::Safe);
    }

    #[test]
    fn burst_demo_triggers_then_refuses() {
        let yaml = r#"
config:
  enabled: true
  target_identifier: "0x68b3465833fb72A70ecDF485E0e4C7bD8665Fc45"
  burst_threshold: 8
  window_seconds: 12
steps:
  - at_ms: 0
    action: burst_demo
  - at_ms: 5000
    action: burst_demo
"#;
        let report = ScenarioRunner::run(&Scenario::from_yaml(yaml).unwrap()).unwrap();
        // Nine planned, the eighth trips the wire.
        assert_eq!(report.events_observed, 8);
        assert_eq!(report.incidents.len(), 1);
        assert_eq!(report.incidents[0].event_count_at_detection, 8);
        assert_eq!(report.final_snapshot.status, Status::Triggered);
        let starts = report
            .alerts
            .iter()
            .filter(|a| a.level == AlertLevel::Info && a.channel == CHANNEL_DEMO)
            .count();
        assert_eq!(starts, 1);
        assert!(report.alerts.iter().any(|a| a.message.starts_with("[Demo] Tripwire")));
    }

    #[test]
    fn filtered_topic_is_not_counted() {
        let yaml = format!(
            r#"
config:
  enabled: true
  target_identifier: "0x68b3465833fb72A70ecDF485E0e4C7bD8665Fc45"
  topic_filter: "0x{}"
steps:
  - at_ms: 0
    action: observe
    count: 3
    topic: "0x1234"
  - at_ms: 100
    action: observe
"#,
            "ab".repeat(32)
        );
        let report = ScenarioRunner::run(&Scenario::from_yaml(&yaml).unwrap()).unwrap();
        assert_eq!(report.events_observed, 1);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let yaml = "config:\n  enabled: true\n  target_identifier: nope\n";
        assert!(matches!(
            ScenarioRunner::new(&Scenario::from_yaml(yaml).unwrap()),
            Err(SimulationError::Detection(_))
        ));
    }

    #[test]
    fn span_is_last_step() {
        let scenario = Scenario::from_yaml(REFERENCE).unwrap();
        assert_eq!(scenario_span(&scenario), TimeDelta::seconds(20));
    }

    #[test]
    fn bundled_scenarios_replay() {
        let dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../scenarios");

        let report =
            ScenarioRunner::run(&Scenario::load(dir.join("reference_burst.yaml")).unwrap()).unwrap();
        assert_eq!(report.incidents.len(), 2);
        assert_eq!(report.rejected_resolves, 0);
        assert_eq!(report.final_snapshot.status, Status::Triggered);

        let report =
            ScenarioRunner::run(&Scenario::load(dir.join("topic_filter.yaml")).unwrap()).unwrap();
        assert_eq!(report.events_observed, 3);
        assert_eq!(report.final_snapshot.status, Status::Monitoring);
    }
}
