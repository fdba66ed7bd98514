/*!
# Runtime Entry Points

Frontends (the CLI today) drive Argus through these functions: a live
monitoring session against an event source, and deterministic scenario replay.
*/

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, instrument, warn};

use argus_config::ArgusConfig;
use argus_core::alert::AlertLevel;
use argus_core::time::{Clock, SystemClock};
use argus_detection::MonitorSnapshot;
use argus_simulator::{Scenario, ScenarioReport, ScenarioRunner, SimulationError};
use argus_telemetry::{AlertFeed, AlertSink, FeedEntry, TracingAlertSink};

use crate::engine::{
    DiagnosticsCollector, EngineError, MonitorRuntime, ReconnectingSource, SyntheticConnector,
};

#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Stop after this long; `None` runs until Ctrl-C.
    pub duration: Option<Duration>,
    /// Inject one burst demo right after start.
    pub burst_demo: bool,
    /// Spacing of the background synthetic traffic.
    pub event_interval: Duration,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            duration: None,
            burst_demo: false,
            event_interval: Duration::from_millis(1500),
        }
    }
}

#[derive(Debug)]
pub struct RunSummary {
    pub snapshot: MonitorSnapshot,
    pub alerts: Vec<FeedEntry>,
    pub processed: u64,
    pub metrics: String,
}

/// Runs a monitoring session against synthetic traffic.
#[instrument(level = "info", name = "run_monitor_mode", skip(config))]
pub async fn run_monitor_mode(
    config: ArgusConfig,
    options: RunOptions,
) -> Result<RunSummary, EngineError> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let runtime = Arc::new(MonitorRuntime::new(&config, clock.clone())?);

    let min_level = config
        .alerts
        .min_level
        .parse::<AlertLevel>()
        .unwrap_or(AlertLevel::Info);
    let feed = Arc::new(AlertFeed::new(
        config.alerts.feed_capacity,
        min_level,
        clock.clone(),
    ));
    runtime.add_sink(Arc::new(TracingAlertSink));
    runtime.add_sink(feed.clone());

    let tasks = runtime.start();
    let connector = SyntheticConnector::new(
        config.monitoring.target_identifier.clone(),
        config.monitoring.topic_filter.clone(),
        config.demo.seed.wrapping_add(1),
        clock.clone(),
        options.event_interval,
    );
    let alerts: Arc<dyn AlertSink> = runtime.clone();
    let source =
        runtime.spawn_source(ReconnectingSource::new(connector, &config.stream, clock, alerts));

    if options.burst_demo && runtime.start_burst_demo().is_none() {
        warn!("Burst demo refused");
    }

    match options.duration {
        Some(duration) => tokio::time::sleep(duration).await,
        None => {
            info!("Monitoring until Ctrl-C");
            tokio::signal::ctrl_c().await?;
        }
    }

    runtime.shutdown();
    match source.await? {
        Ok(forwarded) => info!(forwarded, "Source finished"),
        Err(e) => error!(error = %e, "Source finished with error"),
    }
    let processed = tasks.join().await?;

    Ok(RunSummary {
        snapshot: runtime.snapshot(),
        alerts: feed.entries(),
        processed,
        metrics: runtime.metrics.gather_metrics()?,
    })
}

/// Replays a scenario file. `expected_hash` overrides the one in the file.
/// A mismatch writes a bug report under `report_dir` before failing.
#[instrument(level = "info", name = "run_simulation_mode")]
pub fn run_simulation_mode(
    scenario_path: &Path,
    expected_hash: Option<String>,
    report_dir: Option<PathBuf>,
) -> Result<ScenarioReport, EngineError> {
    let mut scenario = Scenario::load(scenario_path)?;
    if expected_hash.is_some() {
        scenario.expected_hash = expected_hash;
    }

    let mut diagnostics = DiagnosticsCollector::new(report_dir.unwrap_or_else(|| "reports".into()));
    match ScenarioRunner::run(&scenario) {
        Ok(report) => {
            diagnostics.record_scenario_hash(scenario_path, &report.hash);
            info!(hash = %report.hash, "Scenario validation successful");
            Ok(report)
        }
        Err(SimulationError::HashMismatch { expected, actual }) => {
            error!("Hash mismatch! Expected: {expected}");
            match diagnostics.record_bug_report(scenario_path, &expected, &actual) {
                Ok(path) => error!("Bug report saved to: {}", path.display()),
                Err(e) => warn!(error = %e, "Could not write bug report"),
            }
            Err(SimulationError::HashMismatch { expected, actual }.into())
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argus_config::MonitoringConfig;
    use argus_detection::Status;

    const SCENARIO: &str = r#"
config:
  enabled: true
  target_identifier: "0x68b3465833fb72A70ecDF485E0e4C7bD8665Fc45"
steps:
  - at_ms: 0
    action: observe
    count: 8
    spacing_ms: 500
"#;

    #[test]
    fn simulation_mode_reports_mismatch() {
        let dir = std::env::temp_dir().join("argus-engine-simulation-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("burst.yaml");
        std::fs::write(&path, SCENARIO).unwrap();

        let report = run_simulation_mode(&path, None, Some(dir.join("reports"))).unwrap();
        assert_eq!(report.final_snapshot.status, Status::Triggered);

        let again = run_simulation_mode(&path, Some(report.hash.clone()), None).unwrap();
        assert_eq!(again.hash, report.hash);

        let err = run_simulation_mode(&path, Some("00".repeat(32)), Some(dir.join("reports")))
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Simulation(SimulationError::HashMismatch { .. })
        ));
        assert!(std::fs::read_dir(dir.join("reports")).unwrap().count() >= 1);
    }

    #[tokio::test]
    async fn monitor_mode_runs_burst_demo() {
        let mut config = ArgusConfig {
            monitoring: MonitoringConfig {
                enabled: true,
                target_identifier: "0x68b3465833fb72A70ecDF485E0e4C7bD8665Fc45".into(),
                topic_filter: None,
                burst_threshold: 4,
                window_seconds: 12,
            },
            ..Default::default()
        };
        config.engine.tick_interval_ms = 100;
        config.demo.burst_spacing_ms = 5;

        let summary = run_monitor_mode(
            config,
            RunOptions {
                duration: Some(Duration::from_millis(400)),
                burst_demo: true,
                event_interval: Duration::from_secs(60),
            },
        )
        .await
        .unwrap();

        assert_eq!(summary.snapshot.status, Status::Triggered);
        // Five planned; the fourth trips the wire and ends the demo.
        assert_eq!(summary.snapshot.window_count, 4);
        assert!(summary.metrics.contains("argus_events_observed_total 4"));
        assert!(summary
            .alerts
            .iter()
            .any(|e| e.alert.message == "Subscription live for 0x68b3...Fc45."));
        assert!(summary
            .alerts
            .iter()
            .any(|e| e.alert.level == AlertLevel::Critical));
        assert!(summary.metrics.contains("argus_incidents_total 1"));
    }
}
