//! ## argus-telemetry::metrics
//! **Prometheus registry for the monitor runtime**
//!
//! Counters for observed and filtered events, alerts per level and incidents;
//! a gauge for the live window count and a latency histogram for `observe`.

use std::time::Duration;

use argus_core::alert::AlertLevel;
use prometheus::{
    Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
};

#[derive(Debug, Clone)]
pub struct MetricsRecorder {
    pub registry: Registry,
    pub observed_events: IntCounter,
    pub filtered_events: IntCounter,
    pub alerts: IntCounterVec,
    pub incidents: IntCounter,
    pub window_events: IntGauge,
    pub observe_latency: Histogram,
}

impl MetricsRecorder {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();
        let observed_events = IntCounter::new(
            "argus_events_observed_total",
            "Events counted by the burst monitor",
        )?;
        let filtered_events = IntCounter::new(
            "argus_events_filtered_total",
            "Events ignored by the topic filter or a disabled monitor",
        )?;
        let alerts = IntCounterVec::new(
            Opts::new("argus_alerts_total", "Alerts raised, by level"),
            &["level"],
        )?;
        let incidents = IntCounter::new("argus_incidents_total", "Incident records created")?;
        let window_events =
            IntGauge::new("argus_window_events", "Events inside the rolling window")?;
        let observe_latency = Histogram::with_opts(
            HistogramOpts::new("argus_observe_latency_ns", "Monitor observe processing time")
                .buckets(vec![1_000.0, 10_000.0, 100_000.0, 1_000_000.0]),
        )?;

        registry.register(Box::new(observed_events.clone()))?;
        registry.register(Box::new(filtered_events.clone()))?;
        registry.register(Box::new(alerts.clone()))?;
        registry.register(Box::new(incidents.clone()))?;
        registry.register(Box::new(window_events.clone()))?;
        registry.register(Box::new(observe_latency.clone()))?;

        Ok(Self {
            registry,
            observed_events,
            filtered_events,
            alerts,
            incidents,
            window_events,
            observe_latency,
        })
    }

    pub fn gather_metrics(&self) -> Result<String, prometheus::Error> {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let mut buffer = Vec::<u8>::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }

    pub fn record_observed(&self, window_count: usize, elapsed: Duration) {
        self.observed_events.inc();
        self.window_events.set(window_count as i64);
        self.observe_latency.observe(elapsed.as_nanos() as f64);
    }

    pub fn record_filtered(&self) {
        self.filtered_events.inc();
    }

    pub fn record_alert(&self, level: AlertLevel) {
        self.alerts.with_label_values(&[&level.to_string()]).inc();
    }

    pub fn record_incident(&self) {
        self.incidents.inc();
    }

    pub fn set_window_count(&self, window_count: usize) {
        self.window_events.set(window_count as i64);
    }
}
