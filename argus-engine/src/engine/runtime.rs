//! Monitor runtime - moves events from sources through the bus into the
//! shared monitor, drives the decay ticker and fans alerts out to sinks.
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use opentelemetry::KeyValue;
use parking_lot::{Mutex, RwLock};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{sleep, MissedTickBehavior};
use tracing::{debug, error, info, instrument, trace};

use argus_config::{ArgusConfig, DemoConfig, MonitoringConfigPatch};
use argus_core::alert::{Alert, CHANNEL_CONFIG, CHANNEL_DEMO, CHANNEL_RECOVERY, CHANNEL_SYSTEM};
use argus_core::events::{ChainEvent, EventBus, EventError};
use argus_core::time::Clock;
use argus_detection::{
    BurstWindowMonitor, IncidentRecord, MonitorSnapshot, ObservationResult, ReconfigureOutcome,
    SharedMonitor, TickResult,
};
use argus_simulator::{BurstDemo, DemoGenerator};
use argus_telemetry::{AlertSink, EventLogger, MetricsRecorder};

use crate::engine::error::EngineError;
use crate::engine::source::EventSource;

const IDLE_BACKOFF: Duration = Duration::from_millis(10);

/// Background tasks started by [`MonitorRuntime::start`].
pub struct RuntimeTasks {
    pub processor: JoinHandle<u64>,
    pub ticker: JoinHandle<u64>,
}

impl RuntimeTasks {
    /// Waits for both tasks; returns the number of processed events.
    pub async fn join(self) -> Result<u64, EngineError> {
        let (processed, ticks) = tokio::join!(self.processor, self.ticker);
        let processed = processed?;
        debug!(ticks = ticks?, processed, "Runtime tasks finished");
        Ok(processed)
    }
}

/// Coordinates one monitoring session.
pub struct MonitorRuntime {
    monitor: SharedMonitor,
    /// Inbound queue shared by all sources (MPSC).
    pub event_bus: Arc<EventBus>,
    pub metrics: Arc<MetricsRecorder>,
    sinks: RwLock<Vec<Arc<dyn AlertSink>>>,
    clock: Arc<dyn Clock>,
    generator: Mutex<DemoGenerator>,
    demo: DemoConfig,
    /// Id of the burst demo allowed to inject; cleared by reset.
    active_demo: Mutex<Option<u64>>,
    demo_seq: AtomicU64,
    tick_interval: Duration,
    snapshot_tx: watch::Sender<MonitorSnapshot>,
    shutdown_tx: watch::Sender<bool>,
}

impl MonitorRuntime {
    pub fn new(config: &ArgusConfig, clock: Arc<dyn Clock>) -> Result<Self, EngineError> {
        info!("Initializing monitor runtime");
        debug!("Engine config: {:?}", config.engine);

        let monitor = BurstWindowMonitor::new(config.monitoring.clone(), clock.clone())?;
        let (snapshot_tx, _) = watch::channel(monitor.snapshot());
        let (shutdown_tx, _) = watch::channel(false);
        let generator = DemoGenerator::new(
            config.demo.seed,
            config.monitoring.topic_filter.as_deref(),
        );

        Ok(Self {
            monitor: SharedMonitor::new(monitor),
            event_bus: Arc::new(EventBus::with_capacity(config.engine.bus_capacity)),
            metrics: Arc::new(MetricsRecorder::new()?),
            sinks: RwLock::new(Vec::new()),
            clock,
            generator: Mutex::new(generator),
            demo: config.demo.clone(),
            active_demo: Mutex::new(None),
            demo_seq: AtomicU64::new(0),
            tick_interval: Duration::from_millis(config.engine.tick_interval_ms),
            snapshot_tx,
            shutdown_tx,
        })
    }

    pub fn add_sink(&self, sink: Arc<dyn AlertSink>) {
        self.sinks.write().push(sink);
    }

    pub fn monitor(&self) -> &SharedMonitor {
        &self.monitor
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Latest snapshot, updated after every observation, tick and command.
    pub fn subscribe(&self) -> watch::Receiver<MonitorSnapshot> {
        self.snapshot_tx.subscribe()
    }

    pub fn snapshot(&self) -> MonitorSnapshot {
        self.snapshot_tx.borrow().clone()
    }

    pub fn is_shutdown(&self) -> bool {
        *self.shutdown_tx.borrow()
    }

    /// Spawns the bus processor and the ticker.
    #[instrument(skip_all)]
    pub fn start(self: &Arc<Self>) -> RuntimeTasks {
        self.dispatch(&Alert::info(
            "Argus initialized. Configure a contract and start monitoring.",
            CHANNEL_SYSTEM,
        ));
        RuntimeTasks {
            processor: self.spawn_processor(),
            ticker: self.spawn_ticker(),
        }
    }

    /// Stops sources and the ticker; the processor drains what is queued, then exits.
    pub fn shutdown(&self) {
        info!("Monitor runtime shutting down");
        self.shutdown_tx.send_replace(true);
        self.event_bus.close();
    }

    /// Pumps `source` into the bus until it ends, fails or the runtime shuts down.
    /// Returns the number of forwarded events.
    pub fn spawn_source<S: EventSource + 'static>(
        self: &Arc<Self>,
        mut source: S,
    ) -> JoinHandle<Result<usize, EngineError>> {
        let this = Arc::clone(self);
        let mut shutdown = self.shutdown_tx.subscribe();
        tokio::spawn(async move {
            let name = source.describe();
            info!(source = %name, "Event source started");
            let mut forwarded = 0usize;
            loop {
                if *shutdown.borrow() {
                    break;
                }
                let next = tokio::select! {
                    _ = shutdown.changed() => break,
                    next = source.next_event() => next,
                };
                match next {
                    Ok(Some(event)) => {
                        this.enqueue(event).await?;
                        forwarded += 1;
                    }
                    Ok(None) => {
                        debug!(source = %name, "Event source exhausted");
                        break;
                    }
                    Err(e) => {
                        error!(source = %name, error = %e, "Event source failed");
                        return Err(e);
                    }
                }
            }
            info!(source = %name, forwarded, "Event source stopped");
            Ok(forwarded)
        })
    }

    /// Injects a burst demo unless one is running or the monitor is triggered.
    ///
    /// The demo stops early once the monitor triggers, on reset and on shutdown.
    /// Returns the number of injected events.
    pub fn start_burst_demo(self: &Arc<Self>) -> Option<JoinHandle<Result<usize, EngineError>>> {
        let spacing_ms = self.demo.burst_spacing_ms;
        let plan = self
            .monitor
            .with(|m| BurstDemo::plan(m.config(), m.status(), spacing_ms))?;
        let id = {
            let mut active = self.active_demo.lock();
            if active.is_some() {
                debug!("Burst demo already running");
                return None;
            }
            let id = self.demo_seq.fetch_add(1, Ordering::Relaxed);
            *active = Some(id);
            id
        };

        self.dispatch(&plan.start_alert());
        let this = Arc::clone(self);
        let spacing = Duration::from_millis(spacing_ms);
        Some(tokio::spawn(async move {
            let mut injected = 0usize;
            for _ in 0..plan.event_count {
                sleep(spacing).await;
                if this.is_shutdown() {
                    break;
                }
                let event = this.generator.lock().next_event(this.clock.now());
                let started = Instant::now();
                let observed = this.monitor.with(|m| {
                    if !this.is_demo_active(id) || m.status().is_triggered() {
                        return None;
                    }
                    let result = m.observe(&event);
                    this.snapshot_tx.send_replace(m.snapshot());
                    Some(result)
                });
                let Some(result) = observed else {
                    break;
                };
                injected += 1;
                MonitorRuntime::deliver(&this, &event, &result, started).await;
            }
            this.finish_demo(id);
            info!(injected, planned = plan.event_count, "Burst demo finished");
            Ok(injected)
        }))
    }

    pub fn is_demo_running(&self) -> bool {
        self.active_demo.lock().is_some()
    }

    fn is_demo_active(&self, id: u64) -> bool {
        *self.active_demo.lock() == Some(id)
    }

    fn finish_demo(&self, id: u64) {
        let mut active = self.active_demo.lock();
        if *active == Some(id) {
            *active = None;
        }
    }

    /// Observes one event and delivers its consequences. The monitor lock is
    /// released before any sink runs.
    pub async fn process_event(&self, event: &ChainEvent) -> ObservationResult {
        let started = Instant::now();
        let result = self.monitor.with(|m| {
            let result = m.observe(event);
            if result.accepted {
                self.snapshot_tx.send_replace(m.snapshot());
            }
            result
        });
        self.deliver(event, &result, started).await;
        result
    }

    async fn deliver(&self, event: &ChainEvent, result: &ObservationResult, started: Instant) {
        if !result.accepted {
            self.metrics.record_filtered();
            return;
        }
        self.metrics.record_observed(result.count, started.elapsed());
        trace!(count = result.count, level = %result.level, "Event processed");

        if let Some(incident) = &result.new_incident {
            self.metrics.record_incident();
            EventLogger::log_event(
                "incident",
                vec![
                    KeyValue::new("contract", incident.target_identifier.clone()),
                    KeyValue::new("count", incident.event_count_at_detection as i64),
                    KeyValue::new("window_seconds", incident.window_seconds as i64),
                    KeyValue::new("origin", event.origin.to_string()),
                ],
            )
            .await;
        }
        if let Some(alert) = &result.alert {
            self.dispatch(alert);
        }
    }

    /// One decay step at the clock's current time.
    pub fn tick(&self) -> TickResult {
        let now = self.clock.now();
        let result = self.monitor.with(|m| {
            let result = m.tick(now);
            self.snapshot_tx.send_replace(m.snapshot());
            result
        });
        self.metrics.set_window_count(result.count);
        if let Some(change) = result.status_change {
            debug!(from = %change.from, to = %change.to, "Status decayed");
        }
        result
    }

    #[instrument(skip(self))]
    pub fn resolve_incident(&self) -> Result<Option<IncidentRecord>, EngineError> {
        let incident = self.monitor.resolve_incident()?;
        self.dispatch(&Alert::success(
            "Incident resolved. Protocol status returned to SAFE.",
            CHANNEL_RECOVERY,
        ));
        self.publish();
        Ok(incident)
    }

    /// Cancels a running burst demo and clears the monitor.
    #[instrument(skip(self))]
    pub fn reset(&self) {
        self.monitor.with(|m| {
            *self.active_demo.lock() = None;
            m.reset();
        });
        self.dispatch(&Alert::info(
            "Demo state reset. Activity log and rolling counters cleared.",
            CHANNEL_DEMO,
        ));
        self.publish();
    }

    #[instrument(skip(self))]
    pub fn reconfigure(
        &self,
        patch: &MonitoringConfigPatch,
    ) -> Result<ReconfigureOutcome, EngineError> {
        let (outcome, topic) = self.monitor.with(|m| {
            m.reconfigure(patch)
                .map(|outcome| (outcome, m.config().topic_filter.clone()))
        })?;
        self.generator.lock().set_topic(topic.as_deref());
        self.dispatch(&Alert::info(
            "Tripwire config updated. Monitoring restarted with the new parameters.",
            CHANNEL_CONFIG,
        ));
        self.publish();
        Ok(outcome)
    }

    /// Fire-and-forget delivery to every sink. Level-aware logging is left
    /// to `TracingAlertSink`.
    pub fn dispatch(&self, alert: &Alert) {
        self.metrics.record_alert(alert.level);
        debug!(channel = %alert.channel, level = %alert.level, "Alert dispatched: {}", alert.message);
        for sink in self.sinks.read().iter() {
            sink.deliver(alert);
        }
    }

    /// Snapshots and sends under the monitor lock so concurrent publishers
    /// cannot overwrite a newer state with an older one.
    fn publish(&self) {
        self.monitor.with(|m| {
            self.snapshot_tx.send_replace(m.snapshot());
        });
    }

    async fn enqueue(&self, event: ChainEvent) -> Result<(), EngineError> {
        loop {
            match self.event_bus.send(event.clone()) {
                Ok(()) => return Ok(()),
                Err(EventError::QueueFull) => {
                    trace!("Event bus full, yielding");
                    tokio::task::yield_now().await;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn spawn_processor(self: &Arc<Self>) -> JoinHandle<u64> {
        let this = Arc::clone(self);
        tokio::spawn(async move {
            info!("Event processor started");
            let mut processed = 0u64;
            loop {
                match this.event_bus.recv() {
                    Some(event) => {
                        processed += 1;
                        this.process_event(&event).await;
                    }
                    None => {
                        if this.event_bus.is_closed() || this.is_shutdown() {
                            break;
                        }
                        // Queue empty, avoid busy-spin
                        sleep(IDLE_BACKOFF).await;
                    }
                }
            }
            info!(processed, "Event processor stopped");
            processed
        })
    }

    fn spawn_ticker(self: &Arc<Self>) -> JoinHandle<u64> {
        let this = Arc::clone(self);
        let mut shutdown = self.shutdown_tx.subscribe();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(this.tick_interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut ticks = 0u64;
            loop {
                if *shutdown.borrow() {
                    break;
                }
                tokio::select! {
                    _ = shutdown.changed() => break,
                    _ = interval.tick() => {
                        this.tick();
                        ticks += 1;
                    }
                }
            }
            ticks
        })
    }
}

/// Lets sources (e.g. `ReconnectingSource`) raise alerts through the runtime.
impl AlertSink for MonitorRuntime {
    fn deliver(&self, alert: &Alert) {
        self.dispatch(alert);
    }
}
