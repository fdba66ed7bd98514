//! Upstream subscription with reconnect.
//!
//! A `Connector` opens a subscription; `ReconnectingSource` keeps one open,
//! backing off between failed attempts and reporting connection changes as
//! rate-limited alerts. Transport errors never reach the monitor.
//!
//! `SyntheticConnector` is the built-in transport used by `run_monitor_mode`.
//! External transports implement `Connector` and plug into the same loop.

use std::sync::Arc;
use std::time::Duration;

use argus_config::StreamConfig;
use argus_core::address::shorten_address;
use argus_core::alert::{Alert, CHANNEL_REACTIVITY};
use argus_core::events::ChainEvent;
use argus_core::time::Clock;
use argus_simulator::DemoGenerator;
use argus_telemetry::AlertSink;
use async_trait::async_trait;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::engine::backoff::{ConnectionAlertGate, ReconnectBackoff};
use crate::engine::error::EngineError;
use crate::engine::source::{EventSource, SyntheticSource};

#[async_trait]
pub trait Connector: Send {
    /// Opens a fresh subscription.
    async fn connect(&mut self) -> Result<Box<dyn EventSource>, EngineError>;

    /// The watched contract, for alert messages.
    fn target(&self) -> &str;
}

/// Opens synthetic subscriptions; each connection gets its own generator seed.
pub struct SyntheticConnector {
    target: String,
    topic_filter: Option<String>,
    seed: u64,
    clock: Arc<dyn Clock>,
    interval: Duration,
    connections: u64,
}

impl SyntheticConnector {
    pub fn new(
        target: impl Into<String>,
        topic_filter: Option<String>,
        seed: u64,
        clock: Arc<dyn Clock>,
        interval: Duration,
    ) -> Self {
        Self {
            target: target.into(),
            topic_filter,
            seed,
            clock,
            interval,
            connections: 0,
        }
    }

    pub fn connections(&self) -> u64 {
        self.connections
    }
}

#[async_trait]
impl Connector for SyntheticConnector {
    async fn connect(&mut self) -> Result<Box<dyn EventSource>, EngineError> {
        let generator = DemoGenerator::new(
            self.seed.wrapping_add(self.connections),
            self.topic_filter.as_deref(),
        );
        self.connections += 1;
        Ok(Box::new(SyntheticSource::new(
            generator,
            self.clock.clone(),
            self.interval,
        )))
    }

    fn target(&self) -> &str {
        &self.target
    }
}

pub struct ReconnectingSource<C: Connector> {
    connector: C,
    current: Option<Box<dyn EventSource>>,
    backoff: ReconnectBackoff,
    gate: ConnectionAlertGate,
    clock: Arc<dyn Clock>,
    alerts: Arc<dyn AlertSink>,
}

impl<C: Connector> ReconnectingSource<C> {
    pub fn new(
        connector: C,
        config: &StreamConfig,
        clock: Arc<dyn Clock>,
        alerts: Arc<dyn AlertSink>,
    ) -> Self {
        Self {
            connector,
            current: None,
            backoff: ReconnectBackoff::from_config(config),
            gate: ConnectionAlertGate::from_config(config),
            clock,
            alerts,
        }
    }

    pub fn with_backoff(mut self, backoff: ReconnectBackoff) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn is_connected(&self) -> bool {
        self.current.is_some()
    }

    fn connection_alert(&mut self, alert: Alert) {
        if self.gate.allow(self.clock.now()) {
            self.alerts.deliver(&alert);
        }
    }

    async fn schedule_reconnect(&mut self, reason: &str) {
        self.current = None;
        let delay = self.backoff.next_delay();
        warn!(
            reason,
            attempt = self.backoff.attempts(),
            delay_ms = delay.as_millis() as u64,
            "Stream interrupted"
        );
        self.connection_alert(Alert::warning(
            format!(
                "Stream interrupted: {reason}. Reconnecting in {}s.",
                delay.as_secs_f64().round() as u64
            ),
            CHANNEL_REACTIVITY,
        ));
        sleep(delay).await;
    }
}

#[async_trait]
impl<C: Connector> EventSource for ReconnectingSource<C> {
    async fn next_event(&mut self) -> Result<Option<ChainEvent>, EngineError> {
        loop {
            if self.current.is_none() {
                match self.connector.connect().await {
                    Ok(subscription) => {
                        self.current = Some(subscription);
                        self.backoff.reset();
                        info!(contract = %self.connector.target(), "Subscription live");
                        let message = format!(
                            "Subscription live for {}.",
                            shorten_address(self.connector.target())
                        );
                        self.connection_alert(Alert::info(message, CHANNEL_REACTIVITY));
                    }
                    Err(e) => self.schedule_reconnect(&e.to_string()).await,
                }
                continue;
            }

            let Some(subscription) = self.current.as_mut() else {
                continue;
            };
            match subscription.next_event().await {
                Ok(Some(event)) => return Ok(Some(event)),
                Ok(None) => return Ok(None),
                Err(e) => self.schedule_reconnect(&e.to_string()).await,
            }
        }
    }

    fn describe(&self) -> String {
        format!("subscription for {}", self.connector.target())
    }
}
