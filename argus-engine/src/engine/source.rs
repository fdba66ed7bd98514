//! Event sources feeding the runtime's bus.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use argus_core::events::ChainEvent;
use argus_core::time::Clock;
use argus_simulator::DemoGenerator;
use async_trait::async_trait;
use tokio::time::sleep;

use crate::engine::error::EngineError;

#[async_trait]
pub trait EventSource: Send {
    /// Waits for the next event. `Ok(None)` ends the stream.
    async fn next_event(&mut self) -> Result<Option<ChainEvent>, EngineError>;

    fn describe(&self) -> String {
        "event source".to_string()
    }
}

/// Steady synthetic traffic, one event per `interval`, stamped by the clock.
pub struct SyntheticSource {
    generator: DemoGenerator,
    clock: Arc<dyn Clock>,
    interval: Duration,
    remaining: Option<usize>,
}

impl SyntheticSource {
    pub fn new(generator: DemoGenerator, clock: Arc<dyn Clock>, interval: Duration) -> Self {
        Self {
            generator,
            clock,
            interval,
            remaining: None,
        }
    }

    /// Ends the stream after `count` events.
    pub fn limited(mut self, count: usize) -> Self {
        self.remaining = Some(count);
        self
    }
}

#[async_trait]
impl EventSource for SyntheticSource {
    async fn next_event(&mut self) -> Result<Option<ChainEvent>, EngineError> {
        match self.remaining {
            Some(0) => return Ok(None),
            Some(ref mut n) => *n -= 1,
            None => {}
        }
        sleep(self.interval).await;
        Ok(Some(self.generator.next_event(self.clock.now())))
    }

    fn describe(&self) -> String {
        format!("synthetic every {}ms", self.interval.as_millis())
    }
}

/// Replays a fixed list of events as fast as they are pulled.
#[derive(Debug, Default)]
pub struct ReplaySource {
    events: VecDeque<ChainEvent>,
}

impl ReplaySource {
    pub fn new(events: impl IntoIterator<Item = ChainEvent>) -> Self {
        Self {
            events: events.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.events.len()
    }
}

#[async_trait]
impl EventSource for ReplaySource {
    async fn next_event(&mut self) -> Result<Option<ChainEvent>, EngineError> {
        Ok(self.events.pop_front())
    }

    fn describe(&self) -> String {
        format!("replay of {} events", self.events.len())
    }
}
