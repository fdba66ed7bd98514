//! Bounded event bus between event sources and the monitor engine.
//!
//! Multiple producers (live subscription, demo generator) push concurrently;
//! the engine is the single consumer. Backed by crossbeam's segmented queue,
//! with an explicit capacity for backpressure signaling and a close flag for
//! shutdown.

use std::sync::atomic::{AtomicBool, Ordering};

use crossbeam::queue::SegQueue;
use thiserror::Error;
use tracing::error;

use super::ChainEvent;

/// Event bus error conditions.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum EventError {
    #[error("Event queue capacity exceeded")]
    QueueFull,
    #[error("Event bus is closed")]
    Closed,
}

pub struct EventBus {
    queue: SegQueue<ChainEvent>,
    capacity: usize,
    closed: AtomicBool,
}

impl EventBus {
    /// Create new event bus with fixed capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            queue: SegQueue::new(),
            capacity,
            closed: AtomicBool::new(false),
        }
    }

    /// Enqueue an event, failing when the bus is full or closed.
    pub fn send(&self, event: ChainEvent) -> Result<(), EventError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(EventError::Closed);
        }
        if self.queue.len() >= self.capacity {
            return Err(EventError::QueueFull);
        }
        self.queue.push(event);
        Ok(())
    }

    /// Send event to event bus, yields while the queue is full.
    pub fn send_blocking(&self, event: ChainEvent) -> Result<(), EventError> {
        loop {
            match self.send(event.clone()) {
                Ok(()) => return Ok(()),
                Err(EventError::QueueFull) => std::thread::yield_now(),
                Err(e) => {
                    error!("Unexpected error during blocking push: {e}");
                    return Err(e);
                }
            }
        }
    }

    /// Dequeue the oldest event, `None` when empty.
    pub fn recv(&self) -> Option<ChainEvent> {
        self.queue.pop()
    }

    /// Stop accepting events. Queued events can still be drained.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Closed and fully drained.
    pub fn is_finished(&self) -> bool {
        self.is_closed() && self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
