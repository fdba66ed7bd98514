//! ## argus-core::events
//! **Contract events as seen by the monitor, and the queue that carries them**
//!
//! ### Key Submodules:
//! - `bus/`: bounded multi-producer queue between event sources and the engine
//!
//! Events are transient: the monitor keeps only their timestamps in its window
//! and a bounded log entry per event.

pub mod bus;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use bus::{EventBus, EventError};

/// Where an event came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventOrigin {
    /// Delivered by the upstream subscription.
    Live,
    /// Injected by the demo generator.
    Synthetic,
}

impl fmt::Display for EventOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventOrigin::Live => f.write_str("live"),
            EventOrigin::Synthetic => f.write_str("demo"),
        }
    }
}

/// A single contract log occurrence.
///
/// Payload fields are kept as delivered; malformed addresses or topics are
/// tolerated and displayed as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainEvent {
    /// Detection time; the monitor treats it as "now" for this observation.
    pub timestamp: DateTime<Utc>,

    /// Emitting wallet or contract.
    pub source_address: String,

    /// topic0 of the log.
    pub topic: String,

    /// Leading part of the data field.
    pub payload_preview: String,

    pub origin: EventOrigin,
}

impl ChainEvent {
    #[inline]
    pub fn new(
        timestamp: DateTime<Utc>,
        source_address: impl Into<String>,
        topic: impl Into<String>,
        payload_preview: impl Into<String>,
        origin: EventOrigin,
    ) -> Self {
        Self {
            timestamp,
            source_address: source_address.into(),
            topic: topic.into(),
            payload_preview: payload_preview.into(),
            origin,
        }
    }

    /// An event carrying only a timestamp, for tests and replay.
    pub fn bare(timestamp: DateTime<Utc>, origin: EventOrigin) -> Self {
        Self::new(timestamp, "", "0x", "0x", origin)
    }

    #[inline]
    pub fn is_synthetic(&self) -> bool {
        self.origin == EventOrigin::Synthetic
    }
}
