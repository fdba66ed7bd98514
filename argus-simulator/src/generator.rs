//! Synthetic event generation for demos and scenarios.

use argus_core::address::truncate_preview;
use argus_core::events::{ChainEvent, EventOrigin};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// ERC-20 `Transfer` selector, zero padded to a full topic word.
pub const TRANSFER_TOPIC: &str =
    "0xddf252ad00000000000000000000000000000000000000000000000000000000";

/// Payload previews are cut to this many characters.
pub const PAYLOAD_PREVIEW_LEN: usize = 18;

/// Seeded source of synthetic `ChainEvent`s. The same seed yields the same
/// addresses and payloads.
#[derive(Debug, Clone)]
pub struct DemoGenerator {
    rng: StdRng,
    topic: String,
}

impl DemoGenerator {
    /// Events carry `topic_filter` when set so they pass the monitor's filter.
    pub fn new(seed: u64, topic_filter: Option<&str>) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            topic: topic_filter.unwrap_or(TRANSFER_TOPIC).to_string(),
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn set_topic(&mut self, topic_filter: Option<&str>) {
        self.topic = topic_filter.unwrap_or(TRANSFER_TOPIC).to_string();
    }

    pub fn next_event(&mut self, timestamp: DateTime<Utc>) -> ChainEvent {
        let mut wallet = [0u8; 20];
        self.rng.fill(&mut wallet[..]);
        let salt: u32 = self.rng.random_range(0..0xfffff);
        let payload = format!("0x{:x}{:05x}", timestamp.timestamp_millis(), salt);

        ChainEvent::new(
            timestamp,
            format!("0x{}", hex::encode(wallet)),
            self.topic.clone(),
            truncate_preview(&payload, PAYLOAD_PREVIEW_LEN),
            EventOrigin::Synthetic,
        )
    }
}
