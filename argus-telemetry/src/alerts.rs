//! ## argus-telemetry::alerts
//! **Alert delivery sinks**
//!
//! Sinks are fire-and-forget: delivery never reports back to the monitor.
//! `AlertFeed` is the in-memory notification list shown to operators,
//! newest first and bounded.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use argus_core::alert::{Alert, AlertLevel};
use argus_core::time::Clock;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

/// Default number of alerts the feed keeps.
pub const FEED_CAPACITY: usize = 120;

pub trait AlertSink: Send + Sync {
    fn deliver(&self, alert: &Alert);
}

/// Writes every alert to the tracing subscriber at a matching level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAlertSink;

impl AlertSink for TracingAlertSink {
    fn deliver(&self, alert: &Alert) {
        match alert.level {
            AlertLevel::Critical => error!(channel = %alert.channel, "{}", alert.message),
            AlertLevel::Warning => warn!(channel = %alert.channel, "{}", alert.message),
            AlertLevel::Info | AlertLevel::Success => {
                info!(channel = %alert.channel, level = %alert.level, "{}", alert.message)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedEntry {
    pub id: u64,
    pub raised_at: DateTime<Utc>,
    #[serde(flatten)]
    pub alert: Alert,
}

#[derive(Debug)]
pub struct AlertFeed {
    entries: Mutex<VecDeque<FeedEntry>>,
    capacity: usize,
    min_level: AlertLevel,
    next_id: AtomicU64,
    clock: Arc<dyn Clock>,
}

impl AlertFeed {
    pub fn new(capacity: usize, min_level: AlertLevel, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
            min_level,
            next_id: AtomicU64::new(1),
            clock,
        }
    }

    /// Newest first.
    pub fn entries(&self) -> Vec<FeedEntry> {
        self.entries.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn latest(&self) -> Option<FeedEntry> {
        self.entries.lock().front().cloned()
    }

    pub fn dismiss(&self, id: u64) -> bool {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|entry| entry.id != id);
        entries.len() != before
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl AlertSink for AlertFeed {
    fn deliver(&self, alert: &Alert) {
        if alert.level < self.min_level {
            return;
        }
        let entry = FeedEntry {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            raised_at: self.clock.now(),
            alert: alert.clone(),
        };
        let mut entries = self.entries.lock();
        entries.push_front(entry);
        entries.truncate(self.capacity);
    }
}

impl<S: AlertSink + ?Sized> AlertSink for Arc<S> {
    fn deliver(&self, alert: &Alert) {
        (**self).deliver(alert)
    }
}
