//! Bounded, display-oriented history kept next to the window.
//!
//! - `BoundedLog`: most-recent-first event log (25 entries)
//! - `MetricsSeries`: per-tick window counts for trend display (45 points)
//!
//! Neither is used for classification.

use std::collections::VecDeque;

use argus_core::events::EventOrigin;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::classify::BurstLevel;

pub const EVENT_LOG_CAPACITY: usize = 25;
pub const METRICS_CAPACITY: usize = 45;

/// One observed event, tagged with the level it was classified at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub source_address: String,
    pub topic: String,
    pub payload_preview: String,
    pub origin: EventOrigin,
    pub level: BurstLevel,
}

/// Fixed-capacity list, newest first. Pushing past capacity evicts the oldest entry.
#[derive(Debug, Clone)]
pub struct BoundedLog<T> {
    entries: VecDeque<T>,
    capacity: usize,
}

impl<T> BoundedLog<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, entry: T) {
        self.entries.push_front(entry);
        self.entries.truncate(self.capacity);
    }

    /// Newest first.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&T> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<T: Clone> BoundedLog<T> {
    pub fn to_vec(&self) -> Vec<T> {
        self.entries.iter().cloned().collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricPoint {
    pub timestamp: DateTime<Utc>,
    pub count: usize,
}

/// Window counts sampled on every tick, oldest first.
#[derive(Debug, Clone)]
pub struct MetricsSeries {
    points: VecDeque<MetricPoint>,
    capacity: usize,
}

impl Default for MetricsSeries {
    fn default() -> Self {
        Self::with_capacity(METRICS_CAPACITY)
    }
}

impl MetricsSeries {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, point: MetricPoint) {
        self.points.push_back(point);
        while self.points.len() > self.capacity {
            self.points.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// Oldest first.
    pub fn points(&self) -> Vec<MetricPoint> {
        self.points.iter().copied().collect()
    }

    /// Movement between the last two samples, relative to the burst threshold.
    pub fn trend(&self, burst_threshold: u32) -> Trend {
        let mut newest = self.points.iter().rev();
        let current = newest.next().map_or(0, |p| p.count);
        let previous = newest.next().map_or(0, |p| p.count);
        Trend::new(current, previous, burst_threshold)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Trend {
    pub current: usize,
    pub previous: usize,
    pub change: i64,
    /// 0 when there is no previous activity.
    pub change_percent: f64,
    /// Current count as a percentage of the burst threshold.
    pub threshold_usage: f64,
}

impl Trend {
    fn new(current: usize, previous: usize, burst_threshold: u32) -> Self {
        let change = current as i64 - previous as i64;
        let change_percent = if previous > 0 {
            change as f64 / previous as f64 * 100.0
        } else {
            0.0
        };
        let threshold_usage = if burst_threshold > 0 {
            current as f64 / burst_threshold as f64 * 100.0
        } else {
            0.0
        };
        Self {
            current,
            previous,
            change,
            change_percent,
            threshold_usage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argus_core::time::millis;

    #[test]
    fn log_is_newest_first_and_bounded() {
        let mut log = BoundedLog::with_capacity(EVENT_LOG_CAPACITY);
        for i in 0..40 {
            log.push(i);
        }
        assert_eq!(log.len(), EVENT_LOG_CAPACITY);
        assert_eq!(log.latest(), Some(&39));
        // Oldest retained is 39 - 24.
        assert_eq!(log.iter().last(), Some(&15));
    }

    #[test]
    fn series_evicts_oldest() {
        let mut series = MetricsSeries::default();
        for i in 0..50 {
            series.push(MetricPoint {
                timestamp: millis(i * 1000),
                count: i as usize,
            });
        }
        let points = series.points();
        assert_eq!(points.len(), METRICS_CAPACITY);
        assert_eq!(points[0].count, 5);
        assert_eq!(points[METRICS_CAPACITY - 1].count, 49);
    }

    #[test]
    fn trend_math() {
        let mut series = MetricsSeries::default();
        assert_eq!(series.trend(8).current, 0);

        series.push(MetricPoint { timestamp: millis(0), count: 4 });
        series.push(MetricPoint { timestamp: millis(1000), count: 6 });
        let trend = series.trend(8);
        assert_eq!(trend.change, 2);
        assert!((trend.change_percent - 50.0).abs() < f64::EPSILON);
        assert!((trend.threshold_usage - 75.0).abs() < f64::EPSILON);

        series.push(MetricPoint { timestamp: millis(2000), count: 0 });
        series.push(MetricPoint { timestamp: millis(3000), count: 3 });
        assert_eq!(series.trend(8).change_percent, 0.0);
    }
}
