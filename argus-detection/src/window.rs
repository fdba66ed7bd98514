//! Rolling window of event timestamps.
//!
//! Arrival order is kept. While arrivals are non-decreasing, pruning is a
//! prefix trim; once an out-of-order timestamp has been appended, pruning
//! falls back to testing every element against the cutoff.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct EventWindow {
    timestamps: VecDeque<DateTime<Utc>>,
    ordered: bool,
}

impl Default for EventWindow {
    fn default() -> Self {
        Self::new()
    }
}

impl EventWindow {
    pub fn new() -> Self {
        Self {
            timestamps: VecDeque::new(),
            ordered: true,
        }
    }

    /// Appends a timestamp in arrival order.
    pub fn record(&mut self, timestamp: DateTime<Utc>) {
        if self.timestamps.back().is_some_and(|last| timestamp < *last) {
            self.ordered = false;
        }
        self.timestamps.push_back(timestamp);
    }

    /// Drops every timestamp older than `cutoff` and returns the remaining count.
    pub fn prune(&mut self, cutoff: DateTime<Utc>) -> usize {
        if self.ordered {
            while self.timestamps.front().is_some_and(|ts| *ts < cutoff) {
                self.timestamps.pop_front();
            }
        } else {
            self.timestamps.retain(|ts| *ts >= cutoff);
            self.ordered = self
                .timestamps
                .iter()
                .zip(self.timestamps.iter().skip(1))
                .all(|(a, b)| a <= b);
        }
        self.timestamps.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn oldest(&self) -> Option<DateTime<Utc>> {
        self.timestamps.iter().min().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DateTime<Utc>> {
        self.timestamps.iter()
    }

    pub fn clear(&mut self) {
        self.timestamps.clear();
        self.ordered = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argus_core::time::millis;
    use proptest::prelude::*;

    #[test]
    fn prefix_trim() {
        let mut window = EventWindow::new();
        for t in [0, 1000, 2000, 3000] {
            window.record(millis(t));
        }
        assert_eq!(window.prune(millis(2000)), 2);
        assert_eq!(window.oldest(), Some(millis(2000)));
    }

    #[test]
    fn cutoff_is_inclusive() {
        let mut window = EventWindow::new();
        window.record(millis(5000));
        assert_eq!(window.prune(millis(5000)), 1);
        assert_eq!(window.prune(millis(5001)), 0);
    }

    #[test]
    fn out_of_order_arrivals_are_pruned_individually() {
        let mut window = EventWindow::new();
        window.record(millis(10_000));
        window.record(millis(1_000));
        window.record(millis(11_000));
        // A prefix trim would stop at the first entry and keep the stale one.
        assert_eq!(window.prune(millis(5_000)), 2);
        assert!(window.iter().all(|ts| *ts >= millis(5_000)));

        window.record(millis(12_000));
        assert_eq!(window.prune(millis(10_500)), 2);
    }

    #[test]
    fn clear_resets_ordering() {
        let mut window = EventWindow::new();
        window.record(millis(2));
        window.record(millis(1));
        window.clear();
        assert!(window.is_empty());
        window.record(millis(3));
        assert_eq!(window.prune(millis(0)), 1);
    }

    proptest! {
        #[test]
        fn never_keeps_entries_older_than_cutoff(
            stamps in proptest::collection::vec(0i64..100_000, 1..200),
            cutoff in 0i64..100_000,
        ) {
            let mut window = EventWindow::new();
            for s in &stamps {
                window.record(millis(*s));
            }
            let count = window.prune(millis(cutoff));
            let expected = stamps.iter().filter(|s| **s >= cutoff).count();
            prop_assert_eq!(count, expected);
            prop_assert!(window.iter().all(|ts| *ts >= millis(cutoff)));
        }
    }
}
