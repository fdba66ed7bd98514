//! # Argus Detection Engine
//!
//! Rate-based tripwire over a rolling window of contract events: burst
//! classification, sticky incident status, debounced alerts and the bounded
//! history shown to operators.

pub mod classify;
pub mod error;
pub mod history;
pub mod incident;
pub mod monitor;
pub mod window;

pub use classify::{BurstLevel, Status};
pub use error::DetectionError;
pub use history::{BoundedLog, LogEntry, MetricPoint, MetricsSeries, Trend};
pub use incident::{AlertDebounce, IncidentRecord};
pub use monitor::{
    BurstWindowMonitor, MonitorSnapshot, ObservationResult, ReconfigureOutcome, SharedMonitor,
    StatusChange, TickResult,
};
pub use window::EventWindow;
