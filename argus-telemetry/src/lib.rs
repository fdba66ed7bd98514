//! # Argus Telemetry
//!
//! Crate for logging, metrics, and alert delivery.

pub mod alerts;
pub mod logging;
pub mod metrics;

pub use alerts::{AlertFeed, AlertSink, FeedEntry, TracingAlertSink};
pub use logging::EventLogger;
pub use metrics::MetricsRecorder;
