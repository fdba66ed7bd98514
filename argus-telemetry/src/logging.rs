//! ## argus-telemetry::logging
//! **Structured logging with tracing and OpenTelemetry attributes**
//!
//! `EventLogger::init` installs the global subscriber once per process.
//! The filter comes from `RUST_LOG` when set, otherwise from the level passed
//! in (usually the CLI `--log-level`).

use opentelemetry::KeyValue;
use tracing::{info_span, Instrument};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Clone)]
pub struct EventLogger;

impl EventLogger {
    /// Installs the global subscriber. Panics if one is already set.
    pub fn init(default_level: &str) {
        fmt()
            .with_env_filter(Self::filter(default_level))
            .with_thread_names(true)
            .with_span_events(FmtSpan::ENTER)
            .init()
    }

    /// Like `init`, but returns false instead of panicking when a subscriber exists.
    pub fn try_init(default_level: &str) -> bool {
        fmt()
            .with_env_filter(Self::filter(default_level))
            .with_thread_names(true)
            .try_init()
            .is_ok()
    }

    fn filter(default_level: &str) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
    }

    #[inline]
    pub async fn log_event(event_type: &str, metadata: Vec<KeyValue>) {
        let span = info_span!(
            "monitor_event",
            event_type = event_type,
            otel.kind = "INTERNAL"
        );

        async {
            tracing::info!(
                metadata = ?metadata,
                "Monitor event recorded"
            );
        }
        .instrument(span)
        .await
    }
}
