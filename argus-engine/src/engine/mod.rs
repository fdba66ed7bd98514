mod backoff;
mod diagnostics;
mod error;
mod runtime;
mod source;
mod stream;

pub use self::{
    backoff::{ConnectionAlertGate, ReconnectBackoff},
    diagnostics::DiagnosticsCollector,
    error::EngineError,
    runtime::{MonitorRuntime, RuntimeTasks},
    source::{EventSource, ReplaySource, SyntheticSource},
    stream::{Connector, ReconnectingSource, SyntheticConnector},
};

pub mod prelude {
    pub use super::{EngineError, EventSource, MonitorRuntime, RuntimeTasks};
}
