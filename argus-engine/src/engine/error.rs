use argus_config::ConfigError;
use argus_core::events::EventError;
use argus_detection::DetectionError;
use argus_simulator::SimulationError;
use thiserror::Error;
use tokio::task::JoinError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Detection(#[from] DetectionError),

    #[error(transparent)]
    Simulation(#[from] SimulationError),

    #[error("Event bus error: {0}")]
    Bus(#[from] EventError),

    #[error("Event source error: {0}")]
    Source(String),

    #[error("Telemetry error: {0}")]
    Telemetry(String),

    #[error("Task failed: {0}")]
    Join(#[from] JoinError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<prometheus::Error> for EngineError {
    fn from(err: prometheus::Error) -> Self {
        EngineError::Telemetry(err.to_string())
    }
}
