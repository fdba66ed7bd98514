use std::path::PathBuf;

use argus_detection::DetectionError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("Scenario file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Scenario parse error: {0}")]
    Scenario(#[from] serde_yaml::Error),

    #[error(transparent)]
    Detection(#[from] DetectionError),

    #[error("State hash mismatch: expected {expected}, got {actual}")]
    HashMismatch { expected: String, actual: String },
}
