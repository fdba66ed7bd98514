use thiserror::Error;

use crate::classify::Status;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DetectionError {
    /// Configuration rejected at the monitor boundary.
    #[error("Invalid monitoring configuration:\n{0}")]
    InvalidConfig(String),

    /// `resolve_incident` called while the tripwire is not triggered.
    #[error("No incident to resolve: status is {status}")]
    NotTriggered { status: Status },
}
