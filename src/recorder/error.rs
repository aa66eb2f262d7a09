//! Tracker errors
//!
//! Shared error type for frame sources, pose estimators and the tracker actor.

use thiserror::Error;

/// Errors that can occur while sampling or recording
#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Unknown landmark: {0}")]
    UnknownLandmark(String),

    #[error("Invalid frame: {0}")]
    InvalidFrame(String),

    #[error("Estimation failed: {0}")]
    EstimationFailed(String),

    #[error("Tracker stopped")]
    TrackerStopped,

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Result type for tracker operations
pub type TrackerResult<T> = Result<T, TrackerError>;
