//! Error types for the gesture estimator

use thiserror::Error;

/// Errors that can occur while constructing or driving the pipeline
#[derive(Debug, Error)]
pub enum MotionError {
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Sensor unavailable: {0}")]
    SensorUnavailable(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Failed to parse sample record: {0}")]
    ParseError(String),
}
