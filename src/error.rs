//! Error types for Restwise Core

use thiserror::Error;

/// Errors that can occur while loading a model artifact or computing an estimate
#[derive(Debug, Error)]
pub enum EstimateError {
    #[error("Failed to read model artifact: {0}")]
    ArtifactRead(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Unsupported artifact schema: expected {expected}, got {actual}")]
    SchemaVersion { expected: String, actual: String },

    #[error("Malformed model artifact: {0}")]
    MalformedArtifact(String),

    #[error("Prediction error: {0}")]
    PredictionError(String),

    #[error("Time parse error: {0}")]
    TimeParseError(String),

    #[error("Invalid time of day: {hour:02}:{minute:02}")]
    InvalidTime { hour: u32, minute: u32 },
}
