//! Model load and prediction errors

use std::path::PathBuf;
use thiserror::Error;

/// The artifact could not be turned into a usable classifier.
///
/// Raised once at startup; prediction stays disabled for the rest of the
/// process lifetime.
#[derive(Debug, Error)]
pub enum ModelLoadError {
    #[error("model file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid model manifest {}: {reason}", .path.display())]
    Manifest { path: PathBuf, reason: String },

    #[error("model schema does not match the feature record: {0}")]
    Schema(String),

    #[error("model checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("unsupported or corrupt model format: {0}")]
    Format(String),
}

/// A single prediction call failed. Scoped to that call only.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictionError {
    #[error("model expects column '{0}' which the feature record does not provide")]
    UnknownFeature(String),

    #[error("input shape mismatch: model expects {expected} columns, record has {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("inference failed: {0}")]
    Inference(String),

    #[error("model returned no prediction")]
    EmptyOutput,

    #[error("model returned label {0}, expected 0 or 1")]
    UnexpectedLabel(i64),
}
