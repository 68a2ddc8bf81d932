//! Model error types

use thiserror::Error;

use crate::logic::features::layout::LayoutMismatchError;
use crate::logic::features::ValidationError;

/// `train()` could not complete. The previously loaded model stays in use.
#[derive(Debug, Error)]
pub enum TrainingError {
    #[error("Training dataset is empty")]
    EmptyDataset,

    #[error("Training dataset is missing column '{0}'")]
    MissingColumn(String),

    #[error("Line {line}: {reason}")]
    MalformedRow { line: usize, reason: String },

    #[error("Sample {index}: {source}")]
    InvalidSample {
        index: usize,
        #[source]
        source: ValidationError,
    },

    #[error("Sample {index}: performance_score must be between 0 and 100, got {value}")]
    LabelOutOfRange { index: usize, value: f64 },

    #[error("Model fit failed: {0}")]
    Fit(String),

    #[error("Failed to read training data: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to persist model: {0}")]
    Storage(#[from] StorageError),
}

/// Trained-path scoring failure. Never surfaced: `predict` falls back to rules.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InferenceError {
    #[error("{component} expects {expected} features, model has {actual}")]
    DimensionMismatch {
        component: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Model produced a non-finite score")]
    NonFiniteScore,
}

/// Loading or saving model artifacts
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Artifact not found: {0}")]
    NotFound(String),

    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization Error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    LayoutMismatch(#[from] LayoutMismatchError),

    #[error("Checksum mismatch in {artifact}")]
    ChecksumMismatch { artifact: &'static str },

    #[error("Scaler and regression artifacts come from different training runs ({scaler} vs {regression})")]
    TrainingIdMismatch { scaler: String, regression: String },

    #[error("Invalid {artifact}: {reason}")]
    Invalid { artifact: &'static str, reason: String },
}
