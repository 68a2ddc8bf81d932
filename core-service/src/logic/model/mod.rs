//! Model Module - Prediction Engine
//!
//! Trained linear model with rule-based fallback.
//! Scaling, regression and persistence live in their own files so the
//! engine only decides which path scores a request.

pub mod classifier;
pub mod dataset;
pub mod error;
pub mod inference;
pub mod regression;
pub mod rules;
pub mod scaler;
pub mod storage;
pub mod trained;
pub mod types;

#[cfg(test)]
mod tests;

// Re-export common types
pub use classifier::{classify, PerformanceCategory};
pub use dataset::TrainingSample;
pub use error::{InferenceError, StorageError, TrainingError};
pub use inference::{global, predict_rule_based, PredictionEngine};
pub use storage::ModelStorage;
pub use trained::{ModelMetadata, TrainedModel};
pub use types::{EngineMode, EngineStatus, PredictionMethod, PredictionResult, TrainingReport};
