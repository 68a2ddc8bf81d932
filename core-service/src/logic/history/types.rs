use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::logic::model::{PerformanceCategory, PredictionMethod};

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt history row {prediction_id}: {reason}")]
    Corrupt { prediction_id: i64, reason: String },
}

/// One persisted prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredPrediction {
    pub prediction_id: i64,
    pub student_id: i64,
    pub semester: u32,
    pub category: PerformanceCategory,
    pub score: f64,
    pub method: PredictionMethod,
    pub generated_at: DateTime<Utc>,
}

/// Distribution of all stored predictions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSummary {
    pub total_predictions: u64,
    /// Rounded to 2 decimals, 0 when empty
    pub average_score: f64,
    pub good: u64,
    pub average: u64,
    pub at_risk: u64,
}
