//! Prediction Types
//!
//! Engine inputs/outputs and status structures. No logic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::logic::features::FeatureVector;
use super::classifier::PerformanceCategory;

/// Which path produced a score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionMethod {
    Trained,
    RuleBased,
}

impl PredictionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PredictionMethod::Trained => "trained",
            PredictionMethod::RuleBased => "rule_based",
        }
    }
}

impl std::fmt::Display for PredictionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PredictionMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "trained" => Ok(PredictionMethod::Trained),
            "rule_based" => Ok(PredictionMethod::RuleBased),
            other => Err(format!("Unknown prediction method: {}", other)),
        }
    }
}

/// Engine output, immutable once produced
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// 0.0 - 100.0, rounded to 2 decimals
    pub score: f64,
    pub category: PerformanceCategory,
    /// Input echo
    pub features: FeatureVector,
    pub method: PredictionMethod,
}

/// Engine state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineMode {
    /// No model: rule-based scoring
    Untrained,
    /// Trained model in use
    Trained,
    /// A trained model failed during scoring and was dropped; rule-based
    /// until the next successful train or reload
    FallingBack,
}

/// Engine Status for CLI / hosts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineStatus {
    pub mode: EngineMode,
    pub model_loaded: bool,
    pub training_id: Option<Uuid>,
    pub trained_at: Option<DateTime<Utc>>,
    pub training_samples: Option<usize>,
    pub prediction_count: u64,
    pub trained_count: u64,
    pub rule_based_count: u64,
    pub degraded_count: u64,
}

/// Outcome of a successful `train()`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport {
    pub training_id: Uuid,
    pub trained_at: DateTime<Utc>,
    pub samples: usize,
    pub r_squared: f64,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}
