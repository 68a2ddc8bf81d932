//! Trained model state
//!
//! Immutable once built. The engine shares it behind an `Arc` and replaces
//! it wholesale on retrain.

use chrono::{DateTime, Utc};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::logic::features::layout::FEATURE_COUNT;
use crate::logic::features::FeatureVector;
use super::dataset::{to_matrices, TrainingSample};
use super::error::{InferenceError, TrainingError};
use super::regression::LinearRegression;
use super::scaler::StandardScaler;

/// Identity of one training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub training_id: Uuid,
    pub trained_at: DateTime<Utc>,
    pub samples: usize,
    pub r_squared: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrainedModel {
    pub metadata: ModelMetadata,
    pub scaler: StandardScaler,
    pub regression: LinearRegression,
}

impl TrainedModel {
    /// Fit scaler + regression on a labeled dataset
    pub fn fit(samples: &[TrainingSample]) -> Result<Self, TrainingError> {
        let (x, y) = to_matrices(samples)?;

        let scaler = StandardScaler::fit(&x)
            .ok_or_else(|| TrainingError::Fit("cannot fit scaler on an empty matrix".to_string()))?;
        let scaled = scaler.transform(&x);

        let regression = LinearRegression::fit(&scaled, &y)
            .ok_or_else(|| TrainingError::Fit("feature and label counts differ".to_string()))?;

        if !regression.intercept.is_finite() || regression.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(TrainingError::Fit("regression produced non-finite parameters".to_string()));
        }

        let r_squared = regression.r_squared(&scaled, &y);

        Ok(Self {
            metadata: ModelMetadata {
                training_id: Uuid::new_v4(),
                trained_at: Utc::now(),
                samples: samples.len(),
                r_squared,
            },
            scaler,
            regression,
        })
    }

    /// Raw (unclamped) trained-path score
    pub fn score(&self, features: &FeatureVector) -> Result<f64, InferenceError> {
        let row = Array1::from(features.as_array().to_vec());
        let scaled = self.scaler.transform_row(row.view())?;
        let score = self.regression.predict_row(scaled.view())?;

        if score.is_finite() {
            Ok(score)
        } else {
            Err(InferenceError::NonFiniteScore)
        }
    }

    /// Dimensions and parameters usable for scoring
    pub fn check_shape(&self) -> Result<(), String> {
        if self.scaler.n_features() != FEATURE_COUNT || self.scaler.scale.len() != FEATURE_COUNT {
            return Err(format!("scaler has {} features, expected {}", self.scaler.n_features(), FEATURE_COUNT));
        }
        if self.regression.n_features() != FEATURE_COUNT {
            return Err(format!(
                "regression has {} coefficients, expected {}",
                self.regression.n_features(),
                FEATURE_COUNT
            ));
        }
        if self.scaler.mean.iter().chain(self.scaler.scale.iter()).any(|v| !v.is_finite()) {
            return Err("scaler parameters are not finite".to_string());
        }
        if self.scaler.scale.iter().any(|s| *s <= 0.0) {
            return Err("scaler has a non-positive scale".to_string());
        }
        if !self.regression.intercept.is_finite() || self.regression.coefficients.iter().any(|c| !c.is_finite()) {
            return Err("regression parameters are not finite".to_string());
        }
        Ok(())
    }
}
