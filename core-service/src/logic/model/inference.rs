//! Prediction Engine - dual-mode scoring
//!
//! Trained linear model when one is loaded, fixed rule-based formula
//! otherwise. The trained path returns a `Result`; `predict` decides the
//! fallback explicitly and never fails for a well-formed `FeatureVector`.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::{Mutex, RwLock};

use crate::logic::config::EngineConfig;
use crate::logic::features::layout::{SCORE_MAX, SCORE_MIN};
use crate::logic::features::{round2, FeatureVector};
use super::classifier::classify;
use super::dataset::{self, TrainingSample};
use super::error::TrainingError;
use super::rules::rule_based_score;
use super::storage::ModelStorage;
use super::trained::TrainedModel;
use super::types::{EngineMode, EngineStatus, PredictionMethod, PredictionResult, TrainingReport};

// ============================================================================
// STATE
// ============================================================================

/// Swapped as a whole; readers never see a half-updated model
#[derive(Debug, Clone)]
struct EngineState {
    model: Option<Arc<TrainedModel>>,
    mode: EngineMode,
}

impl EngineState {
    fn untrained() -> Self {
        Self { model: None, mode: EngineMode::Untrained }
    }

    fn trained(model: Arc<TrainedModel>) -> Self {
        Self { model: Some(model), mode: EngineMode::Trained }
    }
}

/// Process-wide engine, configured from the environment on first use
static GLOBAL_ENGINE: Lazy<PredictionEngine> =
    Lazy::new(|| PredictionEngine::from_config(&EngineConfig::from_env()));

pub fn global() -> &'static PredictionEngine {
    &GLOBAL_ENGINE
}

// ============================================================================
// ENGINE
// ============================================================================

pub struct PredictionEngine {
    state: RwLock<EngineState>,
    train_lock: Mutex<()>,
    storage: ModelStorage,

    prediction_count: AtomicU64,
    trained_count: AtomicU64,
    rule_based_count: AtomicU64,
    degraded_count: AtomicU64,
}

impl PredictionEngine {
    /// Untrained engine; nothing is read from disk
    pub fn new(storage: ModelStorage) -> Self {
        Self {
            state: RwLock::new(EngineState::untrained()),
            train_lock: Mutex::new(()),
            storage,
            prediction_count: AtomicU64::new(0),
            trained_count: AtomicU64::new(0),
            rule_based_count: AtomicU64::new(0),
            degraded_count: AtomicU64::new(0),
        }
    }

    /// Engine with persisted model loaded if valid
    pub fn load(storage: ModelStorage) -> Self {
        let engine = Self::new(storage);
        engine.reload();
        engine
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::load(ModelStorage::from_config(config))
    }

    pub fn storage(&self) -> &ModelStorage {
        &self.storage
    }

    /// Re-read persisted artifacts. Any load failure leaves the engine untrained.
    /// Waits for an in-flight `train` so it never reads a half-replaced pair.
    pub fn reload(&self) -> bool {
        let _guard = self.train_lock.lock();

        let next = if !self.storage.exists() {
            log::info!("No trained model found - using rule-based prediction");
            EngineState::untrained()
        } else {
            match self.storage.load() {
                Ok(model) => {
                    log::info!(
                        "Trained model loaded (training {}, {} samples)",
                        model.metadata.training_id,
                        model.metadata.samples
                    );
                    EngineState::trained(Arc::new(model))
                }
                Err(e) => {
                    log::warn!("Ignoring persisted model: {} - using rule-based prediction", e);
                    EngineState::untrained()
                }
            }
        };

        let trained = next.model.is_some();
        *self.state.write() = next;
        trained
    }

    pub fn mode(&self) -> EngineMode {
        self.state.read().mode
    }

    pub fn is_trained(&self) -> bool {
        self.mode() == EngineMode::Trained
    }

    pub fn current_model(&self) -> Option<Arc<TrainedModel>> {
        self.state.read().model.clone()
    }

    /// Swap in a model without persisting it
    pub fn install(&self, model: TrainedModel) {
        *self.state.write() = EngineState::trained(Arc::new(model));
    }

    // ========================================================================
    // TRAINING
    // ========================================================================

    /// Fit, persist, then swap. On error the current model stays in place.
    pub fn train(&self, samples: &[TrainingSample]) -> Result<TrainingReport, TrainingError> {
        let _guard = self.train_lock.lock();

        let result = TrainedModel::fit(samples).and_then(|model| {
            self.storage.save(&model)?;
            Ok(model)
        });

        match result {
            Ok(model) => {
                let report = TrainingReport {
                    training_id: model.metadata.training_id,
                    trained_at: model.metadata.trained_at,
                    samples: model.metadata.samples,
                    r_squared: model.metadata.r_squared,
                    coefficients: model.regression.coefficients.clone(),
                    intercept: model.regression.intercept,
                };
                *self.state.write() = EngineState::trained(Arc::new(model));

                log::info!(
                    "Model trained on {} samples (R² = {:.4}, training {})",
                    report.samples,
                    report.r_squared,
                    report.training_id
                );
                Ok(report)
            }
            Err(e) => {
                log::error!("Error training model: {}", e);
                Err(e)
            }
        }
    }

    /// Train from a CSV dataset
    pub fn train_from_csv(&self, path: &Path) -> Result<TrainingReport, TrainingError> {
        log::info!("Loading training data from: {}", path.display());
        let samples = dataset::load_csv(path).map_err(|e| {
            log::error!("Error reading training data: {}", e);
            e
        })?;
        self.train(&samples)
    }

    // ========================================================================
    // PREDICTION
    // ========================================================================

    /// Auto predict: trained model if loaded, rule-based otherwise
    pub fn predict(&self, features: &FeatureVector) -> PredictionResult {
        self.prediction_count.fetch_add(1, Ordering::Relaxed);

        let model = self.current_model();
        if let Some(model) = model {
            match model.score(features) {
                Ok(raw) => {
                    self.trained_count.fetch_add(1, Ordering::Relaxed);
                    let result = finish(raw, features, PredictionMethod::Trained);
                    log::debug!("Trained prediction: {:.2} ({})", result.score, result.category);
                    return result;
                }
                Err(e) => {
                    self.degraded_count.fetch_add(1, Ordering::Relaxed);
                    log::warn!("Trained prediction degraded ({}), using rule-based formula", e);
                    log::debug!("Degraded input: {}", features.to_log_entry());
                    self.invalidate(&model);
                }
            }
        }

        self.rule_based_count.fetch_add(1, Ordering::Relaxed);
        predict_rule_based(features)
    }

    /// Drop `failed` unless a newer model replaced it meanwhile
    fn invalidate(&self, failed: &Arc<TrainedModel>) {
        let mut state = self.state.write();
        let is_current = state
            .model
            .as_ref()
            .map_or(false, |current| Arc::ptr_eq(current, failed));

        if is_current {
            *state = EngineState {
                model: None,
                mode: EngineMode::FallingBack,
            };
            log::warn!(
                "Trained model {} disabled until next train or reload",
                failed.metadata.training_id
            );
        }
    }

    pub fn status(&self) -> EngineStatus {
        let state = self.state.read().clone();
        let meta = state.model.as_ref().map(|m| m.metadata.clone());

        EngineStatus {
            mode: state.mode,
            model_loaded: state.model.is_some(),
            training_id: meta.as_ref().map(|m| m.training_id),
            trained_at: meta.as_ref().map(|m| m.trained_at),
            training_samples: meta.as_ref().map(|m| m.samples),
            prediction_count: self.prediction_count.load(Ordering::Relaxed),
            trained_count: self.trained_count.load(Ordering::Relaxed),
            rule_based_count: self.rule_based_count.load(Ordering::Relaxed),
            degraded_count: self.degraded_count.load(Ordering::Relaxed),
        }
    }
}

// ============================================================================
// HELPERS
// ============================================================================

/// Rule-based prediction (no model)
pub fn predict_rule_based(features: &FeatureVector) -> PredictionResult {
    finish(rule_based_score(features), features, PredictionMethod::RuleBased)
}

/// Clamp, round to 2 decimals, classify the rounded score
fn finish(raw: f64, features: &FeatureVector, method: PredictionMethod) -> PredictionResult {
    let score = round2(raw.clamp(SCORE_MIN, SCORE_MAX));

    PredictionResult {
        score,
        category: classify(score),
        features: *features,
        method,
    }
}
