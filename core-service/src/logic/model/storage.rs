//! Model artifact storage
//!
//! Two JSON artifacts per training run: the scaler and the regression.
//! Each is sealed with a SHA-256 checksum over its payload and stamped with
//! the feature layout and the training id. A pair only loads if both
//! artifacts verify and share the same training id.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::constants::{MODEL_FILE_NAME, SCALER_FILE_NAME};
use crate::logic::config::EngineConfig;
use crate::logic::features::layout::{layout_hash, validate_layout, FEATURE_VERSION};
use super::error::StorageError;
use super::regression::LinearRegression;
use super::scaler::StandardScaler;
use super::trained::{ModelMetadata, TrainedModel};

// ============================================================================
// ARTIFACT FORMAT
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Sealed<T> {
    checksum: String,
    payload: T,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ScalerArtifact {
    feature_version: u8,
    layout_hash: u32,
    training_id: Uuid,
    mean: Vec<f64>,
    scale: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RegressionArtifact {
    feature_version: u8,
    layout_hash: u32,
    training_id: Uuid,
    trained_at: DateTime<Utc>,
    samples: usize,
    r_squared: f64,
    coefficients: Vec<f64>,
    intercept: f64,
}

fn checksum<T: Serialize>(payload: &T) -> Result<String, StorageError> {
    let bytes = serde_json::to_vec(payload)?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}

// ============================================================================
// STORAGE
// ============================================================================

#[derive(Debug, Clone)]
pub struct ModelStorage {
    scaler_path: PathBuf,
    model_path: PathBuf,
}

impl ModelStorage {
    pub fn new(dir: &Path) -> Self {
        Self {
            scaler_path: dir.join(SCALER_FILE_NAME),
            model_path: dir.join(MODEL_FILE_NAME),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            scaler_path: config.scaler_path(),
            model_path: config.model_path(),
        }
    }

    pub fn scaler_path(&self) -> &Path {
        &self.scaler_path
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    /// Both artifacts present on disk
    pub fn exists(&self) -> bool {
        self.scaler_path.exists() && self.model_path.exists()
    }

    /// Persist a trained model, replacing any previous artifacts
    pub fn save(&self, model: &TrainedModel) -> Result<(), StorageError> {
        let meta = &model.metadata;

        let scaler = ScalerArtifact {
            feature_version: FEATURE_VERSION,
            layout_hash: layout_hash(),
            training_id: meta.training_id,
            mean: model.scaler.mean.clone(),
            scale: model.scaler.scale.clone(),
        };
        let regression = RegressionArtifact {
            feature_version: FEATURE_VERSION,
            layout_hash: layout_hash(),
            training_id: meta.training_id,
            trained_at: meta.trained_at,
            samples: meta.samples,
            r_squared: meta.r_squared,
            coefficients: model.regression.coefficients.clone(),
            intercept: model.regression.intercept,
        };

        // Stage both files before replacing either
        let scaler_tmp = staging_path(&self.scaler_path);
        let model_tmp = staging_path(&self.model_path);
        let staged = write_sealed(&scaler_tmp, scaler)
            .and_then(|_| write_sealed(&model_tmp, regression))
            .and_then(|_| {
                fs::rename(&scaler_tmp, &self.scaler_path)?;
                fs::rename(&model_tmp, &self.model_path)?;
                Ok(())
            });

        if let Err(e) = staged {
            for tmp in [&scaler_tmp, &model_tmp] {
                if tmp.exists() {
                    let _ = fs::remove_file(tmp);
                }
            }
            return Err(e);
        }

        log::info!(
            "Model artifacts saved to {} (training {})",
            self.model_path.display(),
            meta.training_id
        );
        Ok(())
    }

    /// Load and verify both artifacts
    pub fn load(&self) -> Result<TrainedModel, StorageError> {
        let scaler: ScalerArtifact = read_sealed(&self.scaler_path, "scaler artifact")?;
        let regression: RegressionArtifact = read_sealed(&self.model_path, "regression artifact")?;

        validate_layout(scaler.feature_version, scaler.layout_hash)?;
        validate_layout(regression.feature_version, regression.layout_hash)?;

        if scaler.training_id != regression.training_id {
            return Err(StorageError::TrainingIdMismatch {
                scaler: scaler.training_id.to_string(),
                regression: regression.training_id.to_string(),
            });
        }

        let model = TrainedModel {
            metadata: ModelMetadata {
                training_id: regression.training_id,
                trained_at: regression.trained_at,
                samples: regression.samples,
                r_squared: regression.r_squared,
            },
            scaler: StandardScaler {
                mean: scaler.mean,
                scale: scaler.scale,
            },
            regression: LinearRegression {
                coefficients: regression.coefficients,
                intercept: regression.intercept,
            },
        };

        model.check_shape().map_err(|reason| StorageError::Invalid {
            artifact: "model",
            reason,
        })?;

        Ok(model)
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn write_sealed<T: Serialize>(path: &Path, payload: T) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let sealed = Sealed {
        checksum: checksum(&payload)?,
        payload,
    };
    fs::write(path, serde_json::to_vec_pretty(&sealed)?)?;
    Ok(())
}

fn read_sealed<T: Serialize + DeserializeOwned>(path: &Path, artifact: &'static str) -> Result<T, StorageError> {
    if !path.exists() {
        return Err(StorageError::NotFound(path.display().to_string()));
    }

    let data = fs::read(path)?;
    let sealed: Sealed<T> = serde_json::from_slice(&data)?;

    if checksum(&sealed.payload)? != sealed.checksum {
        return Err(StorageError::ChecksumMismatch { artifact });
    }

    Ok(sealed.payload)
}

// ============================================================================
// TESTS
// ============================================================================
