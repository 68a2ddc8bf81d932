//! Engine configuration

use std::path::{Path, PathBuf};

use crate::constants;

/// Runtime configuration for the engine, history store and CLI
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Directory holding `trained_scaler.json` / `trained_model.json`
    pub model_dir: PathBuf,

    /// SQLite file for prediction history
    pub history_db: PathBuf,

    /// CSV dataset used by `train` when no path is given
    pub training_data: PathBuf,
}

impl EngineConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            model_dir: constants::get_model_dir(),
            history_db: constants::get_history_db_path(),
            training_data: constants::get_training_data_path(),
        }
    }

    /// Everything rooted in one directory (tests, portable installs)
    pub fn rooted_at(dir: &Path) -> Self {
        Self {
            model_dir: dir.join("model"),
            history_db: dir.join(constants::HISTORY_DB_FILE_NAME),
            training_data: dir.join(constants::TRAINING_DATA_FILE_NAME),
        }
    }

    pub fn scaler_path(&self) -> PathBuf {
        self.model_dir.join(constants::SCALER_FILE_NAME)
    }

    pub fn model_path(&self) -> PathBuf {
        self.model_dir.join(constants::MODEL_FILE_NAME)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
