//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.
//! Every path can be overridden through the environment.

use std::path::PathBuf;

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "Student Performance Predictor";

/// Directory name under the platform data dir
pub const DATA_DIR_NAME: &str = "student-performance";

/// Scaler artifact file name
pub const SCALER_FILE_NAME: &str = "trained_scaler.json";

/// Regression artifact file name
pub const MODEL_FILE_NAME: &str = "trained_model.json";

/// Default training dataset file name
pub const TRAINING_DATA_FILE_NAME: &str = "training_data.csv";

/// Default prediction history database file name
pub const HISTORY_DB_FILE_NAME: &str = "predictions.db";

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Base data directory (`<data_local_dir>/student-performance`)
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DATA_DIR_NAME)
}

/// Get model artifact directory from environment or use default
pub fn get_model_dir() -> PathBuf {
    std::env::var("PERF_MODEL_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| default_data_dir().join("model"))
}

/// Get history database path from environment or use default
pub fn get_history_db_path() -> PathBuf {
    std::env::var("PERF_HISTORY_DB")
        .map(PathBuf::from)
        .unwrap_or_else(|_| default_data_dir().join(HISTORY_DB_FILE_NAME))
}

/// Get training dataset path from environment or use default
pub fn get_training_data_path() -> PathBuf {
    std::env::var("PERF_TRAINING_DATA")
        .map(PathBuf::from)
        .unwrap_or_else(|_| get_model_dir().join(TRAINING_DATA_FILE_NAME))
}
