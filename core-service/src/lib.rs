//! Student Performance Predictor - Prediction Engine Core

pub mod constants;
pub mod logic;
