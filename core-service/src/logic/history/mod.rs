//! History Module - Prediction history per student per term
//!
//! SQLite-backed log of every stored prediction, with the read queries the
//! dashboards need (per-student history, latest, distribution).

pub mod store;
pub mod types;


pub use store::HistoryStore;
pub use types::{HistoryError, PerformanceSummary, StoredPrediction};
