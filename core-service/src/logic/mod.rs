//! Logic Module - prediction engine and its surroundings
//!
//! - `features/` - Feature vector, layout, term aggregation
//! - `model/` - Rule-based formula, trained regression, engine
//! - `history/` - Prediction history store
//! - `service` - Aggregate → predict → store

pub mod config;
pub mod features;
pub mod history;
pub mod model;
pub mod service;
