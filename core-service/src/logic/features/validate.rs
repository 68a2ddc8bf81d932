//! Range validation for academic inputs

use thiserror::Error;

/// Malformed or out-of-range feature input
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{field} must be between {min} and {max}, got {value}")]
pub struct ValidationError {
    pub field: &'static str,
    pub value: f64,
    pub min: f64,
    pub max: f64,
}

/// Check `value ∈ [min, max]`. NaN never passes.
pub fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<f64, ValidationError> {
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(ValidationError { field, value, min, max })
    }
}
