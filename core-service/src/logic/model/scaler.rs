//! Standard Scaler
//!
//! Per-feature standardization: `(x - mean) / std`, population std.
//! Constant features get a scale of 1 so they map to 0.

use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};

use super::error::InferenceError;

/// Scales below this are treated as zero variance
const MIN_SCALE: f64 = 10.0 * f64::EPSILON;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    /// Fit on a `(samples, features)` matrix. `None` when there are no rows.
    pub fn fit(x: &Array2<f64>) -> Option<Self> {
        let mean = x.mean_axis(Axis(0))?;
        let scale = x
            .std_axis(Axis(0), 0.0)
            .mapv(|s| if s < MIN_SCALE { 1.0 } else { s });

        Some(Self {
            mean: mean.to_vec(),
            scale: scale.to_vec(),
        })
    }

    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    pub fn transform(&self, x: &Array2<f64>) -> Array2<f64> {
        let mean = Array1::from(self.mean.clone());
        let scale = Array1::from(self.scale.clone());
        (x - &mean) / &scale
    }

    pub fn transform_row(&self, row: ArrayView1<f64>) -> Result<Array1<f64>, InferenceError> {
        if self.mean.len() != row.len() || self.scale.len() != row.len() {
            return Err(InferenceError::DimensionMismatch {
                component: "scaler",
                expected: row.len(),
                actual: self.mean.len().min(self.scale.len()),
            });
        }

        Ok(row
            .iter()
            .zip(self.mean.iter().zip(self.scale.iter()))
            .map(|(v, (m, s))| (v - m) / s)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_fit_population_std() {
        let x = array![[1.0, 10.0], [3.0, 10.0]];
        let scaler = StandardScaler::fit(&x).unwrap();

        assert_eq!(scaler.mean, vec![2.0, 10.0]);
        assert_eq!(scaler.scale, vec![1.0, 1.0]);
    }

    #[test]
    fn test_constant_column_maps_to_zero() {
        let x = array![[5.0, 2.0], [5.0, 4.0], [5.0, 6.0]];
        let scaler = StandardScaler::fit(&x).unwrap();
        let scaled = scaler.transform(&x);

        assert_eq!(scaler.scale[0], 1.0);
        assert!(scaled.column(0).iter().all(|v| *v == 0.0));
        assert!((scaled.column(1).sum()).abs() < 1e-12);
    }

    #[test]
    fn test_transform_row_matches_matrix() {
        let x = array![[1.0, 2.0], [3.0, 8.0], [5.0, 5.0]];
        let scaler = StandardScaler::fit(&x).unwrap();
        let scaled = scaler.transform(&x);
        let row = scaler.transform_row(x.row(1)).unwrap();

        assert_eq!(row, scaled.row(1).to_owned());
    }

    #[test]
    fn test_transform_row_dimension_mismatch() {
        let scaler = StandardScaler { mean: vec![0.0; 4], scale: vec![1.0; 4] };
        let row = array![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];

        assert!(matches!(
            scaler.transform_row(row.view()),
            Err(InferenceError::DimensionMismatch { expected: 6, actual: 4, .. })
        ));
    }

    #[test]
    fn test_fit_empty() {
        let x = Array2::<f64>::zeros((0, 6));
        assert!(StandardScaler::fit(&x).is_none());
    }
}
