//! Ordinary least squares with intercept
//!
//! Solves the normal equations on centered inputs. Columns that are linearly
//! dependent on earlier ones get a zero coefficient.

use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};

use super::error::InferenceError;

/// Relative pivot tolerance for rank-deficient systems
const PIVOT_TOLERANCE: f64 = 1e-10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearRegression {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl LinearRegression {
    /// Fit `y ≈ x · w + b`. `None` if shapes disagree or there are no rows.
    pub fn fit(x: &Array2<f64>, y: &Array1<f64>) -> Option<Self> {
        if x.nrows() == 0 || x.nrows() != y.len() {
            return None;
        }

        let x_mean = x.mean_axis(Axis(0))?;
        let y_mean = y.mean()?;
        let xc = x - &x_mean;
        let yc = y - y_mean;

        let gram = xc.t().dot(&xc);
        let moment = xc.t().dot(&yc);
        let coefficients = solve_symmetric(gram, moment);

        let intercept = y_mean - x_mean.dot(&coefficients);

        Some(Self {
            coefficients: coefficients.to_vec(),
            intercept,
        })
    }

    pub fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    pub fn predict_row(&self, row: ArrayView1<f64>) -> Result<f64, InferenceError> {
        if self.coefficients.len() != row.len() {
            return Err(InferenceError::DimensionMismatch {
                component: "regression",
                expected: row.len(),
                actual: self.coefficients.len(),
            });
        }

        Ok(self.intercept
            + row
                .iter()
                .zip(self.coefficients.iter())
                .map(|(v, w)| v * w)
                .sum::<f64>())
    }

    pub fn predict(&self, x: &Array2<f64>) -> Array1<f64> {
        x.dot(&Array1::from(self.coefficients.clone())) + self.intercept
    }

    /// Coefficient of determination on `(x, y)`
    pub fn r_squared(&self, x: &Array2<f64>, y: &Array1<f64>) -> f64 {
        let Some(y_mean) = y.mean() else {
            return 0.0;
        };
        let predicted = self.predict(x);
        let ss_res: f64 = y.iter().zip(predicted.iter()).map(|(a, p)| (a - p).powi(2)).sum();
        let ss_tot: f64 = y.iter().map(|a| (a - y_mean).powi(2)).sum();

        if ss_tot == 0.0 {
            if ss_res == 0.0 { 1.0 } else { 0.0 }
        } else {
            1.0 - ss_res / ss_tot
        }
    }
}

/// Gauss-Jordan elimination with partial pivoting.
fn solve_symmetric(mut a: Array2<f64>, mut b: Array1<f64>) -> Array1<f64> {
    let n = b.len();
    let largest_diag = a.diag().iter().fold(0.0f64, |acc, v| acc.max(v.abs()));
    let tolerance = largest_diag.max(1.0) * PIVOT_TOLERANCE;

    let mut used = vec![false; n];
    let mut pivot_rows: Vec<Option<usize>> = vec![None; n];

    for col in 0..n {
        let best = (0..n)
            .filter(|r| !used[*r])
            .max_by(|&i, &j| a[[i, col]].abs().total_cmp(&a[[j, col]].abs()));

        let Some(row) = best else { continue };
        if a[[row, col]].abs() <= tolerance {
            continue;
        }

        used[row] = true;
        pivot_rows[col] = Some(row);

        let pivot = a[[row, col]];
        for k in 0..n {
            a[[row, k]] /= pivot;
        }
        b[row] /= pivot;

        for i in 0..n {
            if i == row {
                continue;
            }
            let factor = a[[i, col]];
            if factor == 0.0 {
                continue;
            }
            for k in 0..n {
                let delta = factor * a[[row, k]];
                a[[i, k]] -= delta;
            }
            let delta = factor * b[row];
            b[i] -= delta;
        }
    }

    pivot_rows
        .into_iter()
        .map(|row| row.map(|r| b[r]).unwrap_or(0.0))
        .collect()
}
