//! Ordinary least squares regression.

use crate::error::{Result, TrainingError};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Linear model `y = intercept + x . coefficients`.
///
/// Fitted on mean-centered data through an SVD least-squares solve, so
/// collinear or constant features get the minimum-norm solution instead of
/// failing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearRegression {
    coefficients: Vec<f64>,
    intercept: f64,
}

impl LinearRegression {
    /// Fit on row-major features `x` and targets `y`.
    ///
    /// # Errors
    ///
    /// [`TrainingError::TrainingFailure`] when there are no rows, the row
    /// lengths disagree, or the solve produces non-finite values.
    pub fn fit(x: &[Vec<f64>], y: &[f64]) -> Result<Self> {
        let n = x.len();
        if n == 0 || n != y.len() {
            return Err(TrainingError::TrainingFailure(format!(
                "linear regression needs matching non-empty inputs, got {} rows and {} targets",
                n,
                y.len()
            )));
        }
        let p = x[0].len();
        if x.iter().any(|row| row.len() != p) {
            return Err(TrainingError::TrainingFailure(
                "feature rows have different lengths".to_string(),
            ));
        }

        let y_mean = y.iter().sum::<f64>() / n as f64;
        if p == 0 {
            return Self::checked(Vec::new(), y_mean);
        }

        let x_means: Vec<f64> = (0..p)
            .map(|j| x.iter().map(|row| row[j]).sum::<f64>() / n as f64)
            .collect();

        let centered: Vec<f64> = x
            .iter()
            .flat_map(|row| row.iter().zip(&x_means).map(|(v, m)| v - m))
            .collect();
        let design = DMatrix::from_row_slice(n, p, &centered);
        let target = DVector::from_iterator(n, y.iter().map(|v| v - y_mean));

        let svd = design.svd(true, true);
        let max_singular = svd.singular_values.max();
        let eps = max_singular * f64::EPSILON * n.max(p) as f64;
        let beta = svd
            .solve(&target, eps)
            .map_err(|e| TrainingError::TrainingFailure(format!("least squares solve failed: {}", e)))?;

        let coefficients: Vec<f64> = beta.iter().copied().collect();
        let intercept = y_mean
            - coefficients
                .iter()
                .zip(&x_means)
                .map(|(b, m)| b * m)
                .sum::<f64>();

        debug!("Fitted linear model with {} coefficients", p);
        Self::checked(coefficients, intercept)
    }

    fn checked(coefficients: Vec<f64>, intercept: f64) -> Result<Self> {
        if !intercept.is_finite() || coefficients.iter().any(|c| !c.is_finite()) {
            return Err(TrainingError::TrainingFailure(
                "linear regression produced non-finite coefficients".to_string(),
            ));
        }
        Ok(Self {
            coefficients,
            intercept,
        })
    }

    pub fn predict_row(&self, row: &[f64]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(row)
                .map(|(b, v)| b * v)
                .sum::<f64>()
    }

    pub fn predict(&self, x: &[Vec<f64>]) -> Vec<f64> {
        x.iter().map(|row| self.predict_row(row)).collect()
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Absolute coefficient per feature.
    pub fn importances(&self) -> Vec<f64> {
        self.coefficients.iter().map(|c| c.abs()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-8, "{} != {}", a, b);
    }

    #[test]
    fn test_recovers_exact_plane() {
        // y = 3 + 2a - b
        let x = vec![
            vec![1.0, 0.0],
            vec![2.0, 1.0],
            vec![3.0, 5.0],
            vec![4.0, 2.0],
            vec![0.0, 3.0],
        ];
        let y: Vec<f64> = x.iter().map(|r| 3.0 + 2.0 * r[0] - r[1]).collect();
        let model = LinearRegression::fit(&x, &y).unwrap();

        assert_close(model.intercept(), 3.0);
        assert_close(model.coefficients()[0], 2.0);
        assert_close(model.coefficients()[1], -1.0);
        assert_close(model.predict_row(&[10.0, 4.0]), 19.0);
        assert_close(model.importances()[1], 1.0);
    }

    #[test]
    fn test_constant_feature_gets_zero_weight() {
        let x = vec![vec![1.0, 7.0], vec![2.0, 7.0], vec![3.0, 7.0]];
        let y = vec![2.0, 4.0, 6.0];
        let model = LinearRegression::fit(&x, &y).unwrap();

        assert_close(model.coefficients()[0], 2.0);
        assert_close(model.coefficients()[1], 0.0);
        assert_close(model.intercept(), 0.0);
    }

    #[test]
    fn test_duplicated_feature_splits_weight() {
        let x = vec![vec![1.0, 1.0], vec![2.0, 2.0], vec![3.0, 3.0]];
        let y = vec![2.0, 4.0, 6.0];
        let model = LinearRegression::fit(&x, &y).unwrap();

        assert_close(model.coefficients()[0], 1.0);
        assert_close(model.coefficients()[1], 1.0);
    }

    #[test]
    fn test_no_features_predicts_mean() {
        let x = vec![vec![], vec![], vec![]];
        let model = LinearRegression::fit(&x, &[1.0, 2.0, 6.0]).unwrap();
        assert_eq!(model.predict(&x), vec![3.0, 3.0, 3.0]);
    }

    #[test]
    fn test_empty_input_fails() {
        let err = LinearRegression::fit(&[], &[]).unwrap_err();
        assert_eq!(err.error_code(), "TRAINING_FAILURE");
    }
}
