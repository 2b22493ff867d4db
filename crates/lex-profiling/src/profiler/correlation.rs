//! Pairwise Pearson correlation across numeric columns.

use crate::types::{CorrelationMatrix, CorrelationPair, CorrelationReport};
use crate::utils::round_to;

/// Pairs whose absolute coefficient exceeds this value are reported as strong.
pub const STRONG_CORRELATION_THRESHOLD: f64 = 0.5;

pub struct CorrelationAnalyzer;

impl CorrelationAnalyzer {
    /// Build the full matrix and the strong-pair list.
    ///
    /// `columns` holds each numeric column's values with missing entries as
    /// `None`; every pair is computed on the rows where both are present.
    pub fn analyze(columns: &[(String, Vec<Option<f64>>)], places: u32) -> CorrelationReport {
        let raw = Self::raw_matrix(columns);
        let names: Vec<String> = columns.iter().map(|(name, _)| name.clone()).collect();

        let mut strong_correlations = Vec::new();
        for i in 0..raw.len() {
            for j in (i + 1)..raw.len() {
                let Some(r) = raw[i][j] else { continue };
                if r.abs() > STRONG_CORRELATION_THRESHOLD {
                    strong_correlations.push(CorrelationPair {
                        column1: names[i].clone(),
                        column2: names[j].clone(),
                        correlation: round_to(r, places),
                    });
                }
            }
        }
        strong_correlations.sort_by(|a, b| b.correlation.abs().total_cmp(&a.correlation.abs()));

        let values = raw
            .into_iter()
            .map(|row| row.into_iter().map(|r| r.unwrap_or(0.0)).collect())
            .collect();

        CorrelationReport {
            matrix: CorrelationMatrix {
                columns: names,
                values,
            },
            strong_correlations,
        }
    }

    /// Correlation matrix with undefined entries left as `None`.
    pub fn raw_matrix(columns: &[(String, Vec<Option<f64>>)]) -> Vec<Vec<Option<f64>>> {
        let n = columns.len();
        let mut matrix = vec![vec![None; n]; n];
        for i in 0..n {
            for j in i..n {
                let r = pearson(&columns[i].1, &columns[j].1);
                matrix[i][j] = r;
                matrix[j][i] = r;
            }
        }
        matrix
    }
}

/// Pearson coefficient over the rows where both values are present.
///
/// `None` when fewer than two rows overlap or either side has zero variance.
pub fn pearson(x: &[Option<f64>], y: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y)
        .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
        .collect();
    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(a, _)| a).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, b)| b).sum::<f64>() / n;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (a, b) in &pairs {
        let dx = a - mean_x;
        let dy = b - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }

    let r = cov / (var_x * var_y).sqrt();
    r.is_finite().then(|| r.clamp(-1.0, 1.0))
}
