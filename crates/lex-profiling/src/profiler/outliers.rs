//! IQR-based outlier detection for numeric columns.

use serde::{Deserialize, Serialize};

/// Multiplier applied to the IQR on each side of the quartiles.
pub const IQR_MULTIPLIER: f64 = 1.5;

/// The fence computed for one column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutlierBounds {
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    pub lower: f64,
    pub upper: f64,
}

impl OutlierBounds {
    /// Whether `value` lies strictly outside the fence.
    #[inline]
    pub fn is_outlier(&self, value: f64) -> bool {
        value < self.lower || value > self.upper
    }
}

/// Detects outliers using interquartile range fencing.
///
/// A zero IQR collapses the fence onto the single quartile value, so on a
/// constant-but-one column the odd value is flagged.
pub struct OutlierDetector;

impl OutlierDetector {
    /// Compute the fence for a set of non-missing values.
    ///
    /// Returns `None` when there are no values.
    pub fn bounds(values: &[f64]) -> Option<OutlierBounds> {
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let q1 = quantile(&sorted, 0.25)?;
        let q3 = quantile(&sorted, 0.75)?;
        let iqr = q3 - q1;

        Some(OutlierBounds {
            q1,
            q3,
            iqr,
            lower: q1 - IQR_MULTIPLIER * iqr,
            upper: q3 + IQR_MULTIPLIER * iqr,
        })
    }

    /// Number of values outside the fence.
    pub fn count(values: &[f64]) -> usize {
        match Self::bounds(values) {
            Some(bounds) => values.iter().filter(|v| bounds.is_outlier(**v)).count(),
            None => 0,
        }
    }

    /// The flagged values themselves, in input order.
    pub fn detect(values: &[f64]) -> Vec<f64> {
        match Self::bounds(values) {
            Some(bounds) => values
                .iter()
                .copied()
                .filter(|v| bounds.is_outlier(*v))
                .collect(),
            None => Vec::new(),
        }
    }
}

/// Quantile of already sorted data, interpolating linearly between the two
/// closest ranks.
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }

    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;

    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_reference_example() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 100.0];
        let bounds = OutlierDetector::bounds(&values).unwrap();

        assert!((bounds.q1 - 2.25).abs() < 1e-12);
        assert!((bounds.q3 - 4.75).abs() < 1e-12);
        assert!((bounds.iqr - 2.5).abs() < 1e-12);
        assert!((bounds.lower - -1.5).abs() < 1e-12);
        assert!((bounds.upper - 8.5).abs() < 1e-12);
        assert_eq!(OutlierDetector::detect(&values), vec![100.0]);
        assert_eq!(OutlierDetector::count(&values), 1);
    }

    #[test]
    fn test_bounds_unsorted_input() {
        let values = [100.0, 3.0, 1.0, 5.0, 2.0, 4.0];
        let bounds = OutlierDetector::bounds(&values).unwrap();
        assert!((bounds.q1 - 2.25).abs() < 1e-12);
        assert_eq!(OutlierDetector::count(&values), 1);
    }

    #[test]
    fn test_fence_edges_are_inclusive() {
        // Q1=2, Q3=4, IQR=2 -> fence [-1, 7]; values on the edge are kept
        let bounds = OutlierBounds {
            q1: 2.0,
            q3: 4.0,
            iqr: 2.0,
            lower: -1.0,
            upper: 7.0,
        };
        assert!(!bounds.is_outlier(-1.0));
        assert!(!bounds.is_outlier(7.0));
        assert!(bounds.is_outlier(7.0001));
        assert!(bounds.is_outlier(-1.0001));
    }

    #[test]
    fn test_no_outliers() {
        let values: Vec<f64> = (1..=9).map(f64::from).collect();
        assert_eq!(OutlierDetector::count(&values), 0);
    }

    #[test]
    fn test_zero_iqr_flags_any_different_value() {
        let values = [5.0, 5.0, 5.0, 5.0, 5.0, 5.0, 5.0, 6.0];
        let bounds = OutlierDetector::bounds(&values).unwrap();
        assert_eq!(bounds.iqr, 0.0);
        assert_eq!(bounds.lower, 5.0);
        assert_eq!(bounds.upper, 5.0);
        assert_eq!(OutlierDetector::detect(&values), vec![6.0]);
    }

    #[test]
    fn test_constant_column_has_no_outliers() {
        let values = [5.0; 5];
        assert_eq!(OutlierDetector::count(&values), 0);
    }

    #[test]
    fn test_empty_and_single() {
        assert!(OutlierDetector::bounds(&[]).is_none());
        assert_eq!(OutlierDetector::count(&[]), 0);

        let bounds = OutlierDetector::bounds(&[3.0]).unwrap();
        assert_eq!(bounds.q1, 3.0);
        assert_eq!(bounds.q3, 3.0);
        assert_eq!(OutlierDetector::count(&[3.0]), 0);
    }

    #[test]
    fn test_quantile_interpolation() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile(&sorted, 0.0), Some(1.0));
        assert_eq!(quantile(&sorted, 1.0), Some(4.0));
        assert_eq!(quantile(&sorted, 0.5), Some(2.5));
        assert_eq!(quantile(&sorted, 0.25), Some(1.75));
    }
}
