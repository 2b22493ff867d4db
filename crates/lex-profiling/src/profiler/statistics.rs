//! Statistical analysis functions for column profiling.

use super::outliers::{OutlierDetector, quantile};
use crate::error::{ProfilingError, Result};
use crate::types::{CategoricalProfile, NumericProfile};
use crate::utils::round_to;
use std::collections::{HashMap, HashSet};

/// Summarize a numeric column.
///
/// Missing values are skipped. Returns `Ok(None)` when the column has no
/// non-missing value at all.
pub(crate) fn numeric_profile(
    column: &str,
    values: &[Option<f64>],
    places: u32,
) -> Result<Option<NumericProfile>> {
    let data: Vec<f64> = values.iter().flatten().copied().collect();
    if data.is_empty() {
        return Ok(None);
    }

    let mut sorted = data.clone();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mean = calculate_mean(&data);
    let median = quantile(&sorted, 0.5).unwrap_or(mean);
    let std = calculate_std(&data);
    let (skewness, kurtosis) = calculate_shape(&data);

    let stats = [
        ("mean", mean),
        ("median", median),
        ("std", std),
        ("skewness", skewness),
        ("kurtosis", kurtosis),
    ];
    if let Some((statistic, _)) = stats.iter().find(|(_, v)| !v.is_finite()) {
        return Err(ProfilingError::NonFiniteStatistic {
            column: column.to_string(),
            statistic: statistic.to_string(),
        });
    }

    // -0.0 and 0.0 are the same value
    let unique_values = data
        .iter()
        .map(|v| if *v == 0.0 { 0u64 } else { v.to_bits() })
        .collect::<HashSet<_>>()
        .len();

    Ok(Some(NumericProfile {
        mean: round_to(mean, places),
        median: round_to(median, places),
        std: round_to(std, places),
        min: round_to(sorted[0], places),
        max: round_to(sorted[sorted.len() - 1], places),
        skewness: round_to(skewness, places),
        kurtosis: round_to(kurtosis, places),
        outliers_count: OutlierDetector::count(&data),
        unique_values,
        zero_count: data.iter().filter(|v| **v == 0.0).count(),
    }))
}

/// Summarize a categorical column.
///
/// Categories are ranked by count, ties keeping first-appearance order.
pub(crate) fn categorical_profile(
    values: &[Option<String>],
    top_n: usize,
    places: u32,
) -> CategoricalProfile {
    let counts = value_counts(values);
    let non_null: usize = counts.iter().map(|(_, count)| count).sum();
    let unique_count = counts.len();

    let diversity_ratio = if non_null == 0 {
        0.0
    } else {
        round_to(unique_count as f64 / non_null as f64, places)
    };

    let (most_frequent, most_frequent_count) = counts
        .first()
        .map(|(value, count)| (Some(value.clone()), *count))
        .unwrap_or((None, 0));

    CategoricalProfile {
        unique_count,
        most_frequent,
        most_frequent_count,
        diversity_ratio,
        top_categories: counts.into_iter().take(top_n).collect(),
    }
}

/// Count distinct non-missing values, most frequent first.
pub(crate) fn value_counts(values: &[Option<String>]) -> Vec<(String, usize)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(String, usize)> = Vec::new();

    for value in values.iter().flatten() {
        match index.get(value.as_str()) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(value.as_str(), counts.len());
                counts.push((value.clone(), 1));
            }
        }
    }

    // stable sort keeps first-appearance order among ties
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

pub(crate) fn calculate_mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    data.iter().sum::<f64>() / data.len() as f64
}

/// Sample standard deviation (n - 1 denominator).
pub(crate) fn calculate_std(data: &[f64]) -> f64 {
    let n = data.len() as f64;
    if n <= 1.0 {
        return 0.0;
    }

    let mean = calculate_mean(data);
    let variance = data.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    variance.sqrt()
}

/// Biased skewness and excess kurtosis from the central moments.
///
/// Both are reported as 0.0 for a zero-variance column.
pub(crate) fn calculate_shape(data: &[f64]) -> (f64, f64) {
    let n = data.len() as f64;
    if n == 0.0 {
        return (0.0, 0.0);
    }

    let mean = calculate_mean(data);
    let (mut m2, mut m3, mut m4) = (0.0, 0.0, 0.0);
    for v in data {
        let d = v - mean;
        let d2 = d * d;
        m2 += d2;
        m3 += d2 * d;
        m4 += d2 * d2;
    }
    m2 /= n;
    m3 /= n;
    m4 /= n;

    // relative to the squared mean so the guard is scale-free
    if m2 <= (f64::EPSILON * mean).powi(2) {
        return (0.0, 0.0);
    }

    (m3 / m2.powf(1.5), m4 / (m2 * m2) - 3.0)
}
