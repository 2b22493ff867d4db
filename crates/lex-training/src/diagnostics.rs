//! Trust diagnostics for trained models.
//!
//! Turns a held-out score and a feature importance ranking into a
//! [`DiagnosticReport`]. Every check runs independently, so a single score can
//! raise several warnings at once.
//!
//! | Task | high | medium | low | very_low |
//! |------|------|--------|-----|----------|
//! | Regression (R²) | ≥ 0.7 | ≥ 0.5 | ≥ 0.0 | < 0.0 |
//! | Classification (accuracy) | ≥ 0.8 | ≥ 0.6 | ≥ 0.5 | < 0.5 |

use crate::config::TaskKind;
use crate::types::{DiagnosticReport, TrustLevel};

pub const REGRESSION_HIGH: f64 = 0.7;
pub const REGRESSION_MEDIUM: f64 = 0.5;
pub const REGRESSION_LOW: f64 = 0.0;

pub const CLASSIFICATION_HIGH: f64 = 0.8;
pub const CLASSIFICATION_MEDIUM: f64 = 0.6;
pub const CLASSIFICATION_LOW: f64 = 0.5;

/// Scores above this suggest overfitting or leakage, for either task.
pub const SUSPICIOUS_SCORE: f64 = 0.95;

/// Accuracy below this suggests imbalanced classes.
pub const LOW_ACCURACY: f64 = 0.6;

/// Fewer samples than this make importance rankings unreliable.
pub const MIN_RELIABLE_SAMPLES: usize = 100;

/// A single feature holding more weight than this hints at leakage.
pub const DOMINANT_IMPORTANCE: f64 = 0.8;

/// Judge a model from its held-out score and feature importance.
///
/// # Examples
///
/// ```
/// use lex_training::{TaskKind, TrustLevel, diagnostics::diagnose};
///
/// let report = diagnose(0.97, TaskKind::Regression, &[("x".to_string(), 0.4)], 500);
/// assert_eq!(report.trust_level, TrustLevel::High);
/// assert_eq!(report.performance_warnings.len(), 1);
/// ```
pub fn diagnose(
    score: f64,
    task: TaskKind,
    feature_importance: &[(String, f64)],
    n_samples: usize,
) -> DiagnosticReport {
    let (interpretation, trust_level) = interpret_performance(score, task);
    DiagnosticReport {
        score,
        score_label: task.score_name().to_string(),
        interpretation: interpretation.to_string(),
        trust_level,
        performance_warnings: performance_warnings(score, task),
        importance_warnings: importance_warnings(feature_importance, n_samples),
    }
}

/// Interpretation sentence and trust level for a score.
pub fn interpret_performance(score: f64, task: TaskKind) -> (&'static str, TrustLevel) {
    match task {
        TaskKind::Regression => {
            if score >= REGRESSION_HIGH {
                (
                    "Good fit: the model explains most variation in the target.",
                    TrustLevel::High,
                )
            } else if score >= REGRESSION_MEDIUM {
                (
                    "Moderate fit: useful for rough estimates, more features may help.",
                    TrustLevel::Medium,
                )
            } else if score >= REGRESSION_LOW {
                (
                    "Weak fit: the model misses most of the variation in the target.",
                    TrustLevel::Low,
                )
            } else {
                (
                    "Poor fit: the model does worse than predicting the mean.",
                    TrustLevel::VeryLow,
                )
            }
        }
        TaskKind::Classification => {
            if score >= CLASSIFICATION_HIGH {
                (
                    "Good accuracy: predictions are right most of the time.",
                    TrustLevel::High,
                )
            } else if score >= CLASSIFICATION_MEDIUM {
                (
                    "Moderate accuracy: reasonable, but expect a fair share of mistakes.",
                    TrustLevel::Medium,
                )
            } else if score >= CLASSIFICATION_LOW {
                (
                    "Low accuracy: only somewhat better than guessing.",
                    TrustLevel::Low,
                )
            } else {
                (
                    "Very low accuracy: no better than guessing.",
                    TrustLevel::VeryLow,
                )
            }
        }
    }
}

/// Warnings derived from the score alone.
pub fn performance_warnings(score: f64, task: TaskKind) -> Vec<String> {
    let mut warnings = Vec::new();
    match task {
        TaskKind::Regression => {
            if score > SUSPICIOUS_SCORE {
                warnings.push("Very high R² - check for overfitting or data leakage".to_string());
            }
            if score < REGRESSION_LOW {
                warnings.push(
                    "Negative R² - the model is worse than predicting the mean".to_string(),
                );
            }
        }
        TaskKind::Classification => {
            if score > SUSPICIOUS_SCORE {
                warnings.push(
                    "Very high accuracy - check for overfitting or class imbalance".to_string(),
                );
            }
            if score < LOW_ACCURACY {
                warnings.push("Low accuracy - check whether classes are balanced".to_string());
            }
        }
    }
    warnings
}

/// Warnings about the reliability of the importance ranking.
pub fn importance_warnings(feature_importance: &[(String, f64)], n_samples: usize) -> Vec<String> {
    let mut warnings = Vec::new();
    if n_samples < MIN_RELIABLE_SAMPLES {
        warnings.push("Small dataset - feature importance may be unreliable".to_string());
    }
    let max = feature_importance
        .iter()
        .map(|(_, weight)| *weight)
        .fold(f64::NEG_INFINITY, f64::max);
    if max > DOMINANT_IMPORTANCE {
        warnings.push("One feature dominates - possible data leakage".to_string());
    }
    warnings
}

/// Assumptions the model for `task` relies on.
pub fn model_assumptions(task: TaskKind) -> Vec<String> {
    let assumptions: &[&str] = match task {
        TaskKind::Regression => &[
            "Features relate to the target linearly",
            "Features are not strongly correlated with each other",
            "No extreme outliers distort the fit",
            "There are enough rows for stable estimates",
        ],
        TaskKind::Classification => &[
            "Classes are reasonably balanced",
            "Features carry signal that separates the classes",
            "Training data is representative of future data",
            "Data collection has no systematic bias",
        ],
    };
    assumptions.iter().map(|s| s.to_string()).collect()
}
