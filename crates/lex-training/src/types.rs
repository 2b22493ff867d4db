//! Result types for the training pipeline.
//!
//! - [`TrainingReport`]: everything a caller needs to judge a trained model
//! - [`DiagnosticReport`]: trust level and warnings derived from the score
//! - [`PredictionResult`]: output of [`TrainedModel::predict()`](crate::TrainedModel::predict)
//!
//! # Example
//!
//! ```ignore
//! let (report, model) = lex_training::train(&dataset, "department")?;
//!
//! println!("{}: {} = {}", report.algorithm, report.score_name, report.score);
//! println!("Trust: {}", report.diagnostics.trust_level);
//! for warning in &report.diagnostics.importance_warnings {
//!     println!("  ! {}", warning);
//! }
//! ```

use crate::config::{Algorithm, TaskKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Advisory trust label for a model score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrustLevel {
    High,
    Medium,
    Low,
    VeryLow,
}

impl TrustLevel {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            TrustLevel::High => "high",
            TrustLevel::Medium => "medium",
            TrustLevel::Low => "low",
            TrustLevel::VeryLow => "very_low",
        }
    }
}

impl fmt::Display for TrustLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trust judgment for a trained model.
///
/// Produced by [`diagnose()`](crate::diagnostics::diagnose). The labels are
/// heuristics and are not a statistical guarantee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct DiagnosticReport {
    /// The held-out score that was judged.
    pub score: f64,

    /// "R² Score" or "Accuracy".
    pub score_label: String,

    /// One-sentence reading of the score.
    pub interpretation: String,

    pub trust_level: TrustLevel,

    /// Score-based warnings (overfitting, leakage, imbalance).
    pub performance_warnings: Vec<String>,

    /// Warnings about how far the feature importance can be trusted.
    pub importance_warnings: Vec<String>,
}

impl DiagnosticReport {
    /// All warnings, performance first.
    pub fn warnings(&self) -> impl Iterator<Item = &str> {
        self.performance_warnings
            .iter()
            .chain(&self.importance_warnings)
            .map(String::as_str)
    }
}

/// Outcome of a training run.
///
/// Returned alongside the [`TrainedModel`](crate::TrainedModel) by
/// [`Pipeline::train()`](crate::Pipeline::train).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct TrainingReport {
    /// Unique artifact name, `model_{target}_{YYYYmmdd_HHMMSS}`.
    pub model_name: String,

    pub target_column: String,

    pub task: TaskKind,

    pub algorithm: Algorithm,

    /// Held-out score rounded to 4 decimals.
    pub score: f64,

    /// "R² Score" for regression, "Accuracy" for classification.
    pub score_name: String,

    /// Feature importance sorted descending.
    pub feature_importance: Vec<(String, f64)>,

    pub n_features: usize,

    /// Rows used for training and evaluation, after dropping missing targets.
    pub n_samples: usize,

    /// Always "80/20".
    pub train_test_split: String,

    /// Preprocessing steps applied before fitting.
    pub preprocessing_applied: Vec<String>,

    /// Assumptions the selected model relies on.
    pub model_assumptions: Vec<String>,

    pub diagnostics: DiagnosticReport,

    /// Wall-clock time from start to finish.
    pub training_time_seconds: f64,
}

/// Result of a single prediction.
///
/// # Example
///
/// ```ignore
/// let result = model.predict(&json!({"age": 30}))?;
///
/// if let Some(probs) = result.probabilities {
///     for (class, prob) in probs {
///         println!("  {}: {:.2}%", class, prob * 100.0);
///     }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct PredictionResult {
    /// The predicted value.
    ///
    /// - Classification: String containing the class label
    /// - Regression: Number containing the predicted value
    pub prediction: serde_json::Value,

    /// Class probabilities (classification only).
    ///
    /// Maps class labels to their predicted probabilities, summing to 1.0.
    pub probabilities: Option<HashMap<String, f64>>,

    /// Probability of the predicted class (classification only).
    pub confidence: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trust_level_serialization() {
        assert_eq!(
            serde_json::to_string(&TrustLevel::VeryLow).unwrap(),
            "\"very_low\""
        );
        assert_eq!(TrustLevel::High.to_string(), "high");
    }

    #[test]
    fn test_diagnostic_warnings_order() {
        let report = DiagnosticReport {
            score: 0.97,
            score_label: "R² Score".to_string(),
            interpretation: String::new(),
            trust_level: TrustLevel::High,
            performance_warnings: vec!["a".to_string()],
            importance_warnings: vec!["b".to_string(), "c".to_string()],
        };
        assert_eq!(report.warnings().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    }
}
