//! Configuration types for the training pipeline.
//!
//! This module provides [`TrainingConfig`] and its builder, plus the
//! [`TaskKind`] and [`Algorithm`] enums that tag a trained model.
//!
//! # Example
//!
//! ```
//! use lex_training::TrainingConfig;
//!
//! let config = TrainingConfig::builder()
//!     .random_seed(7)
//!     .n_estimators(50)
//!     .build()
//!     .expect("valid config");
//! ```

use crate::error::TrainingError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of prediction task.
///
/// Selected from the target column's declared kind: numeric targets are
/// regression, everything else is classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// Predicting a continuous value.
    Regression,
    /// Predicting a discrete label.
    Classification,
}

impl TaskKind {
    /// Returns the lowercase identifier.
    ///
    /// # Examples
    ///
    /// ```
    /// use lex_training::TaskKind;
    ///
    /// assert_eq!(TaskKind::Regression.as_str(), "regression");
    /// ```
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::Regression => "regression",
            TaskKind::Classification => "classification",
        }
    }

    /// Human-readable name of the score used for this task.
    #[must_use]
    pub fn score_name(&self) -> &'static str {
        match self {
            TaskKind::Regression => "R² Score",
            TaskKind::Classification => "Accuracy",
        }
    }

    /// The algorithm fitted for this task.
    #[must_use]
    pub fn algorithm(&self) -> Algorithm {
        match self {
            TaskKind::Regression => Algorithm::LinearRegression,
            TaskKind::Classification => Algorithm::RandomForestClassifier,
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Algorithm identifier carried by a trained model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Algorithm {
    /// Ordinary least squares with an intercept.
    LinearRegression,
    /// Bagged CART trees with Gini splits.
    RandomForestClassifier,
}

impl Algorithm {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::LinearRegression => "LinearRegression",
            Algorithm::RandomForestClassifier => "RandomForestClassifier",
        }
    }

    /// The task this algorithm solves.
    #[must_use]
    pub fn task(&self) -> TaskKind {
        match self {
            Algorithm::LinearRegression => TaskKind::Regression,
            Algorithm::RandomForestClassifier => TaskKind::Classification,
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for the training pipeline.
///
/// Use [`TrainingConfig::builder()`] to construct a validated configuration.
/// The split ratio (80/20) and the minimum row count are fixed rules and are
/// not configurable.
///
/// # Validation
///
/// - `n_estimators` must be at least 1
/// - `min_samples_split` must be at least 2
/// - `max_depth`, when set, must be at least 1
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Seed for the train/test split and forest bootstrap sampling (default: 42).
    ///
    /// The same seed on the same data gives the same split and the same model.
    pub random_seed: u64,

    /// Number of trees in the random forest (default: 100).
    pub n_estimators: usize,

    /// Maximum tree depth (default: `None`, grow until leaves are pure).
    pub max_depth: Option<usize>,

    /// Minimum samples required to split a node (default: 2).
    pub min_samples_split: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            random_seed: 42,
            n_estimators: 100,
            max_depth: None,
            min_samples_split: 2,
        }
    }
}

impl TrainingConfig {
    /// Create a new builder for `TrainingConfig`.
    #[must_use]
    pub fn builder() -> TrainingConfigBuilder {
        TrainingConfigBuilder::default()
    }

    /// Check all constraints.
    ///
    /// # Errors
    ///
    /// Returns [`TrainingError::InvalidConfig`] naming the offending field.
    pub fn validate(&self) -> Result<(), TrainingError> {
        if self.n_estimators == 0 {
            return Err(TrainingError::InvalidConfig(
                "n_estimators must be at least 1".to_string(),
            ));
        }

        if self.min_samples_split < 2 {
            return Err(TrainingError::InvalidConfig(
                "min_samples_split must be at least 2".to_string(),
            ));
        }

        if self.max_depth == Some(0) {
            return Err(TrainingError::InvalidConfig(
                "max_depth must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for [`TrainingConfig`].
///
/// Created via [`TrainingConfig::builder()`]. All setters return `self` to
/// allow method chaining.
#[derive(Debug, Clone, Default)]
pub struct TrainingConfigBuilder {
    config: TrainingConfig,
}

impl TrainingConfigBuilder {
    /// Set the random seed (default: 42).
    #[must_use]
    pub fn random_seed(mut self, seed: u64) -> Self {
        self.config.random_seed = seed;
        self
    }

    /// Set the number of trees (default: 100).
    #[must_use]
    pub fn n_estimators(mut self, n: usize) -> Self {
        self.config.n_estimators = n;
        self
    }

    /// Limit tree depth (default: unlimited).
    #[must_use]
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.config.max_depth = Some(depth);
        self
    }

    /// Set the minimum samples needed to split a node (default: 2).
    #[must_use]
    pub fn min_samples_split(mut self, n: usize) -> Self {
        self.config.min_samples_split = n;
        self
    }

    /// Build the configuration, validating all settings.
    ///
    /// # Errors
    ///
    /// Returns [`TrainingError::InvalidConfig`] if any constraint is violated.
    pub fn build(self) -> Result<TrainingConfig, TrainingError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TrainingConfig::default();
        assert_eq!(config.random_seed, 42);
        assert_eq!(config.n_estimators, 100);
        assert_eq!(config.max_depth, None);
        assert_eq!(config.min_samples_split, 2);
    }

    #[test]
    fn test_builder_chaining() {
        let config = TrainingConfig::builder()
            .random_seed(123)
            .n_estimators(10)
            .max_depth(4)
            .min_samples_split(5)
            .build()
            .unwrap();

        assert_eq!(config.random_seed, 123);
        assert_eq!(config.n_estimators, 10);
        assert_eq!(config.max_depth, Some(4));
        assert_eq!(config.min_samples_split, 5);
    }

    #[test]
    fn test_invalid_n_estimators() {
        let err = TrainingConfig::builder().n_estimators(0).build().unwrap_err();
        assert!(matches!(err, TrainingError::InvalidConfig(_)));
        assert!(err.to_string().contains("n_estimators"));
    }

    #[test]
    fn test_invalid_min_samples_split() {
        let err = TrainingConfig::builder()
            .min_samples_split(1)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("min_samples_split"));
    }

    #[test]
    fn test_invalid_max_depth() {
        let err = TrainingConfig::builder().max_depth(0).build().unwrap_err();
        assert!(err.to_string().contains("max_depth"));
    }

    #[test]
    fn test_config_from_partial_json() {
        let config: TrainingConfig = serde_json::from_str(r#"{"random_seed": 7}"#).unwrap();
        assert_eq!(config.random_seed, 7);
        assert_eq!(config.n_estimators, 100);
    }

    #[test]
    fn test_task_algorithm_pairing() {
        assert_eq!(TaskKind::Regression.algorithm(), Algorithm::LinearRegression);
        assert_eq!(
            TaskKind::Classification.algorithm(),
            Algorithm::RandomForestClassifier
        );
        assert_eq!(Algorithm::LinearRegression.task(), TaskKind::Regression);
        assert_eq!(TaskKind::Regression.score_name(), "R² Score");
        assert_eq!(TaskKind::Classification.score_name(), "Accuracy");
    }

    #[test]
    fn test_serialized_names() {
        assert_eq!(
            serde_json::to_string(&TaskKind::Classification).unwrap(),
            "\"classification\""
        );
        assert_eq!(
            serde_json::to_string(&Algorithm::RandomForestClassifier).unwrap(),
            "\"RandomForestClassifier\""
        );
    }
}
