//! Model fitting and held-out scoring.

use crate::config::{TaskKind, TrainingConfig};
use crate::encoder::{FeatureMatrix, LabelEncoder, TargetValues};
use crate::error::{Result, TrainingError};
use crate::model::{Estimator, LinearRegression, RandomForestClassifier};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::{debug, info};

/// Minimum rows with a target value needed to train.
pub const MIN_TRAINING_ROWS: usize = 10;

/// Share of rows held out for scoring.
pub const TEST_FRACTION: f64 = 0.2;

/// Human-readable label of the split.
pub const SPLIT_LABEL: &str = "80/20";

/// Shuffle `0..n_rows` and split it into `(train, test)` positions.
///
/// The test partition holds `ceil(0.2 * n_rows)` rows. The same seed always
/// yields the same split.
pub fn train_test_split(n_rows: usize, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let n_test = (n_rows as f64 * TEST_FRACTION).ceil() as usize;
    let mut positions: Vec<usize> = (0..n_rows).collect();
    positions.shuffle(&mut StdRng::seed_from_u64(seed));
    let train = positions.split_off(n_test.min(n_rows));
    (train, positions)
}

/// Coefficient of determination.
///
/// A constant `y_true` scores 1.0 when predicted exactly and 0.0 otherwise.
pub fn r2_score(y_true: &[f64], y_pred: &[f64]) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let mean = y_true.iter().sum::<f64>() / y_true.len() as f64;
    let ss_res: f64 = y_true
        .iter()
        .zip(y_pred)
        .map(|(t, p)| (t - p).powi(2))
        .sum();
    let ss_tot: f64 = y_true.iter().map(|t| (t - mean).powi(2)).sum();

    if ss_tot == 0.0 {
        return if ss_res == 0.0 { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}

/// Fraction of exact matches.
pub fn accuracy(y_true: &[usize], y_pred: &[usize]) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let hits = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();
    hits as f64 / y_true.len() as f64
}

/// A fitted estimator and its held-out score.
#[derive(Debug, Clone)]
pub struct FitOutcome {
    pub estimator: Estimator,
    /// Target classes in code order (classification only).
    pub class_labels: Option<Vec<String>>,
    /// R² or accuracy on the test partition, unrounded.
    pub score: f64,
    pub n_train: usize,
    pub n_test: usize,
}

/// Fits the algorithm for a task on the training partition and scores it on
/// the test partition.
#[derive(Debug, Clone, Copy)]
pub struct Trainer<'a> {
    config: &'a TrainingConfig,
}

impl<'a> Trainer<'a> {
    pub fn new(config: &'a TrainingConfig) -> Self {
        Self { config }
    }

    /// Fit and score.
    ///
    /// # Errors
    ///
    /// - [`TrainingError::InsufficientData`] if fewer than
    ///   [`MIN_TRAINING_ROWS`] rows are given
    /// - [`TrainingError::TrainingFailure`] if the target does not suit the
    ///   task or fitting fails
    pub fn fit(
        &self,
        task: TaskKind,
        features: &FeatureMatrix,
        target: &TargetValues,
    ) -> Result<FitOutcome> {
        let n_rows = features.n_rows();
        if n_rows < MIN_TRAINING_ROWS {
            return Err(TrainingError::InsufficientData {
                rows: n_rows,
                required: MIN_TRAINING_ROWS,
            });
        }
        if target.len() != n_rows {
            return Err(TrainingError::TrainingFailure(format!(
                "{} feature rows but {} target values",
                n_rows,
                target.len()
            )));
        }

        let (train_idx, test_idx) = train_test_split(n_rows, self.config.random_seed);
        debug!(
            "Split {} rows into {} train / {} test",
            n_rows,
            train_idx.len(),
            test_idx.len()
        );
        let x_train = features.select(&train_idx);
        let x_test = features.select(&test_idx);

        let (estimator, class_labels, score) = match (task, target) {
            (TaskKind::Regression, TargetValues::Numeric(y)) => {
                let y_train: Vec<f64> = train_idx.iter().map(|&i| y[i]).collect();
                let y_test: Vec<f64> = test_idx.iter().map(|&i| y[i]).collect();

                let model = LinearRegression::fit(&x_train, &y_train)?;
                let score = r2_score(&y_test, &model.predict(&x_test));
                (Estimator::LinearRegression(model), None, score)
            }
            (TaskKind::Classification, TargetValues::Categorical(labels)) => {
                let encoder = LabelEncoder::fit(labels.iter().map(String::as_str));
                let codes: Vec<usize> = labels
                    .iter()
                    .map(|label| encoder.transform(label).unwrap_or_default())
                    .collect();
                let y_train: Vec<usize> = train_idx.iter().map(|&i| codes[i]).collect();
                let y_test: Vec<usize> = test_idx.iter().map(|&i| codes[i]).collect();

                let model =
                    RandomForestClassifier::fit(&x_train, &y_train, encoder.len(), self.config)?;
                let score = accuracy(&y_test, &model.predict(&x_test));
                (
                    Estimator::RandomForestClassifier(model),
                    Some(encoder.classes().to_vec()),
                    score,
                )
            }
            (task, _) => {
                return Err(TrainingError::TrainingFailure(format!(
                    "target values do not match a {} task",
                    task
                )));
            }
        };

        info!("{} on held-out rows: {:.4}", task.score_name(), score);
        Ok(FitOutcome {
            estimator,
            class_labels,
            score,
            n_train: train_idx.len(),
            n_test: test_idx.len(),
        })
    }
}
