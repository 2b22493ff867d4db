//! Training pipeline implementation.
//!
//! This module provides the [`Pipeline`] struct and its builder. The pipeline
//! runs every stage of a training request:
//!
//! 1. **Initializing** - Validate the target and select the task
//! 2. **Preprocessing** - Drop rows with a missing target, encode features
//! 3. **Training** - Fit the selected algorithm on the 80% partition
//! 4. **Evaluation** - Score on the held-out 20%
//! 5. **Diagnostics** - Judge the score and the feature importance
//!
//! # Example
//!
//! ```rust,ignore
//! use lex_training::{Pipeline, TrainingConfig};
//!
//! let pipeline = Pipeline::builder()
//!     .config(TrainingConfig::builder().random_seed(7).build()?)
//!     .on_progress(|update| {
//!         println!("[{}] {:.0}% - {}", update.stage, update.progress * 100.0, update.message);
//!     })
//!     .build()?;
//!
//! let (report, model) = pipeline.train(&dataset, "department")?;
//! println!("{} {}: {}", report.algorithm, report.score_name, report.score);
//! model.save(format!("{}.json", report.model_name))?;
//! ```
//!
//! # Thread Safety
//!
//! [`Pipeline`] is `Send + Sync` and holds no per-run state, so one pipeline
//! can train on different datasets from several threads.

use crate::config::TrainingConfig;
use crate::diagnostics::{diagnose, model_assumptions};
use crate::encoder::{drop_missing_targets, prepare_features};
use crate::error::{Result, ResultExt, TrainingError};
use crate::model::TrainedModel;
use crate::progress::{ProgressCallback, ProgressUpdate, TrainingStage};
use crate::selector::determine_model_type;
use crate::trainer::{MIN_TRAINING_ROWS, SPLIT_LABEL, Trainer};
use crate::types::TrainingReport;
use chrono::Local;
use lex_profiling::Dataset;
use lex_profiling::utils::round_to;
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

/// Decimal places kept in [`TrainingReport::score`].
const SCORE_DECIMAL_PLACES: u32 = 4;

/// Preprocessing steps every run applies.
const PREPROCESSING_STEPS: [&str; 2] = ["categorical_encoding", "missing_value_imputation"];

/// The training pipeline.
///
/// Use [`Pipeline::builder()`] to construct one.
///
/// ```rust,ignore
/// let pipeline = Pipeline::builder()
///     .on_progress(|u| println!("{}", u.message))
///     .build()?;
///
/// let (report, model) = pipeline.train(&dataset, "price")?;
/// ```
pub struct Pipeline {
    config: TrainingConfig,
    progress_callback: Option<ProgressCallback>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("config", &self.config)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Pipeline {
    /// Create a new builder for `Pipeline`.
    #[must_use]
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// Train a model predicting `target_column` from every other column.
    ///
    /// Numeric targets train a linear regression scored with R²; all other
    /// targets train a random forest scored with accuracy.
    ///
    /// # Errors
    ///
    /// - [`InvalidTarget`](TrainingError::InvalidTarget): the column is absent
    ///   (names are case-sensitive)
    /// - [`InsufficientData`](TrainingError::InsufficientData): fewer than 10
    ///   rows have a target value
    /// - [`TrainingFailure`](TrainingError::TrainingFailure): there are no
    ///   feature columns, or encoding or fitting failed
    ///
    /// On error the progress callback receives a
    /// [`Failed`](TrainingStage::Failed) update carrying the message.
    pub fn train(
        &self,
        dataset: &Dataset,
        target_column: &str,
    ) -> Result<(TrainingReport, TrainedModel)> {
        let result = self.run(dataset, target_column);
        if let Err(e) = &result {
            warn!("Training on '{}' failed: {}", target_column, e);
            self.report(TrainingStage::Failed, e.to_string());
        }
        result
    }

    /// Load a CSV file and train on it.
    pub fn train_csv(
        &self,
        path: impl AsRef<Path>,
        target_column: &str,
    ) -> Result<(TrainingReport, TrainedModel)> {
        let path = path.as_ref();
        let dataset = Dataset::from_csv(path)
            .context(format!("Loading training data from {}", path.display()))?;
        self.train(&dataset, target_column)
    }

    fn run(&self, dataset: &Dataset, target_column: &str) -> Result<(TrainingReport, TrainedModel)> {
        let start = Instant::now();

        self.report(
            TrainingStage::Initializing,
            format!("Preparing to train on '{}'", target_column),
        );
        let (task, algorithm) = determine_model_type(dataset, target_column)?;

        self.report(
            TrainingStage::Preprocessing,
            "Dropping rows without a target and encoding features",
        );
        let clean = drop_missing_targets(dataset, target_column)?;
        let n_samples = clean.height();
        if n_samples < MIN_TRAINING_ROWS {
            return Err(TrainingError::InsufficientData {
                rows: n_samples,
                required: MIN_TRAINING_ROWS,
            });
        }

        let (features, target) = prepare_features(&clean, target_column)?;
        if features.n_features() == 0 {
            return Err(TrainingError::TrainingFailure(format!(
                "no feature columns besides target '{}'",
                target_column
            )));
        }
        let n_features = features.n_features();

        self.report(TrainingStage::Training, format!("Fitting {}", algorithm));
        let outcome = Trainer::new(&self.config).fit(task, &features, &target)?;

        self.report(
            TrainingStage::Evaluation,
            format!(
                "{} on {} held-out rows: {:.4}",
                task.score_name(),
                outcome.n_test,
                outcome.score
            ),
        );
        let model_name = model_name(target_column);
        let model = TrainedModel::new(
            model_name.clone(),
            target_column.to_string(),
            features.into_columns(),
            outcome.class_labels,
            outcome.estimator,
        );

        self.report(
            TrainingStage::Diagnostics,
            "Checking score and feature importance reliability",
        );
        let feature_importance = model.feature_importance();
        let diagnostics = diagnose(outcome.score, task, &feature_importance, n_samples);

        let report = TrainingReport {
            model_name,
            target_column: target_column.to_string(),
            task,
            algorithm,
            score: round_to(outcome.score, SCORE_DECIMAL_PLACES),
            score_name: task.score_name().to_string(),
            feature_importance,
            n_features,
            n_samples,
            train_test_split: SPLIT_LABEL.to_string(),
            preprocessing_applied: PREPROCESSING_STEPS.iter().map(|s| s.to_string()).collect(),
            model_assumptions: model_assumptions(task),
            diagnostics,
            training_time_seconds: start.elapsed().as_secs_f64(),
        };

        info!(
            "Trained {} for '{}': {} = {} (trust: {})",
            report.algorithm,
            target_column,
            report.score_name,
            report.score,
            report.diagnostics.trust_level
        );
        self.report(TrainingStage::Complete, "Training complete");
        Ok((report, model))
    }

    fn report(&self, stage: TrainingStage, message: impl Into<String>) {
        if let Some(callback) = &self.progress_callback {
            callback(ProgressUpdate::new(stage, message));
        }
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }
}

/// Train with the default configuration and no progress reporting.
///
/// See [`Pipeline::train`] for the errors.
pub fn train(dataset: &Dataset, target_column: &str) -> Result<(TrainingReport, TrainedModel)> {
    Pipeline::builder().build()?.train(dataset, target_column)
}

/// `model_{target}_{YYYYmmdd_HHMMSS}_{suffix}` in local time.
///
/// The random suffix keeps runs within the same second apart. Characters
/// outside `[A-Za-z0-9_-]` in the target become `_` so the name is safe to
/// use as a file name.
fn model_name(target_column: &str) -> String {
    let target: String = target_column
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!(
        "model_{}_{}_{:08x}",
        target,
        Local::now().format("%Y%m%d_%H%M%S"),
        rand::random::<u32>()
    )
}

/// Builder for [`Pipeline`].
///
/// # Optional Configuration
///
/// - [`config()`](Self::config): Training configuration (default: [`TrainingConfig::default()`])
/// - [`on_progress()`](Self::on_progress): Progress callback for monitoring
#[derive(Default)]
pub struct PipelineBuilder {
    config: Option<TrainingConfig>,
    progress_callback: Option<ProgressCallback>,
}

impl std::fmt::Debug for PipelineBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineBuilder")
            .field("config", &self.config)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl PipelineBuilder {
    /// Set the training configuration.
    #[must_use]
    pub fn config(mut self, config: TrainingConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the progress callback (optional).
    ///
    /// The callback will be invoked with [`ProgressUpdate`] structs each time
    /// training enters a new stage. It runs inline and should return quickly.
    #[must_use]
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_callback = Some(std::sync::Arc::new(callback));
        self
    }

    /// Build the pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`TrainingError::InvalidConfig`] if the configuration fails
    /// validation.
    pub fn build(self) -> Result<Pipeline> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        Ok(Pipeline {
            config,
            progress_callback: self.progress_callback,
        })
    }
}
