//! Trained model wrapper for inference and serialization.
//!
//! This module provides [`TrainedModel`], which bundles a fitted estimator
//! with everything needed to use it on new data:
//!
//! - **Single-instance prediction** via [`predict()`](TrainedModel::predict)
//! - **Batch prediction** via [`predict_batch()`](TrainedModel::predict_batch)
//! - **Serialization** via [`save()`](TrainedModel::save), [`load()`](TrainedModel::load),
//!   [`to_bytes()`](TrainedModel::to_bytes), and [`from_bytes()`](TrainedModel::from_bytes)
//! - **Introspection** via [`feature_importance()`](TrainedModel::feature_importance)
//!   and property accessors
//!
//! # Example
//!
//! ```rust,ignore
//! use lex_training::{TrainedModel, train};
//!
//! let (report, model) = train(&dataset, "department")?;
//! model.save("model.json")?;
//!
//! let prediction = model.predict(&serde_json::json!({
//!     "age": 31,
//!     "salary": 64000.0
//! }))?;
//! println!("Predicted: {}", prediction.prediction);
//!
//! let loaded = TrainedModel::load("model.json")?;
//! let scored = loaded.predict_batch(&new_data)?;
//! ```
//!
//! # Artifact Format
//!
//! Models are stored as JSON. The artifact holds the encoder vocabularies and
//! fill values, so predictions on loaded models match the original exactly.

mod forest;
mod linear;

pub use forest::{DecisionTree, RandomForestClassifier, gini};
pub use linear::LinearRegression;

use forest::argmax;

use crate::config::{Algorithm, TaskKind};
use crate::encoder::FeatureColumn;
use crate::error::{Result, TrainingError};
use crate::types::PredictionResult;
use lex_profiling::Dataset;
use polars::prelude::{DataFrame, NamedFrom, PolarsError, Series};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use tracing::{debug, info};

/// A fitted estimator of one of the supported algorithms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "algorithm", content = "params")]
pub enum Estimator {
    LinearRegression(LinearRegression),
    RandomForestClassifier(RandomForestClassifier),
}

impl Estimator {
    pub fn algorithm(&self) -> Algorithm {
        match self {
            Estimator::LinearRegression(_) => Algorithm::LinearRegression,
            Estimator::RandomForestClassifier(_) => Algorithm::RandomForestClassifier,
        }
    }

    /// Raw importance weight per feature, in feature order.
    pub fn importances(&self) -> Vec<f64> {
        match self {
            Estimator::LinearRegression(model) => model.importances(),
            Estimator::RandomForestClassifier(model) => model.importances().to_vec(),
        }
    }
}

/// A trained model ready for inference.
///
/// Created by [`Pipeline::train`](crate::Pipeline::train) or loaded from an
/// artifact with [`TrainedModel::load`] / [`TrainedModel::from_bytes`].
///
/// # Serialization Formats
///
/// | Method | Use Case |
/// |--------|----------|
/// | [`save()`](Self::save) / [`load()`](Self::load) | File-based persistence |
/// | [`to_bytes()`](Self::to_bytes) / [`from_bytes()`](Self::from_bytes) | Database or network transfer |
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedModel {
    name: String,
    task: TaskKind,
    target_column: String,
    features: Vec<FeatureColumn>,
    class_labels: Option<Vec<String>>,
    estimator: Estimator,
}

// Manual Debug so the (possibly large) forest isn't dumped
impl fmt::Debug for TrainedModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrainedModel")
            .field("name", &self.name)
            .field("task", &self.task)
            .field("algorithm", &self.algorithm())
            .field("target_column", &self.target_column)
            .field("n_features", &self.features.len())
            .finish()
    }
}

impl TrainedModel {
    pub(crate) fn new(
        name: String,
        target_column: String,
        features: Vec<FeatureColumn>,
        class_labels: Option<Vec<String>>,
        estimator: Estimator,
    ) -> Self {
        Self {
            name,
            task: estimator.algorithm().task(),
            target_column,
            features,
            class_labels,
            estimator,
        }
    }

    /// Loads a model from a JSON artifact written by [`save()`](Self::save).
    ///
    /// # Errors
    ///
    /// - [`TrainingError::ModelNotFound`] if the file does not exist
    /// - [`TrainingError::Io`] if it cannot be read
    /// - [`TrainingError::Json`] if it is not a valid artifact
    #[must_use = "returns the loaded model; use it or handle the error"]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(TrainingError::ModelNotFound {
                path: path.display().to_string(),
            });
        }

        let bytes = std::fs::read(path)?;
        let model = Self::from_bytes(&bytes)?;
        debug!("Loaded model '{}' from {}", model.name, path.display());
        Ok(model)
    }

    /// Saves the model as a JSON artifact. Parent directories must exist.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_bytes()?)?;
        info!("Saved model '{}' to {}", self.name, path.display());
        Ok(())
    }

    /// Exports the model as JSON bytes.
    #[must_use = "returns serialized model bytes; use them or handle the error"]
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Restores a model from bytes produced by [`to_bytes()`](Self::to_bytes).
    #[must_use = "returns the loaded model; use it or handle the error"]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Predicts the target for a single instance.
    ///
    /// `instance` is a JSON object keyed by feature name. Every feature must
    /// be present; `null` counts as missing and is encoded the same way
    /// missing values were during training. Extra keys are ignored.
    ///
    /// # Errors
    ///
    /// [`TrainingError::InferenceError`] if the input is not an object, a
    /// feature is absent, a numeric feature is not a number, or a categorical
    /// value was never seen during training.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let prediction = model.predict(&json!({"age": 25, "city": "Boston"}))?;
    /// if let Some(conf) = prediction.confidence {
    ///     println!("Confidence: {:.2}%", conf * 100.0);
    /// }
    /// ```
    #[must_use = "returns the prediction result; use it or handle the error"]
    pub fn predict(&self, instance: &Value) -> Result<PredictionResult> {
        let object = instance.as_object().ok_or_else(|| {
            TrainingError::InferenceError("Prediction input must be a JSON object".to_string())
        })?;

        let row = self
            .features
            .iter()
            .map(|feature| {
                let value = object.get(&feature.name).ok_or_else(|| {
                    TrainingError::InferenceError(format!(
                        "Missing feature '{}' in prediction input",
                        feature.name
                    ))
                })?;
                feature.encode_value(Some(value))
            })
            .collect::<Result<Vec<f64>>>()?;

        Ok(self.predict_encoded(&row))
    }

    /// Makes predictions for every row of a frame.
    ///
    /// The frame must contain every feature column; the target column may be
    /// present and is ignored. Returns a copy of the frame with a
    /// `prediction` column appended and, for classifiers, one
    /// `probability_<class>` column per class.
    #[must_use = "returns DataFrame with predictions; use it or handle the error"]
    pub fn predict_batch(&self, df: &DataFrame) -> Result<DataFrame> {
        let dataset = Dataset::new(df.clone());
        let columns = self
            .features
            .iter()
            .map(|feature| feature.encode_column(&dataset))
            .collect::<Result<Vec<Vec<f64>>>>()?;
        let rows: Vec<Vec<f64>> = (0..df.height())
            .map(|i| columns.iter().map(|col| col[i]).collect())
            .collect();

        let mut out = df.clone();
        let failed = |e: PolarsError| {
            TrainingError::InferenceError(format!("Failed to attach predictions: {}", e))
        };

        match &self.estimator {
            Estimator::LinearRegression(model) => {
                let predictions = model.predict(&rows);
                out.with_column(Series::new("prediction".into(), predictions))
                    .map_err(failed)?;
            }
            Estimator::RandomForestClassifier(model) => {
                let labels = self.class_labels.as_deref().unwrap_or_default();
                let proba: Vec<Vec<f64>> =
                    rows.iter().map(|row| model.predict_proba_row(row)).collect();
                let predictions: Vec<String> = proba
                    .iter()
                    .map(|p| label_for(labels, argmax(p)))
                    .collect();
                out.with_column(Series::new("prediction".into(), predictions))
                    .map_err(failed)?;
                for (k, label) in labels.iter().enumerate() {
                    let column: Vec<f64> = proba.iter().map(|p| p[k]).collect();
                    out.with_column(Series::new(format!("probability_{}", label).into(), column))
                        .map_err(failed)?;
                }
            }
        }

        Ok(out)
    }

    fn predict_encoded(&self, row: &[f64]) -> PredictionResult {
        match &self.estimator {
            Estimator::LinearRegression(model) => PredictionResult {
                prediction: Value::from(model.predict_row(row)),
                probabilities: None,
                confidence: None,
            },
            Estimator::RandomForestClassifier(model) => {
                let labels = self.class_labels.as_deref().unwrap_or_default();
                let proba = model.predict_proba_row(row);
                let best = argmax(&proba);
                let probabilities: HashMap<String, f64> = labels
                    .iter()
                    .cloned()
                    .zip(proba.iter().copied())
                    .collect();
                PredictionResult {
                    prediction: Value::String(label_for(labels, best)),
                    probabilities: Some(probabilities),
                    confidence: proba.get(best).copied(),
                }
            }
        }
    }

    /// Feature weights sorted descending; ties keep feature order.
    ///
    /// Linear models report `|coefficient|`; forests report normalized mean
    /// decrease in impurity.
    pub fn feature_importance(&self) -> Vec<(String, f64)> {
        let mut importance: Vec<(String, f64)> = self
            .features
            .iter()
            .map(|f| f.name.clone())
            .zip(self.estimator.importances())
            .collect();
        importance.sort_by(|a, b| b.1.total_cmp(&a.1));
        importance
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn task(&self) -> TaskKind {
        self.task
    }

    pub fn algorithm(&self) -> Algorithm {
        self.estimator.algorithm()
    }

    pub fn target_column(&self) -> &str {
        &self.target_column
    }

    pub fn feature_names(&self) -> Vec<String> {
        self.features.iter().map(|f| f.name.clone()).collect()
    }

    pub fn features(&self) -> &[FeatureColumn] {
        &self.features
    }

    /// Class labels in code order (classification only).
    pub fn class_labels(&self) -> Option<&[String]> {
        self.class_labels.as_deref()
    }

    pub fn estimator(&self) -> &Estimator {
        &self.estimator
    }
}

fn label_for(labels: &[String], code: usize) -> String {
    labels.get(code).cloned().unwrap_or_else(|| code.to_string())
}
