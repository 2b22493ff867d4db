//! Feature encoding.
//!
//! Turns a [`Dataset`] into a dense numeric [`FeatureMatrix`] plus the target
//! vector. Categorical columns are stringified (missing values become
//! [`MISSING_LABEL`]) and label-encoded with one independent encoder per
//! column, codes assigned in sorted label order. Missing numeric values are
//! replaced by the column mean over the rows passed in.
//!
//! The encoding is recorded per column in [`FeatureColumn`] so a trained
//! model can encode prediction inputs the same way.

use crate::error::{Result, TrainingError};
use lex_profiling::{ColumnKind, Dataset};
use polars::prelude::{BooleanChunked, NewChunkedArray};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use tracing::debug;

/// Label substituted for missing categorical values before encoding.
pub const MISSING_LABEL: &str = "<missing>";

/// Maps distinct string labels to integer codes.
///
/// Codes follow the sorted order of the distinct labels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    /// Learn the vocabulary from a set of labels.
    pub fn fit<'a>(labels: impl IntoIterator<Item = &'a str>) -> Self {
        let classes: BTreeSet<&str> = labels.into_iter().collect();
        Self {
            classes: classes.into_iter().map(str::to_string).collect(),
        }
    }

    /// Code of a label, or `None` if it was never seen.
    pub fn transform(&self, label: &str) -> Option<usize> {
        self.classes
            .binary_search_by(|class| class.as_str().cmp(label))
            .ok()
    }

    /// Label for a code.
    pub fn inverse_transform(&self, code: usize) -> Option<&str> {
        self.classes.get(code).map(String::as_str)
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

/// How one feature column is turned into numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeatureEncoding {
    /// Raw value; missing values take `fill_value`.
    Numeric { fill_value: f64 },
    /// Label code from the column's own encoder.
    Categorical { encoder: LabelEncoder },
}

/// A feature column and its learned encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureColumn {
    pub name: String,
    pub encoding: FeatureEncoding,
}

impl FeatureColumn {
    /// Encode a single JSON value for this column.
    ///
    /// `None` and `null` are treated as missing.
    pub fn encode_value(&self, value: Option<&Value>) -> Result<f64> {
        let value = value.filter(|v| !v.is_null());
        match &self.encoding {
            FeatureEncoding::Numeric { fill_value } => match value {
                None => Ok(*fill_value),
                Some(Value::Number(n)) => n.as_f64().ok_or_else(|| self.bad_input(value)),
                Some(Value::String(s)) => s.trim().parse::<f64>().map_err(|_| self.bad_input(value)),
                Some(_) => Err(self.bad_input(value)),
            },
            FeatureEncoding::Categorical { encoder } => {
                let label = match value {
                    None => MISSING_LABEL.to_string(),
                    Some(Value::String(s)) => s.clone(),
                    Some(other) => other.to_string(),
                };
                encoder.transform(&label).map(|code| code as f64).ok_or_else(|| {
                    TrainingError::InferenceError(format!(
                        "Unknown category '{}' for feature '{}'",
                        label, self.name
                    ))
                })
            }
        }
    }

    /// Encode this feature for every row of `dataset`.
    ///
    /// # Errors
    ///
    /// [`TrainingError::InferenceError`] if the column is absent, cannot be
    /// read as this feature's kind, or holds an unseen category.
    pub fn encode_column(&self, dataset: &Dataset) -> Result<Vec<f64>> {
        let unreadable = |e: lex_profiling::ProfilingError| {
            TrainingError::InferenceError(format!("Feature '{}': {}", self.name, e))
        };
        match &self.encoding {
            FeatureEncoding::Numeric { fill_value } => Ok(dataset
                .numeric_column(&self.name)
                .map_err(unreadable)?
                .into_iter()
                .map(|v| v.unwrap_or(*fill_value))
                .collect()),
            FeatureEncoding::Categorical { .. } => dataset
                .string_column(&self.name)
                .map_err(unreadable)?
                .into_iter()
                .map(|v| self.encode_value(v.map(Value::String).as_ref()))
                .collect(),
        }
    }

    fn bad_input(&self, value: Option<&Value>) -> TrainingError {
        TrainingError::InferenceError(format!(
            "Feature '{}' expects a number, got {}",
            self.name,
            value.map(Value::to_string).unwrap_or_default()
        ))
    }
}

/// Dense row-major feature matrix with its column encodings.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    columns: Vec<FeatureColumn>,
    rows: Vec<Vec<f64>>,
}

impl FeatureMatrix {
    pub fn columns(&self) -> &[FeatureColumn] {
        &self.columns
    }

    pub fn names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_features(&self) -> usize {
        self.columns.len()
    }

    /// Copy out the rows at the given positions.
    pub fn select(&self, indices: &[usize]) -> Vec<Vec<f64>> {
        indices.iter().map(|&i| self.rows[i].clone()).collect()
    }

    pub(crate) fn into_columns(self) -> Vec<FeatureColumn> {
        self.columns
    }
}

/// Target vector, typed by the target column's kind.
#[derive(Debug, Clone, PartialEq)]
pub enum TargetValues {
    Numeric(Vec<f64>),
    Categorical(Vec<String>),
}

impl TargetValues {
    pub fn len(&self) -> usize {
        match self {
            TargetValues::Numeric(v) => v.len(),
            TargetValues::Categorical(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Fail with `InvalidTarget` unless the dataset has the column.
pub fn ensure_target(dataset: &Dataset, target_column: &str) -> Result<ColumnKind> {
    dataset.schema().kind_of(target_column).ok_or_else(|| {
        TrainingError::InvalidTarget(format!(
            "Target column '{}' not found in dataset",
            target_column
        ))
    })
}

/// Keep only the rows whose target value is present.
pub fn drop_missing_targets(dataset: &Dataset, target_column: &str) -> Result<Dataset> {
    let present: Vec<bool> = match ensure_target(dataset, target_column)? {
        ColumnKind::Numeric => dataset
            .numeric_column(target_column)
            .map_err(|e| encoding_failure(target_column, e))?
            .iter()
            .map(Option::is_some)
            .collect(),
        ColumnKind::Categorical => dataset
            .string_column(target_column)
            .map_err(|e| encoding_failure(target_column, e))?
            .iter()
            .map(Option::is_some)
            .collect(),
    };

    let dropped = present.iter().filter(|keep| !**keep).count();
    if dropped == 0 {
        return Ok(dataset.clone());
    }
    debug!(
        "Dropping {} rows with missing '{}'",
        dropped, target_column
    );

    let mask = BooleanChunked::from_slice("target_present".into(), &present);
    let frame = dataset
        .frame()
        .filter(&mask)
        .map_err(|e| TrainingError::TrainingFailure(format!("Failed to drop rows: {}", e)))?;
    Ok(Dataset::with_schema(frame, dataset.schema().clone())?)
}

/// Split a dataset into an encoded feature matrix and the target vector.
///
/// # Errors
///
/// - [`TrainingError::InvalidTarget`] if the target column is absent or still
///   holds missing values
/// - [`TrainingError::TrainingFailure`] if a feature column cannot be read
pub fn prepare_features(
    dataset: &Dataset,
    target_column: &str,
) -> Result<(FeatureMatrix, TargetValues)> {
    let target_kind = ensure_target(dataset, target_column)?;
    let n_rows = dataset.height();

    let mut columns = Vec::new();
    let mut encoded: Vec<Vec<f64>> = Vec::new();

    for (name, kind) in dataset.schema().iter() {
        if name == target_column {
            continue;
        }

        let (encoding, values) = match kind {
            ColumnKind::Numeric => {
                let raw = dataset
                    .numeric_column(name)
                    .map_err(|e| encoding_failure(name, e))?;
                let present: Vec<f64> = raw.iter().flatten().copied().collect();
                let fill_value = if present.is_empty() {
                    0.0
                } else {
                    present.iter().sum::<f64>() / present.len() as f64
                };
                let values = raw.iter().map(|v| v.unwrap_or(fill_value)).collect();
                (FeatureEncoding::Numeric { fill_value }, values)
            }
            ColumnKind::Categorical => {
                let labels = stringify(
                    dataset
                        .string_column(name)
                        .map_err(|e| encoding_failure(name, e))?,
                );
                let encoder = LabelEncoder::fit(labels.iter().map(String::as_str));
                let values = labels
                    .iter()
                    .map(|label| encoder.transform(label).unwrap_or_default() as f64)
                    .collect();
                (FeatureEncoding::Categorical { encoder }, values)
            }
        };

        columns.push(FeatureColumn {
            name: name.to_string(),
            encoding,
        });
        encoded.push(values);
    }

    let rows = (0..n_rows)
        .map(|i| encoded.iter().map(|col| col[i]).collect())
        .collect();

    let missing_target = || {
        TrainingError::InvalidTarget(format!(
            "Target column '{}' contains missing values",
            target_column
        ))
    };
    let target = match target_kind {
        ColumnKind::Numeric => TargetValues::Numeric(
            dataset
                .numeric_column(target_column)
                .map_err(|e| encoding_failure(target_column, e))?
                .into_iter()
                .collect::<Option<Vec<f64>>>()
                .ok_or_else(missing_target)?,
        ),
        ColumnKind::Categorical => TargetValues::Categorical(
            dataset
                .string_column(target_column)
                .map_err(|e| encoding_failure(target_column, e))?
                .into_iter()
                .collect::<Option<Vec<String>>>()
                .ok_or_else(missing_target)?,
        ),
    };

    debug!(
        "Encoded {} rows x {} features",
        n_rows,
        columns.len()
    );
    Ok((FeatureMatrix { columns, rows }, target))
}

/// Replace missing labels with [`MISSING_LABEL`].
pub fn stringify(values: Vec<Option<String>>) -> Vec<String> {
    values
        .into_iter()
        .map(|v| v.unwrap_or_else(|| MISSING_LABEL.to_string()))
        .collect()
}

fn encoding_failure(column: &str, err: lex_profiling::ProfilingError) -> TrainingError {
    TrainingError::TrainingFailure(format!("Failed to encode column '{}': {}", column, err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lex_profiling::Schema;
    use polars::prelude::df;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn mixed() -> Dataset {
        Dataset::new(
            df![
                "age" => [Some(20.0f64), None, Some(40.0)],
                "city" => [Some("Paris"), None, Some("Berlin")],
                "label" => ["a", "b", "a"],
            ]
            .unwrap(),
        )
    }

    #[test]
    fn test_label_encoder_sorted_codes() {
        let encoder = LabelEncoder::fit(["IT", "HR", "IT", "Finance"]);
        assert_eq!(encoder.classes(), &["Finance", "HR", "IT"]);
        assert_eq!(encoder.transform("Finance"), Some(0));
        assert_eq!(encoder.transform("IT"), Some(2));
        assert_eq!(encoder.transform("Sales"), None);
        assert_eq!(encoder.inverse_transform(1), Some("HR"));
        assert_eq!(encoder.inverse_transform(3), None);
    }

    #[test]
    fn test_prepare_features_encodes_and_imputes() {
        let (matrix, target) = prepare_features(&mixed(), "label").unwrap();

        assert_eq!(matrix.names(), vec!["age", "city"]);
        // age mean over present values is 30; city codes: <missing>=0, Berlin=1, Paris=2
        assert_eq!(
            matrix.rows(),
            &[vec![20.0, 2.0], vec![30.0, 0.0], vec![40.0, 1.0]]
        );
        assert_eq!(
            target,
            TargetValues::Categorical(vec!["a".into(), "b".into(), "a".into()])
        );
    }

    #[test]
    fn test_encoders_are_independent_per_column() {
        let dataset = Dataset::new(
            df![
                "x" => ["b", "a"],
                "y" => ["z", "b"],
                "t" => [1.0f64, 2.0],
            ]
            .unwrap(),
        );
        let (matrix, _) = prepare_features(&dataset, "t").unwrap();
        // "b" is code 1 in x but code 0 in y
        assert_eq!(matrix.rows(), &[vec![1.0, 1.0], vec![0.0, 0.0]]);
    }

    #[test]
    fn test_all_missing_numeric_feature_filled_with_zero() {
        let dataset = Dataset::new(
            df![
                "empty" => [None::<f64>, None],
                "t" => [1.0f64, 2.0],
            ]
            .unwrap(),
        );
        let (matrix, _) = prepare_features(&dataset, "t").unwrap();
        assert_eq!(matrix.rows(), &[vec![0.0], vec![0.0]]);
    }

    #[test]
    fn test_missing_target_column() {
        let err = prepare_features(&mixed(), "salary").unwrap_err();
        assert!(matches!(err, TrainingError::InvalidTarget(_)));
        assert!(err.to_string().contains("salary"));
    }

    #[test]
    fn test_drop_missing_targets() {
        let dataset = Dataset::new(
            df![
                "x" => [1.0f64, 2.0, 3.0, 4.0],
                "t" => [Some(1.0f64), None, Some(f64::NAN), Some(4.0)],
            ]
            .unwrap(),
        );
        let clean = drop_missing_targets(&dataset, "t").unwrap();
        assert_eq!(clean.height(), 2);
        assert_eq!(
            clean.numeric_column("x").unwrap(),
            vec![Some(1.0), Some(4.0)]
        );
        assert_eq!(clean.schema(), dataset.schema());
    }

    #[test]
    fn test_unreadable_target_is_training_failure() {
        let frame = df![
            "x" => [1.0f64, 2.0, 3.0],
            "t" => ["high", "low", "high"],
        ]
        .unwrap();
        let schema = Schema::new([("x", ColumnKind::Numeric), ("t", ColumnKind::Numeric)]);
        let dataset = Dataset::with_schema(frame, schema).unwrap();

        let err = drop_missing_targets(&dataset, "t").unwrap_err();
        assert_eq!(err.error_code(), "TRAINING_FAILURE");
        assert!(err.to_string().contains("'t'"));
    }

    #[test]
    fn test_absent_target_is_invalid_target() {
        let err = drop_missing_targets(&mixed(), "Label").unwrap_err();
        assert_eq!(err.error_code(), "INVALID_TARGET");
    }

    #[test]
    fn test_prepare_features_rejects_missing_target_values() {
        let dataset = Dataset::new(
            df![
                "x" => [1.0f64, 2.0],
                "t" => [Some("a"), None],
            ]
            .unwrap(),
        );
        let err = prepare_features(&dataset, "t").unwrap_err();
        assert!(err.to_string().contains("missing values"));
    }

    #[test]
    fn test_encode_value() {
        let (matrix, _) = prepare_features(&mixed(), "label").unwrap();
        let age = &matrix.columns()[0];
        let city = &matrix.columns()[1];

        assert_eq!(age.encode_value(Some(&json!(25))).unwrap(), 25.0);
        assert_eq!(age.encode_value(Some(&json!("31.5"))).unwrap(), 31.5);
        assert_eq!(age.encode_value(None).unwrap(), 30.0);
        assert_eq!(age.encode_value(Some(&Value::Null)).unwrap(), 30.0);
        assert!(age.encode_value(Some(&json!(true))).is_err());

        assert_eq!(city.encode_value(Some(&json!("Berlin"))).unwrap(), 1.0);
        assert_eq!(city.encode_value(None).unwrap(), 0.0);
        let err = city.encode_value(Some(&json!("Rome"))).unwrap_err();
        assert_eq!(err.error_code(), "INFERENCE_ERROR");
    }
}
