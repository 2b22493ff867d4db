//! Dataset ingestion and the explicit column schema.
//!
//! A [`Dataset`] pairs a polars [`DataFrame`] with a [`Schema`] that records
//! the declared [`ColumnKind`] of every column. The schema is computed once,
//! when the dataset is built, and every downstream component reads column
//! kinds from it instead of re-inspecting dtypes.

use crate::error::{ProfilingError, Result, ResultExt};
use crate::utils::{is_numeric_dtype, numeric_values, string_values};
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Declared kind of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// Integer or floating point values.
    Numeric,
    /// Everything else: strings, booleans, categoricals, temporal values.
    Categorical,
}

impl ColumnKind {
    /// Map a polars dtype to its column kind.
    pub fn from_dtype(dtype: &DataType) -> Self {
        if is_numeric_dtype(dtype) {
            ColumnKind::Numeric
        } else {
            ColumnKind::Categorical
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnKind::Numeric => "numeric",
            ColumnKind::Categorical => "categorical",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnKind::Numeric)
    }
}

/// Ordered mapping of column name to declared kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    columns: Vec<(String, ColumnKind)>,
}

impl Schema {
    /// Build a schema from explicit `(name, kind)` pairs.
    pub fn new(columns: impl IntoIterator<Item = (impl Into<String>, ColumnKind)>) -> Self {
        Self {
            columns: columns
                .into_iter()
                .map(|(name, kind)| (name.into(), kind))
                .collect(),
        }
    }

    /// Derive a schema from a frame's dtypes.
    pub fn infer(frame: &DataFrame) -> Self {
        Self {
            columns: frame
                .get_columns()
                .iter()
                .map(|col| (col.name().to_string(), ColumnKind::from_dtype(col.dtype())))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Kind of the named column, if the schema has it.
    pub fn kind_of(&self, name: &str) -> Option<ColumnKind> {
        self.columns
            .iter()
            .find(|(col, _)| col == name)
            .map(|(_, kind)| *kind)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.kind_of(name).is_some()
    }

    /// Iterate over `(name, kind)` in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, ColumnKind)> {
        self.columns.iter().map(|(name, kind)| (name.as_str(), *kind))
    }

    pub fn names(&self) -> Vec<String> {
        self.columns.iter().map(|(name, _)| name.clone()).collect()
    }

    /// Names of all columns of the given kind, in column order.
    pub fn columns_of(&self, kind: ColumnKind) -> Vec<&str> {
        self.iter()
            .filter(|(_, k)| *k == kind)
            .map(|(name, _)| name)
            .collect()
    }
}

/// A tabular dataset: a polars frame plus its declared schema.
#[derive(Debug, Clone)]
pub struct Dataset {
    frame: DataFrame,
    schema: Schema,
}

impl Dataset {
    /// Wrap a frame, inferring the schema from its dtypes.
    pub fn new(frame: DataFrame) -> Self {
        let schema = Schema::infer(&frame);
        Self { frame, schema }
    }

    /// Wrap a frame with a caller-supplied schema.
    ///
    /// The schema must name exactly the frame's columns, in the same order.
    pub fn with_schema(frame: DataFrame, schema: Schema) -> Result<Self> {
        let frame_names: Vec<String> = frame
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect();
        let schema_names = schema.names();

        if frame_names != schema_names {
            return Err(ProfilingError::MalformedDataset(format!(
                "schema columns {:?} do not match dataset columns {:?}",
                schema_names, frame_names
            )));
        }

        Ok(Self { frame, schema })
    }

    /// Load a CSV file with a header row.
    pub fn from_csv(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let frame = CsvReadOptions::default()
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(path.to_path_buf()))
            .context(format!("Failed to open {}", path.display()))?
            .finish()
            .context(format!("Failed to parse {}", path.display()))?;

        debug!("Loaded {} with shape {:?}", path.display(), frame.shape());
        Ok(Self::new(frame))
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.frame.height()
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.frame.width()
    }

    pub fn is_empty(&self) -> bool {
        self.height() == 0 || self.width() == 0
    }

    /// Look up a column as a materialized series.
    pub fn series(&self, name: &str) -> Result<&Series> {
        self.frame
            .column(name)
            .map(|col| col.as_materialized_series())
            .map_err(|_| ProfilingError::ColumnNotFound(name.to_string()))
    }

    /// Values of a column coerced to `f64`; missing values are `None`.
    pub fn numeric_column(&self, name: &str) -> Result<Vec<Option<f64>>> {
        numeric_values(self.series(name)?)
    }

    /// Values of a column stringified; missing values are `None`.
    pub fn string_column(&self, name: &str) -> Result<Vec<Option<String>>> {
        string_values(self.series(name)?)
    }

    /// Number of missing cells in a column.
    ///
    /// For numeric columns NaN counts as missing alongside null. A column
    /// declared numeric over text counts nulls only.
    pub fn missing_count(&self, name: &str) -> Result<usize> {
        match self.schema.kind_of(name) {
            Some(ColumnKind::Numeric) => {
                let series = self.series(name)?;
                if is_numeric_dtype(series.dtype()) {
                    Ok(numeric_values(series)?.iter().filter(|v| v.is_none()).count())
                } else {
                    // unparsable text is a column failure, not missing data
                    Ok(series.null_count())
                }
            }
            Some(ColumnKind::Categorical) => Ok(self.series(name)?.null_count()),
            None => Err(ProfilingError::ColumnNotFound(name.to_string())),
        }
    }

    /// Number of rows that exactly repeat an earlier row.
    pub fn duplicate_row_count(&self) -> Result<usize> {
        if self.width() == 0 {
            return Ok(0);
        }
        let unique = self
            .frame
            .unique::<&str, &str>(None, UniqueKeepStrategy::First, None)
            .context("Failed to detect duplicate rows")?;
        Ok(self.height() - unique.height())
    }

    /// Estimated in-memory size of the frame in megabytes.
    pub fn estimated_size_mb(&self) -> f64 {
        self.frame.estimated_size() as f64 / 1024.0 / 1024.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_frame() -> DataFrame {
        df![
            "age" => [25i64, 30, 35],
            "salary" => [Some(50000.0f64), None, Some(70000.0)],
            "department" => [Some("IT"), Some("HR"), None],
        ]
        .unwrap()
    }

    #[test]
    fn test_schema_inference() {
        let dataset = Dataset::new(sample_frame());
        let schema = dataset.schema();

        assert_eq!(schema.len(), 3);
        assert_eq!(schema.kind_of("age"), Some(ColumnKind::Numeric));
        assert_eq!(schema.kind_of("salary"), Some(ColumnKind::Numeric));
        assert_eq!(schema.kind_of("department"), Some(ColumnKind::Categorical));
        assert_eq!(schema.kind_of("missing"), None);
        assert_eq!(schema.columns_of(ColumnKind::Numeric), vec!["age", "salary"]);
    }

    #[test]
    fn test_boolean_is_categorical() {
        let frame = df!["flag" => [true, false, true]].unwrap();
        let dataset = Dataset::new(frame);
        assert_eq!(
            dataset.schema().kind_of("flag"),
            Some(ColumnKind::Categorical)
        );
    }

    #[test]
    fn test_with_schema_mismatch_is_malformed() {
        let schema = Schema::new([("age", ColumnKind::Numeric)]);
        let err = Dataset::with_schema(sample_frame(), schema).unwrap_err();
        assert_eq!(err.error_code(), "MALFORMED_DATASET");
        assert!(err.is_catastrophic());
    }

    #[test]
    fn test_with_schema_overrides_kind() {
        let schema = Schema::new([
            ("age", ColumnKind::Categorical),
            ("salary", ColumnKind::Numeric),
            ("department", ColumnKind::Categorical),
        ]);
        let dataset = Dataset::with_schema(sample_frame(), schema).unwrap();
        assert_eq!(
            dataset.schema().kind_of("age"),
            Some(ColumnKind::Categorical)
        );
    }

    #[test]
    fn test_missing_counts() {
        let dataset = Dataset::new(sample_frame());
        assert_eq!(dataset.missing_count("age").unwrap(), 0);
        assert_eq!(dataset.missing_count("salary").unwrap(), 1);
        assert_eq!(dataset.missing_count("department").unwrap(), 1);
        assert!(dataset.missing_count("nope").is_err());
    }

    #[test]
    fn test_duplicate_row_count() {
        let frame = df![
            "a" => [1i64, 1, 2, 1],
            "b" => ["x", "x", "y", "z"],
        ]
        .unwrap();
        let dataset = Dataset::new(frame);
        assert_eq!(dataset.duplicate_row_count().unwrap(), 1);
    }

    #[test]
    fn test_empty_dataset() {
        let dataset = Dataset::new(DataFrame::empty());
        assert!(dataset.is_empty());
        assert_eq!(dataset.duplicate_row_count().unwrap(), 0);
        assert!(dataset.schema().is_empty());
    }
}
