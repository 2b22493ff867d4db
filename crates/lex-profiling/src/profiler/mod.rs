//! Dataset profiling.
//!
//! [`DataProfiler`] composes the column statistics, outlier fencing,
//! correlation analysis and quality assessment into one [`ProfilingReport`].
//!
//! Failures are handled at two levels:
//! - a column whose statistics cannot be computed is recorded inline as
//!   [`ColumnInsight::Failed`] and the rest of the report is unaffected;
//! - a failure that prevents profiling from starting at all produces a
//!   degraded report (empty shape, `error` set) instead of an `Err`.

mod correlation;
mod outliers;
mod statistics;

use crate::config::ProfilerConfig;
use crate::dataset::{ColumnKind, Dataset, Schema};
use crate::error::{ProfilingError, Result, ResultExt};
use crate::quality::QualityAssessor;
use crate::types::{ColumnInsight, ProfilingReport};
use crate::utils::round_to;
use polars::prelude::DataFrame;
use std::collections::HashMap;
use tracing::{debug, error, info, warn};

pub use correlation::{CorrelationAnalyzer, STRONG_CORRELATION_THRESHOLD, pearson};
pub use outliers::{IQR_MULTIPLIER, OutlierBounds, OutlierDetector, quantile};

/// Memory footprint is reported with this precision regardless of config.
const MEMORY_DECIMAL_PLACES: u32 = 2;

/// Profiles datasets into [`ProfilingReport`]s.
///
/// Holds only configuration, so one profiler can be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct DataProfiler {
    config: ProfilerConfig,
}

static_assertions::assert_impl_all!(DataProfiler: Send, Sync);

impl DataProfiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a profiler with a custom configuration.
    pub fn with_config(config: ProfilerConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| ProfilingError::InvalidConfig(e.to_string()))?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ProfilerConfig {
        &self.config
    }

    /// Profile a dataset. Never fails.
    pub fn profile(&self, dataset: &Dataset) -> ProfilingReport {
        match self.try_profile(dataset) {
            Ok(report) => report,
            Err(e) => {
                error!("Profiling failed: {}", e);
                ProfilingReport::degraded(e.to_string())
            }
        }
    }

    /// Profile a raw frame, inferring its schema.
    pub fn profile_dataframe(&self, frame: DataFrame) -> ProfilingReport {
        self.profile(&Dataset::new(frame))
    }

    /// Profile a raw frame under a caller-declared schema.
    ///
    /// A schema that does not describe the frame yields a degraded report.
    pub fn profile_with_schema(&self, frame: DataFrame, schema: Schema) -> ProfilingReport {
        match Dataset::with_schema(frame, schema) {
            Ok(dataset) => self.profile(&dataset),
            Err(e) => {
                error!("Cannot profile dataset: {}", e);
                ProfilingReport::degraded(e.to_string())
            }
        }
    }

    /// Profile a dataset, surfacing dataset-level failures as `Err`.
    ///
    /// Column-level failures are still recorded inline.
    pub fn try_profile(&self, dataset: &Dataset) -> Result<ProfilingReport> {
        let (rows, cols) = (dataset.height(), dataset.width());
        info!("Profiling dataset with shape ({}, {})", rows, cols);

        let schema = dataset.schema();
        if schema.len() != cols {
            return Err(ProfilingError::MalformedDataset(format!(
                "schema describes {} columns but dataset has {}",
                schema.len(),
                cols
            )));
        }

        let places = self.config.decimal_places;

        let mut dtypes = HashMap::with_capacity(cols);
        let mut missing_values = HashMap::with_capacity(cols);
        for (name, kind) in schema.iter() {
            dtypes.insert(name.to_string(), kind);
            let missing = dataset
                .missing_count(name)
                .context(format!("Counting missing values in '{}'", name))?;
            missing_values.insert(name.to_string(), missing);
        }

        let mut numeric_insights = HashMap::new();
        let mut numeric_columns = Vec::new();
        for name in schema.columns_of(ColumnKind::Numeric) {
            let values = match dataset.numeric_column(name) {
                Ok(values) => values,
                Err(e) => {
                    warn!("Failed to read numeric column '{}': {}", name, e);
                    numeric_insights.insert(name.to_string(), failed(e));
                    continue;
                }
            };

            match statistics::numeric_profile(name, &values, places) {
                Ok(Some(profile)) => {
                    numeric_insights.insert(name.to_string(), ColumnInsight::Profile(profile));
                }
                Ok(None) => debug!("Skipping numeric column '{}': no values", name),
                Err(e) => {
                    warn!("Failed to profile numeric column '{}': {}", name, e);
                    numeric_insights.insert(name.to_string(), failed(e));
                }
            }
            numeric_columns.push((name.to_string(), values));
        }

        let mut categorical_insights = HashMap::new();
        for name in schema.columns_of(ColumnKind::Categorical) {
            let insight = match dataset.string_column(name) {
                Ok(values) => ColumnInsight::Profile(statistics::categorical_profile(
                    &values,
                    self.config.top_categories,
                    places,
                )),
                Err(e) => {
                    warn!("Failed to profile categorical column '{}': {}", name, e);
                    failed(e)
                }
            };
            categorical_insights.insert(name.to_string(), insight);
        }

        let quality_metrics = QualityAssessor::assess(dataset, &missing_values, places)?;

        let correlations = if rows > 0 && schema.columns_of(ColumnKind::Numeric).len() >= 2 {
            let report = CorrelationAnalyzer::analyze(&numeric_columns, places);
            debug!(
                "Found {} strong correlations",
                report.strong_correlations.len()
            );
            Some(report)
        } else {
            None
        };

        info!(
            "Profiled {} numeric and {} categorical columns",
            numeric_insights.len(),
            categorical_insights.len()
        );

        Ok(ProfilingReport {
            shape: (rows, cols),
            columns: schema.names(),
            dtypes,
            missing_values,
            memory_usage_mb: round_to(dataset.estimated_size_mb(), MEMORY_DECIMAL_PLACES),
            numeric_insights,
            categorical_insights,
            quality_metrics: Some(quality_metrics),
            correlations,
            error: None,
        })
    }
}

fn failed<T>(e: ProfilingError) -> ColumnInsight<T> {
    ColumnInsight::Failed {
        error: e.to_string(),
    }
}

/// Profile a dataset with the default configuration.
pub fn profile(dataset: &Dataset) -> ProfilingReport {
    DataProfiler::new().profile(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::df;
    use pretty_assertions::assert_eq;

    fn employees() -> Dataset {
        Dataset::new(
            df![
                "age" => [25i64, 30, 35, 40, 45],
                "salary" => [50000.0f64, 60000.0, 70000.0, 80000.0, 90000.0],
                "department" => ["IT", "HR", "IT", "Finance", "IT"],
            ]
            .unwrap(),
        )
    }

    #[test]
    fn test_profile_shape_and_types() {
        let report = profile(&employees());

        assert_eq!(report.shape, (5, 3));
        assert_eq!(report.columns, vec!["age", "salary", "department"]);
        assert_eq!(report.dtypes["age"], ColumnKind::Numeric);
        assert_eq!(report.dtypes["department"], ColumnKind::Categorical);
        assert!(report.missing_values.values().all(|n| *n == 0));
        assert!(!report.is_degraded());
    }

    #[test]
    fn test_profile_insights() {
        let report = profile(&employees());

        let age = report.numeric_insights["age"].profile().unwrap();
        assert_eq!(age.mean, 35.0);
        assert_eq!(age.median, 35.0);
        assert_eq!(age.std, 7.906);

        let dept = report.categorical_insights["department"].profile().unwrap();
        assert_eq!(dept.most_frequent.as_deref(), Some("IT"));
        assert_eq!(dept.most_frequent_count, 3);
        assert_eq!(dept.unique_count, 3);
    }

    #[test]
    fn test_profile_correlations() {
        let report = profile(&employees());
        let correlations = report.correlations.unwrap();

        assert_eq!(correlations.matrix.get("age", "salary"), Some(1.0));
        assert_eq!(correlations.strong_correlations.len(), 1);
        assert_eq!(correlations.strong_correlations[0].column1, "age");
        assert_eq!(correlations.strong_correlations[0].column2, "salary");
    }

    #[test]
    fn test_single_numeric_column_has_no_correlations() {
        let dataset = Dataset::new(df!["x" => [1.0f64, 2.0], "c" => ["a", "b"]].unwrap());
        let report = profile(&dataset);
        assert!(report.correlations.is_none());
    }

    #[test]
    fn test_failed_column_is_isolated() {
        let dataset = Dataset::new(
            df![
                "bad" => [1.0f64, f64::INFINITY, 3.0],
                "good" => [1.0f64, 2.0, 3.0],
            ]
            .unwrap(),
        );
        let report = profile(&dataset);

        let bad = &report.numeric_insights["bad"];
        assert!(bad.is_failed());
        assert!(bad.error().unwrap().contains("bad"));
        assert!(report.numeric_insights["good"].profile().is_some());
        assert!(report.quality_metrics.is_some());
    }

    #[test]
    fn test_text_in_numeric_column_fails_that_column() {
        let frame = df![
            "code" => ["x", "y", "z"],
            "value" => [1.0f64, 2.0, 3.0],
        ]
        .unwrap();
        let schema = Schema::new([("code", ColumnKind::Numeric), ("value", ColumnKind::Numeric)]);
        let report = DataProfiler::new().profile_with_schema(frame, schema);

        assert!(!report.is_degraded());
        let code = &report.numeric_insights["code"];
        assert!(code.is_failed());
        assert!(code.error().unwrap().contains("code"));
        assert_eq!(report.missing_values["code"], 0);
        assert_eq!(report.quality_metrics.unwrap().completeness_ratio, 1.0);
        assert!(report.numeric_insights["value"].profile().is_some());
    }

    #[test]
    fn test_top_categories_serialize_as_ordered_object() {
        let report = profile(&employees());
        let dept = report.categorical_insights["department"].profile().unwrap();
        let json = serde_json::to_string(dept).unwrap();

        assert!(json.contains(r#""top_categories":{"IT":3,"HR":1,"Finance":1}"#));
        let back: crate::types::CategoricalProfile = serde_json::from_str(&json).unwrap();
        assert_eq!(&back, dept);
    }

    #[test]
    fn test_failed_column_serializes_as_error_object() {
        let insight: ColumnInsight<crate::types::NumericProfile> = ColumnInsight::Failed {
            error: "boom".to_string(),
        };
        let json = serde_json::to_value(&insight).unwrap();
        assert_eq!(json, serde_json::json!({"error": "boom"}));
    }

    #[test]
    fn test_all_missing_numeric_column_is_omitted() {
        let dataset = Dataset::new(
            df![
                "empty" => [None::<f64>, None, None],
                "x" => [1.0f64, 2.0, 3.0],
            ]
            .unwrap(),
        );
        let report = profile(&dataset);
        assert!(!report.numeric_insights.contains_key("empty"));
        assert_eq!(report.missing_values["empty"], 3);
        assert_eq!(report.correlations.unwrap().matrix.get("empty", "x"), Some(0.0));
    }

    #[test]
    fn test_empty_dataset() {
        let report = profile(&Dataset::new(DataFrame::empty()));
        assert_eq!(report.shape, (0, 0));
        assert_eq!(report.quality_metrics.as_ref().unwrap().completeness_ratio, 1.0);
        assert!(report.correlations.is_none());
        assert!(!report.is_degraded());
    }

    #[test]
    fn test_mismatched_schema_degrades() {
        let frame = df!["a" => [1i64, 2]].unwrap();
        let schema = Schema::new([("b", ColumnKind::Numeric)]);
        let report = DataProfiler::new().profile_with_schema(frame, schema);

        assert!(report.is_degraded());
        assert_eq!(report.shape, (0, 0));
        assert!(report.columns.is_empty());
        assert!(report.error.unwrap().contains("Malformed dataset"));
    }

    #[test]
    fn test_custom_config() {
        let config = ProfilerConfig::builder().top_categories(1).build().unwrap();
        let profiler = DataProfiler::with_config(config).unwrap();
        let report = profiler.profile(&employees());
        let dept = report.categorical_insights["department"].profile().unwrap();
        assert_eq!(dept.top_categories, vec![("IT".to_string(), 3)]);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = ProfilerConfig {
            top_categories: 0,
            ..Default::default()
        };
        let err = DataProfiler::with_config(config).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CONFIG");
    }
}
