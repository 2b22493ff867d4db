use crate::dataset::{ColumnKind, Dataset};
use crate::error::{Result, ResultExt};
use crate::types::QualityMetrics;
use crate::utils::round_to;
use std::collections::HashMap;
use tracing::debug;

pub struct QualityAssessor;

impl QualityAssessor {
    /// Assess a dataset given the missing counts already gathered per column.
    pub fn assess(
        dataset: &Dataset,
        missing_values: &HashMap<String, usize>,
        places: u32,
    ) -> Result<QualityMetrics> {
        let total_cells = dataset.height() * dataset.width();
        let missing_cells: usize = missing_values.values().sum();

        let completeness_ratio = Self::completeness(total_cells, missing_cells, places);
        let duplicate_rows = dataset
            .duplicate_row_count()
            .context("Quality assessment")?;

        let schema = dataset.schema();
        let metrics = QualityMetrics {
            completeness_ratio,
            duplicate_rows,
            columns_with_missing: missing_values.values().filter(|n| **n > 0).count(),
            numeric_columns: schema.columns_of(ColumnKind::Numeric).len(),
            categorical_columns: schema.columns_of(ColumnKind::Categorical).len(),
        };

        debug!(
            "Quality: completeness={}, duplicates={}, columns_with_missing={}",
            metrics.completeness_ratio, metrics.duplicate_rows, metrics.columns_with_missing
        );
        Ok(metrics)
    }

    /// Share of non-missing cells. An empty dataset counts as complete.
    pub fn completeness(total_cells: usize, missing_cells: usize, places: u32) -> f64 {
        if total_cells == 0 {
            return 1.0;
        }
        let present = total_cells.saturating_sub(missing_cells);
        round_to(present as f64 / total_cells as f64, places)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;
    use pretty_assertions::assert_eq;

    fn missing_map(dataset: &Dataset) -> HashMap<String, usize> {
        dataset
            .schema()
            .iter()
            .map(|(name, _)| (name.to_string(), dataset.missing_count(name).unwrap()))
            .collect()
    }

    #[test]
    fn test_completeness() {
        assert_eq!(QualityAssessor::completeness(0, 0, 3), 1.0);
        assert_eq!(QualityAssessor::completeness(10, 0, 3), 1.0);
        assert_eq!(QualityAssessor::completeness(9, 1, 3), 0.889);
        assert_eq!(QualityAssessor::completeness(4, 4, 3), 0.0);
    }

    #[test]
    fn test_assess_mixed_dataset() {
        let frame = df![
            "age" => [Some(25i64), None, Some(35), Some(25)],
            "dept" => [Some("IT"), Some("HR"), None, Some("IT")],
            "score" => [1.0f64, 2.0, 3.0, 1.0],
        ]
        .unwrap();
        let dataset = Dataset::new(frame);
        let metrics = QualityAssessor::assess(&dataset, &missing_map(&dataset), 3).unwrap();

        assert_eq!(
            metrics,
            QualityMetrics {
                completeness_ratio: 0.833,
                duplicate_rows: 1,
                columns_with_missing: 2,
                numeric_columns: 2,
                categorical_columns: 1,
            }
        );
    }

    #[test]
    fn test_assess_complete_dataset() {
        let frame = df!["a" => [1i64, 2, 3], "b" => ["x", "y", "z"]].unwrap();
        let dataset = Dataset::new(frame);
        let metrics = QualityAssessor::assess(&dataset, &missing_map(&dataset), 3).unwrap();
        assert_eq!(metrics.completeness_ratio, 1.0);
        assert_eq!(metrics.duplicate_rows, 0);
        assert_eq!(metrics.columns_with_missing, 0);
    }

    #[test]
    fn test_assess_empty_dataset() {
        let dataset = Dataset::new(DataFrame::empty());
        let metrics = QualityAssessor::assess(&dataset, &HashMap::new(), 3).unwrap();
        assert_eq!(metrics.completeness_ratio, 1.0);
        assert_eq!(metrics.numeric_columns, 0);
        assert_eq!(metrics.categorical_columns, 0);
    }
}
