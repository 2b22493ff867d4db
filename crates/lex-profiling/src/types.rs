use crate::dataset::ColumnKind;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Descriptive statistics for a numeric column, rounded for presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericProfile {
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub skewness: f64,
    pub kurtosis: f64,
    pub outliers_count: usize,
    pub unique_values: usize,
    pub zero_count: usize,
}

/// Frequency summary for a categorical column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalProfile {
    pub unique_count: usize,
    pub most_frequent: Option<String>,
    pub most_frequent_count: usize,
    pub diversity_ratio: f64,
    /// Most frequent categories with their counts, most frequent first.
    ///
    /// Serialized as a `{label: count}` object in the same order.
    #[serde(with = "category_counts")]
    pub top_categories: Vec<(String, usize)>,
}

/// Ordered `(label, count)` pairs as a JSON object.
mod category_counts {
    use serde::de::{MapAccess, Visitor};
    use serde::ser::SerializeMap;
    use serde::{Deserializer, Serializer};
    use std::fmt;

    pub fn serialize<S: Serializer>(
        counts: &[(String, usize)],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(counts.len()))?;
        for (label, count) in counts {
            map.serialize_entry(label, count)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<(String, usize)>, D::Error> {
        struct CountsVisitor;

        impl<'de> Visitor<'de> for CountsVisitor {
            type Value = Vec<(String, usize)>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of category labels to counts")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut counts = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some(entry) = access.next_entry()? {
                    counts.push(entry);
                }
                Ok(counts)
            }
        }

        deserializer.deserialize_map(CountsVisitor)
    }
}

/// Outcome of profiling a single column.
///
/// A failed column serializes as `{"error": "..."}` next to its siblings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnInsight<T> {
    Failed { error: String },
    Profile(T),
}

impl<T> ColumnInsight<T> {
    pub fn is_failed(&self) -> bool {
        matches!(self, ColumnInsight::Failed { .. })
    }

    pub fn profile(&self) -> Option<&T> {
        match self {
            ColumnInsight::Profile(profile) => Some(profile),
            ColumnInsight::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ColumnInsight::Failed { error } => Some(error),
            ColumnInsight::Profile(_) => None,
        }
    }
}

/// A strongly correlated pair of numeric columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationPair {
    pub column1: String,
    pub column2: String,
    pub correlation: f64,
}

/// Square correlation matrix over the numeric columns.
///
/// Undefined coefficients are stored as `0.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    /// Coefficient between two named columns.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        Some(self.values[i][j])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationReport {
    pub matrix: CorrelationMatrix,
    pub strong_correlations: Vec<CorrelationPair>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityMetrics {
    pub completeness_ratio: f64,
    pub duplicate_rows: usize,
    pub columns_with_missing: usize,
    pub numeric_columns: usize,
    pub categorical_columns: usize,
}

/// Complete profile of a dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfilingReport {
    pub shape: (usize, usize),
    pub columns: Vec<String>,
    pub dtypes: HashMap<String, ColumnKind>,
    pub missing_values: HashMap<String, usize>,
    pub memory_usage_mb: f64,
    pub numeric_insights: HashMap<String, ColumnInsight<NumericProfile>>,
    pub categorical_insights: HashMap<String, ColumnInsight<CategoricalProfile>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality_metrics: Option<QualityMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlations: Option<CorrelationReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProfilingReport {
    /// Minimal report returned when profiling could not even start.
    pub fn degraded(reason: impl Into<String>) -> Self {
        Self {
            shape: (0, 0),
            columns: Vec::new(),
            dtypes: HashMap::new(),
            missing_values: HashMap::new(),
            memory_usage_mb: 0.0,
            numeric_insights: HashMap::new(),
            categorical_insights: HashMap::new(),
            quality_metrics: None,
            correlations: None,
            error: Some(reason.into()),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.error.is_some()
    }
}
