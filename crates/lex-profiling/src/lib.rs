//! Statistical Profiling Engine
//!
//! Descriptive profiling of tabular datasets built on Polars.
//!
//! # Overview
//!
//! Given a [`Dataset`], the profiler produces a [`ProfilingReport`] with:
//!
//! - **Column Statistics**: mean, median, spread, shape and outlier counts for
//!   numeric columns; frequency tables for categorical columns
//! - **Correlations**: a pairwise Pearson matrix over numeric columns plus the
//!   strongly correlated pairs
//! - **Quality Metrics**: completeness, duplicate rows and column-kind counts
//!
//! Profiling never fails. A column whose statistics cannot be computed is
//! recorded as `{"error": ...}` in its slot, and a dataset that cannot be
//! profiled at all yields a report with its `error` field set.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use lex_profiling::{DataProfiler, Dataset, ProfilerConfig};
//!
//! let dataset = Dataset::from_csv("employees.csv")?;
//!
//! // Default configuration
//! let report = lex_profiling::profile(&dataset);
//!
//! // Custom configuration
//! let config = ProfilerConfig::builder().top_categories(10).build()?;
//! let report = DataProfiler::with_config(config)?.profile(&dataset);
//!
//! for pair in &report.correlations.unwrap().strong_correlations {
//!     println!("{} ~ {}: {}", pair.column1, pair.column2, pair.correlation);
//! }
//! ```

pub mod config;
pub mod dataset;
pub mod error;
pub mod profiler;
pub mod quality;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use config::{ConfigValidationError, ProfilerConfig, ProfilerConfigBuilder};
pub use dataset::{ColumnKind, Dataset, Schema};
pub use error::{ProfilingError, Result as ProfilingResult, ResultExt};
pub use profiler::{
    CorrelationAnalyzer, DataProfiler, IQR_MULTIPLIER, OutlierBounds, OutlierDetector,
    STRONG_CORRELATION_THRESHOLD, profile,
};
pub use quality::QualityAssessor;
pub use types::{
    CategoricalProfile, ColumnInsight, CorrelationMatrix, CorrelationPair, CorrelationReport,
    NumericProfile, ProfilingReport, QualityMetrics,
};

static_assertions::assert_impl_all!(Dataset: Send, Sync);
static_assertions::assert_impl_all!(ProfilingReport: Send, Sync);
