//! Data quality assessment.
//!
//! Completeness, duplication and column-kind counts for a whole dataset.

mod analyzer;

pub use analyzer::QualityAssessor;
