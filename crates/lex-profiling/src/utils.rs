//! Shared utilities for the profiling engine.
//!
//! Helpers for mapping polars dtypes to column kinds, pulling typed values
//! out of a [`Series`], and rounding figures for presentation.

use crate::error::{ProfilingError, Result};
use polars::prelude::*;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

// =============================================================================
// Value Extraction
// =============================================================================

/// Cast a series to `f64` and collect its values.
///
/// Nulls and NaN both come back as `None`. A present value that does not
/// parse as a number fails the whole column instead of becoming null.
pub fn numeric_values(series: &Series) -> Result<Vec<Option<f64>>> {
    let cast = series
        .strict_cast(&DataType::Float64)
        .map_err(|e| conversion_error(series, "Float64", e))?;
    let values = cast
        .f64()
        .map_err(|e| conversion_error(series, "Float64", e))?
        .into_iter()
        .map(|v| v.filter(|x| !x.is_nan()))
        .collect();
    Ok(values)
}

/// Stringify every value of a series, keeping nulls as `None`.
pub fn string_values(series: &Series) -> Result<Vec<Option<String>>> {
    let cast = series
        .cast(&DataType::String)
        .map_err(|e| conversion_error(series, "String", e))?;
    let values = cast
        .str()
        .map_err(|e| conversion_error(series, "String", e))?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect();
    Ok(values)
}

fn conversion_error(series: &Series, target_type: &str, err: PolarsError) -> ProfilingError {
    ProfilingError::TypeConversionFailed {
        column: series.name().to_string(),
        target_type: target_type.to_string(),
        reason: err.to_string(),
    }
}

// =============================================================================
// Numeric Utilities
// =============================================================================

/// Round a value to a fixed number of decimal places.
#[inline]
pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_numeric_dtype() {
        assert!(is_numeric_dtype(&DataType::Int64));
        assert!(is_numeric_dtype(&DataType::Float32));
        assert!(is_numeric_dtype(&DataType::UInt8));
        assert!(!is_numeric_dtype(&DataType::String));
        assert!(!is_numeric_dtype(&DataType::Boolean));
    }

    #[test]
    fn test_numeric_values_nulls_and_nan() {
        let series = Series::new("val".into(), &[Some(1.0f64), None, Some(f64::NAN), Some(4.0)]);
        let values = numeric_values(&series).unwrap();
        assert_eq!(values, vec![Some(1.0), None, None, Some(4.0)]);
    }

    #[test]
    fn test_numeric_values_from_integers() {
        let series = Series::new("val".into(), &[1i64, 2, 3]);
        let values = numeric_values(&series).unwrap();
        assert_eq!(values, vec![Some(1.0), Some(2.0), Some(3.0)]);
    }

    #[test]
    fn test_numeric_values_rejects_text() {
        let series = Series::new("code".into(), &["a", "b", "c"]);
        let err = numeric_values(&series).unwrap_err();
        assert_eq!(err.error_code(), "TYPE_CONVERSION_FAILED");
    }

    #[test]
    fn test_numeric_values_parses_numeric_text() {
        let series = Series::new("val".into(), &[Some("1.5"), None, Some("3")]);
        let values = numeric_values(&series).unwrap();
        assert_eq!(values, vec![Some(1.5), None, Some(3.0)]);
    }

    #[test]
    fn test_string_values() {
        let series = Series::new("dept".into(), &[Some("IT"), None, Some("HR")]);
        let values = string_values(&series).unwrap();
        assert_eq!(
            values,
            vec![Some("IT".to_string()), None, Some("HR".to_string())]
        );
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1.23456, 3), 1.235);
        assert_eq!(round_to(-0.0004, 3), 0.0);
        assert_eq!(round_to(2.5, 0), 3.0);
    }
}
