//! Error types for the lex-training crate.
//!
//! This module defines [`TrainingError`], the error type returned by every
//! fallible operation in the crate.
//!
//! # Error Handling
//!
//! Dataset-level failures are raised to the caller with a reason and no
//! partial result:
//! - [`InvalidTarget`](TrainingError::InvalidTarget) when the target column is unusable
//! - [`InsufficientData`](TrainingError::InsufficientData) when too few rows remain
//! - [`TrainingFailure`](TrainingError::TrainingFailure) for encoding or fitting errors
//!
//! Nothing is retried. Errors serialize as `{code, message}` for boundary layers.
//!
//! # Example
//!
//! ```rust,ignore
//! use lex_training::{TrainingError, train};
//!
//! match train(&dataset, "price") {
//!     Ok((report, model)) => println!("score: {}", report.score),
//!     Err(TrainingError::InsufficientData { rows, .. }) => eprintln!("only {rows} rows"),
//!     Err(e) => eprintln!("[{}] {}", e.error_code(), e),
//! }
//! ```

use lex_profiling::ProfilingError;
use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for training operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum TrainingError {
    /// The target column is absent or cannot be used as a target.
    ///
    /// Column names are case-sensitive.
    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    /// Fewer usable rows than training requires.
    ///
    /// `rows` counts what is left after dropping rows with a missing target.
    #[error(
        "Insufficient data: {rows} rows with a target value remain, at least {required} are required"
    )]
    InsufficientData {
        /// Rows remaining after dropping missing targets.
        rows: usize,
        /// Minimum number of rows needed.
        required: usize,
    },

    /// Encoding or fitting failed (e.g. numeric instability).
    #[error("Training failed: {0}")]
    TrainingFailure(String),

    /// Invalid configuration provided to the pipeline.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The specified model file was not found.
    #[error("Model not found: {path}")]
    ModelNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Input for prediction does not match what the model was trained on.
    #[error("Inference error: {0}")]
    InferenceError(String),

    /// The dataset could not be loaded or read.
    #[error("Dataset error: {0}")]
    Dataset(#[from] ProfilingError),

    /// I/O error during model save/load.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Model artifact (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<TrainingError>,
    },
}

impl TrainingError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        TrainingError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get error code for boundary handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidTarget(_) => "INVALID_TARGET",
            Self::InsufficientData { .. } => "INSUFFICIENT_DATA",
            Self::TrainingFailure(_) => "TRAINING_FAILURE",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::ModelNotFound { .. } => "MODEL_NOT_FOUND",
            Self::InferenceError(_) => "INFERENCE_ERROR",
            Self::Dataset(e) => e.error_code(),
            Self::Io(_) => "IO_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Whether the error is caused by the caller's input rather than by fitting.
    ///
    /// Resubmitting the same request cannot succeed for these.
    pub fn is_input_error(&self) -> bool {
        match self {
            Self::InvalidTarget(_) | Self::InsufficientData { .. } | Self::InvalidConfig(_) => true,
            Self::WithContext { source, .. } => source.is_input_error(),
            _ => false,
        }
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for TrainingError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("TrainingError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for training operations.
pub type Result<T> = std::result::Result<T, TrainingError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, ProfilingError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| TrainingError::Dataset(e).with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            TrainingError::InvalidTarget("x".to_string()).error_code(),
            "INVALID_TARGET"
        );
        assert_eq!(
            TrainingError::InsufficientData {
                rows: 9,
                required: 10
            }
            .error_code(),
            "INSUFFICIENT_DATA"
        );
        assert_eq!(
            TrainingError::Dataset(ProfilingError::ColumnNotFound("a".to_string())).error_code(),
            "COLUMN_NOT_FOUND"
        );
    }

    #[test]
    fn test_insufficient_data_message() {
        let err = TrainingError::InsufficientData {
            rows: 9,
            required: 10,
        };
        let msg = err.to_string();
        assert!(msg.contains('9'));
        assert!(msg.contains("10"));
    }

    #[test]
    fn test_is_input_error() {
        assert!(TrainingError::InvalidTarget("t".to_string()).is_input_error());
        assert!(
            TrainingError::InvalidTarget("t".to_string())
                .with_context("During training")
                .is_input_error()
        );
        assert!(!TrainingError::TrainingFailure("singular".to_string()).is_input_error());
    }

    #[test]
    fn test_error_serialization() {
        let err = TrainingError::TrainingFailure("no feature columns".to_string());
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "TRAINING_FAILURE");
        assert_eq!(json["message"], "Training failed: no feature columns");
    }
}
