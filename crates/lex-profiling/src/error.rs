//! Custom error types for the profiling engine.
//!
//! Column-level failures never surface through this type to callers of
//! [`DataProfiler::profile`](crate::DataProfiler::profile): they are recorded
//! inline in the report. `ProfilingError` is what the per-column computations
//! return internally, and what dataset construction returns when the input is
//! malformed.
//!
//! Errors are serializable as `{code, message}` so a boundary layer can pass
//! them straight through to its clients.

use polars::prelude::PolarsError;
use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// Errors raised while reading or profiling a dataset.
#[derive(Error, Debug)]
pub enum ProfilingError {
    /// No column of this name (names are case-sensitive).
    #[error("Column '{0}' does not exist")]
    ColumnNotFound(String),

    #[error("Invalid profiler configuration: {0}")]
    InvalidConfig(String),

    /// A column could not be cast to the representation a statistic needs.
    #[error("Cannot read column '{column}' as {target_type}: {reason}")]
    TypeConversionFailed {
        column: String,
        target_type: String,
        reason: String,
    },

    /// A statistic came out as NaN or infinite (e.g. the column holds infinities).
    #[error("Statistic '{statistic}' is not finite for column '{column}'")]
    NonFiniteStatistic { column: String, statistic: String },

    /// The dataset itself is malformed, before any per-column work can start.
    #[error("Malformed dataset: {0}")]
    MalformedDataset(String),

    #[error("Dataframe operation failed: {0}")]
    Polars(#[from] PolarsError),

    /// An inner error plus what was being done when it happened.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<ProfilingError>,
    },
}

impl ProfilingError {
    /// Wrap the error with a description of the failed step.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Stable identifier for boundary layers; context wrappers report the
    /// code of the error they wrap.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::WithContext { source, .. } => source.error_code(),
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::TypeConversionFailed { .. } => "TYPE_CONVERSION_FAILED",
            Self::NonFiniteStatistic { .. } => "NON_FINITE_STATISTIC",
            Self::MalformedDataset(_) => "MALFORMED_DATASET",
            Self::Polars(_) => "POLARS_ERROR",
        }
    }

    /// Whether the error prevents any profiling at all.
    ///
    /// Catastrophic errors are the ones that make the orchestrator fall back
    /// to a degraded report instead of recording a per-column failure.
    pub fn is_catastrophic(&self) -> bool {
        match self {
            Self::MalformedDataset(_) => true,
            Self::WithContext { source, .. } => source.is_catastrophic(),
            _ => false,
        }
    }
}

impl Serialize for ProfilingError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("ProfilingError", 2)?;
        state.serialize_field("code", self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

pub type Result<T> = std::result::Result<T, ProfilingError>;

/// `.context(..)` for results carrying a [`ProfilingError`] or a polars error.
pub trait ResultExt<T> {
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T, E: Into<ProfilingError>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.into().with_context(context))
    }
}
