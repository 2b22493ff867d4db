//! Model selection from the target column's declared kind.

use crate::config::{Algorithm, TaskKind};
use crate::encoder::ensure_target;
use crate::error::Result;
use lex_profiling::{ColumnKind, Dataset};
use tracing::info;

/// Pick the task and algorithm for a target of the given kind.
///
/// Numeric targets are regression with linear least squares; every other kind
/// is classification with a random forest.
///
/// # Examples
///
/// ```
/// use lex_profiling::ColumnKind;
/// use lex_training::{Algorithm, TaskKind, select_model};
///
/// assert_eq!(
///     select_model(ColumnKind::Categorical),
///     (TaskKind::Classification, Algorithm::RandomForestClassifier)
/// );
/// ```
pub fn select_model(target_kind: ColumnKind) -> (TaskKind, Algorithm) {
    let task = match target_kind {
        ColumnKind::Numeric => TaskKind::Regression,
        ColumnKind::Categorical => TaskKind::Classification,
    };
    (task, task.algorithm())
}

/// Determine the task for `target_column` using the dataset's schema.
///
/// Looks at the declared kind only; the values are not inspected, so an
/// integer-coded label column is still regression unless its schema says
/// otherwise.
///
/// # Errors
///
/// [`TrainingError::InvalidTarget`](crate::TrainingError::InvalidTarget) if
/// the column is absent.
pub fn determine_model_type(dataset: &Dataset, target_column: &str) -> Result<(TaskKind, Algorithm)> {
    let kind = ensure_target(dataset, target_column)?;
    let (task, algorithm) = select_model(kind);
    info!(
        "Target '{}' is {}: using {} ({})",
        target_column,
        kind.as_str(),
        algorithm,
        task
    );
    Ok((task, algorithm))
}
