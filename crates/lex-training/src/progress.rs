//! Progress reporting types for the training pipeline.
//!
//! A [`ProgressCallback`] registered with
//! [`PipelineBuilder::on_progress`](crate::PipelineBuilder::on_progress)
//! receives a [`ProgressUpdate`] every time training enters a new
//! [`TrainingStage`].
//!
//! # Example
//!
//! ```
//! use lex_training::{Pipeline, ProgressUpdate};
//!
//! let pipeline = Pipeline::builder()
//!     .on_progress(|update: ProgressUpdate| {
//!         println!("[{}] {:.0}% - {}", update.stage, update.progress * 100.0, update.message);
//!     })
//!     .build()
//!     .expect("default config is valid");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Stage of a training run.
///
/// A successful run visits [`Initializing`](Self::Initializing),
/// [`Preprocessing`](Self::Preprocessing), [`Training`](Self::Training),
/// [`Evaluation`](Self::Evaluation), [`Diagnostics`](Self::Diagnostics) and
/// ends in [`Complete`](Self::Complete). A run that errors ends in
/// [`Failed`](Self::Failed) instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingStage {
    #[default]
    Initializing,
    Preprocessing,
    Training,
    Evaluation,
    Diagnostics,
    Complete,
    Failed,
}

impl TrainingStage {
    /// Snake_case name, as used in serialized updates.
    ///
    /// ```
    /// use lex_training::TrainingStage;
    ///
    /// assert_eq!(TrainingStage::Preprocessing.as_str(), "preprocessing");
    /// ```
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Initializing => "initializing",
            Self::Preprocessing => "preprocessing",
            Self::Training => "training",
            Self::Evaluation => "evaluation",
            Self::Diagnostics => "diagnostics",
            Self::Complete => "complete",
            Self::Failed => "failed",
        }
    }

    /// Overall progress reported when the stage starts.
    #[must_use]
    pub fn progress(&self) -> f64 {
        match self {
            Self::Initializing => 0.0,
            Self::Preprocessing => 0.1,
            Self::Training => 0.3,
            Self::Evaluation => 0.7,
            Self::Diagnostics => 0.9,
            Self::Complete | Self::Failed => 1.0,
        }
    }

    /// No further updates follow a terminal stage.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Failed)
    }
}

impl fmt::Display for TrainingStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sent to the progress callback on every stage change.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ProgressUpdate {
    /// The stage just entered.
    pub stage: TrainingStage,

    /// Overall progress from 0.0 to 1.0, non-decreasing during a run.
    pub progress: f64,

    pub message: String,
}

impl ProgressUpdate {
    pub fn new(stage: TrainingStage, message: impl Into<String>) -> Self {
        Self {
            stage,
            progress: stage.progress(),
            message: message.into(),
        }
    }
}

/// Callback invoked inline with training.
///
/// `Send + Sync` so a pipeline can be shared across threads.
pub type ProgressCallback = Arc<dyn Fn(ProgressUpdate) + Send + Sync>;

static_assertions::assert_impl_all!(ProgressUpdate: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;

    const SUCCESSFUL_RUN: [TrainingStage; 6] = [
        TrainingStage::Initializing,
        TrainingStage::Preprocessing,
        TrainingStage::Training,
        TrainingStage::Evaluation,
        TrainingStage::Diagnostics,
        TrainingStage::Complete,
    ];

    #[test]
    fn test_stage_serializes_as_its_name() {
        for stage in SUCCESSFUL_RUN.into_iter().chain([TrainingStage::Failed]) {
            assert_eq!(serde_json::to_value(stage).unwrap(), stage.as_str());
        }
    }

    #[test]
    fn test_progress_rises_through_successful_run() {
        for pair in SUCCESSFUL_RUN.windows(2) {
            assert!(pair[0].progress() < pair[1].progress());
        }
        assert!(
            SUCCESSFUL_RUN
                .iter()
                .filter(|s| s.is_terminal())
                .eq([&TrainingStage::Complete])
        );
        assert!(TrainingStage::Failed.is_terminal());
    }

    #[test]
    fn test_update_serializes_stage_name() {
        let update = ProgressUpdate::new(TrainingStage::Evaluation, "Scoring");
        assert_eq!(update.progress, 0.7);
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            serde_json::json!({"stage": "evaluation", "progress": 0.7, "message": "Scoring"})
        );
    }
}
