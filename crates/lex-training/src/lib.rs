//! Automated Model Training
//!
//! Trains a predictive model for one target column of a tabular dataset and
//! reports how far its score and feature importance can be trusted.
//!
//! # Overview
//!
//! - **Feature Encoding**: categorical columns are label-encoded per column,
//!   missing numeric values are filled with the column mean
//! - **Model Selection**: numeric targets get ordinary least squares, every
//!   other target gets a random forest classifier
//! - **Evaluation**: a seeded 80/20 split, scored with R² or accuracy
//! - **Diagnostics**: a trust level plus overfitting, leakage and sample-size
//!   warnings
//! - **Persistence**: the fitted model is a self-contained JSON artifact
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use lex_profiling::Dataset;
//! use lex_training::{Pipeline, TrainingConfig};
//!
//! let dataset = Dataset::from_csv("employees.csv")?;
//!
//! // Default configuration
//! let (report, model) = lex_training::train(&dataset, "department")?;
//!
//! // Custom configuration with progress reporting
//! let pipeline = Pipeline::builder()
//!     .config(TrainingConfig::builder().n_estimators(200).build()?)
//!     .on_progress(|update| println!("{}", update.message))
//!     .build()?;
//! let (report, model) = pipeline.train(&dataset, "department")?;
//!
//! println!("{} = {} ({})", report.score_name, report.score, report.diagnostics.trust_level);
//! model.save("model.json")?;
//! ```
//!
//! # Error Handling
//!
//! Training either returns a complete report and model or a [`TrainingError`]
//! carrying the reason. Nothing is retried.

pub mod config;
pub mod diagnostics;
pub mod encoder;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod progress;
pub mod selector;
pub mod trainer;
pub mod types;

// Re-exports for convenient access
pub use config::{Algorithm, TaskKind, TrainingConfig, TrainingConfigBuilder};
pub use diagnostics::diagnose;
pub use encoder::{FeatureColumn, FeatureEncoding, FeatureMatrix, LabelEncoder, MISSING_LABEL};
pub use error::{Result as TrainingResult, ResultExt, TrainingError};
pub use model::{Estimator, TrainedModel};
pub use pipeline::{Pipeline, PipelineBuilder, train};
pub use progress::{ProgressCallback, ProgressUpdate, TrainingStage};
pub use selector::{determine_model_type, select_model};
pub use trainer::{MIN_TRAINING_ROWS, Trainer};
pub use types::{DiagnosticReport, PredictionResult, TrainingReport, TrustLevel};

static_assertions::assert_impl_all!(Pipeline: Send, Sync);
static_assertions::assert_impl_all!(TrainedModel: Send, Sync);
static_assertions::assert_impl_all!(TrainingReport: Send, Sync);
