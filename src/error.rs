// ============================================================
// Error Types
// ============================================================
// Every fault the pipeline can raise, grouped the way the run
// treats them:
//
//   load faults           -> abort the run
//   configuration faults  -> abort the run
//   persistence faults    -> abort the run
//   upload faults         -> logged, turned into a missing URL
//
// The application and CLI layers wrap these in anyhow::Error
// with extra context; lower layers return them directly.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors raised while loading, preparing, building,
/// training or persisting a model.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Cannot load dataset '{location}': {reason}")]
    DatasetLoad { location: String, reason: String },

    #[error("Dataset '{0}' has no data rows")]
    EmptyDataset(String),

    #[error("Target column '{0}' did not survive preparation; it must be numeric or a low-cardinality category")]
    TargetDropped(String),

    #[error("Target column '{column}' has {missing} missing values; every row needs a label")]
    MissingTarget { column: String, missing: usize },

    #[error("Unsupported architecture '{0}'; only 'default' (dense) is available")]
    UnsupportedArchitecture(String),

    #[error("Unsupported optimizer '{0}'; expected one of adam, adamw, sgd, rmsprop, adagrad")]
    UnsupportedOptimizer(String),

    #[error("Unsupported task type '{0}'; expected regression or classification")]
    UnsupportedTask(String),

    #[error("Invalid hyperparameters: {0}")]
    InvalidHyperparameter(String),

    #[error("Model is not defined. Build a model before compiling or training it")]
    ModelNotBuilt,

    #[error("Model has not been trained yet")]
    ModelNotTrained,

    #[error("Scaler used before it was fitted")]
    ScalerNotFitted,

    #[error("Not enough rows to split: {0}")]
    InsufficientData(String),

    #[error("Cannot record model to '{path}': {reason}")]
    Record { path: PathBuf, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl PipelineError {
    pub fn dataset_load(location: impl Into<String>, reason: impl ToString) -> Self {
        Self::DatasetLoad {
            location: location.into(),
            reason:   reason.to_string(),
        }
    }

    pub fn invalid_hyperparameter(msg: impl Into<String>) -> Self {
        Self::InvalidHyperparameter(msg.into())
    }
}

/// Recoverable upload faults. The uploader never propagates
/// these; it logs them and reports a missing URL instead.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Cannot read artifact '{path}': {source}")]
    Artifact {
        path:   PathBuf,
        source: std::io::Error,
    },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Transport failure: {0}")]
    Transport(String),
}
