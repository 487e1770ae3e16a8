// ============================================================
// Layer 3 - Hyperparameters
// ============================================================
// The caller supplies a JSON mapping; only three keys are read:
//
//   optimizer   name of the optimisation algorithm  (default "adam")
//   epochs      maximum number of passes            (default 10)
//   batch_size  samples per gradient step           (default 32)
//
// Missing keys take their default, unknown keys are ignored,
// so `{}` is a valid mapping.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Hyperparameters {
    pub optimizer:  String,
    pub epochs:     usize,
    pub batch_size: usize,
}

impl Default for Hyperparameters {
    fn default() -> Self {
        Self {
            optimizer:  "adam".to_string(),
            epochs:     10,
            batch_size: 32,
        }
    }
}

impl Hyperparameters {
    /// Parse a JSON object, filling in defaults for absent keys.
    pub fn from_json(json: &str) -> Result<Self, PipelineError> {
        let hp: Self = serde_json::from_str(json)
            .map_err(|e| PipelineError::invalid_hyperparameter(e.to_string()))?;
        hp.validate()?;
        Ok(hp)
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.epochs == 0 {
            return Err(PipelineError::invalid_hyperparameter("epochs must be positive"));
        }
        if self.batch_size == 0 {
            return Err(PipelineError::invalid_hyperparameter("batch_size must be positive"));
        }
        self.optimizer_kind().map(|_| ())
    }

    pub fn optimizer_kind(&self) -> Result<OptimizerKind, PipelineError> {
        self.optimizer.parse()
    }
}

/// Optimisers the trainer knows how to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptimizerKind {
    Adam,
    AdamW,
    Sgd,
    RmsProp,
    AdaGrad,
}

impl OptimizerKind {
    /// Conventional default step size for each algorithm.
    pub fn default_learning_rate(&self) -> f64 {
        match self {
            OptimizerKind::Sgd => 1e-2,
            _ => 1e-3,
        }
    }
}

impl FromStr for OptimizerKind {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "adam"    => Ok(OptimizerKind::Adam),
            "adamw"   => Ok(OptimizerKind::AdamW),
            "sgd"     => Ok(OptimizerKind::Sgd),
            "rmsprop" => Ok(OptimizerKind::RmsProp),
            "adagrad" => Ok(OptimizerKind::AdaGrad),
            other => Err(PipelineError::UnsupportedOptimizer(other.to_string())),
        }
    }
}

impl fmt::Display for OptimizerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OptimizerKind::Adam    => "adam",
            OptimizerKind::AdamW   => "adamw",
            OptimizerKind::Sgd     => "sgd",
            OptimizerKind::RmsProp => "rmsprop",
            OptimizerKind::AdaGrad => "adagrad",
        };
        f.write_str(name)
    }
}
