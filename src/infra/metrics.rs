// ============================================================
// Layer 6 - Metrics Logger
// ============================================================
// Records training metrics to a CSV file after each epoch.
//
// Metrics recorded per epoch:
//   - epoch:        the epoch number (1, 2, 3, ...)
//   - train_loss:   average loss over training batches
//   - val_loss:     loss on the validation partition
//   - val_accuracy: classification only, empty for regression
//
// Output file: <artifact_dir>/metrics.csv, truncated at the
// start of every run.
//
//   epoch,train_loss,val_loss,val_accuracy
//   1,0.912300,0.874100,0.612000
//   2,0.701200,0.699800,0.688000

use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// One row of metrics data for a single training epoch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochMetrics {
    pub epoch:        usize,
    pub train_loss:   f64,
    pub val_loss:     f64,
    pub val_accuracy: Option<f64>,
}

impl EpochMetrics {
    pub fn new(
        epoch:        usize,
        train_loss:   f64,
        val_loss:     f64,
        val_accuracy: Option<f64>,
    ) -> Self {
        Self { epoch, train_loss, val_loss, val_accuracy }
    }

    /// Returns true if this epoch improved over the previous best val_loss
    pub fn is_improvement(&self, best_val_loss: f64) -> bool {
        self.val_loss < best_val_loss
    }
}

pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    pub const FILE_NAME: &'static str = "metrics.csv";

    /// Create the CSV under `dir`, replacing any earlier run's file.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self, PipelineError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let csv_path = dir.join(Self::FILE_NAME);
        let mut f = fs::File::create(&csv_path)?;
        writeln!(f, "epoch,train_loss,val_loss,val_accuracy")?;
        tracing::debug!("Created metrics CSV: '{}'", csv_path.display());

        Ok(Self { csv_path })
    }

    /// Append one epoch's metrics as a new row.
    pub fn log(&self, m: &EpochMetrics) -> Result<(), PipelineError> {
        let mut f = OpenOptions::new().append(true).open(&self.csv_path)?;

        let accuracy = m.val_accuracy.map(|a| format!("{a:.6}")).unwrap_or_default();
        writeln!(f, "{},{:.6},{:.6},{}", m.epoch, m.train_loss, m.val_loss, accuracy)?;

        tracing::debug!(
            "Logged epoch {} metrics: train_loss={:.4}, val_loss={:.4}",
            m.epoch, m.train_loss, m.val_loss,
        );
        Ok(())
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }
}
