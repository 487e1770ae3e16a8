// ============================================================
// Layer 4 - Standard Scaler
// ============================================================
// Rescales every feature to zero mean and unit variance:
//
//   x' = (x - mean) / scale
//
// mean and scale are fit once, on the training partition only,
// and then applied unchanged to validation rows and at inference
// time. scale is the population standard deviation; a constant
// feature gets scale 1 so it maps to 0 instead of NaN.
//
// Classification runs never fit the scaler. Its unfitted state
// is still persisted so every run publishes the same pair of
// artifacts.

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub feature_names:  Vec<String>,
    pub mean:           Option<Vec<f64>>,
    pub scale:          Option<Vec<f64>>,
    pub n_samples_seen: usize,
}

impl StandardScaler {
    pub fn new(feature_names: Vec<String>) -> Self {
        Self { feature_names, ..Self::default() }
    }

    pub fn is_fitted(&self) -> bool {
        self.mean.is_some() && self.scale.is_some()
    }

    /// Learn per-feature mean and standard deviation from `rows`.
    pub fn fit(&mut self, rows: &[Vec<f32>]) {
        let width = rows.first().map(Vec::len).unwrap_or(self.feature_names.len());
        let n = rows.len().max(1) as f64;

        let mut mean = vec![0.0f64; width];
        for row in rows {
            for (m, &x) in mean.iter_mut().zip(row) {
                *m += x as f64;
            }
        }
        mean.iter_mut().for_each(|m| *m /= n);

        let mut var = vec![0.0f64; width];
        for row in rows {
            for ((v, &x), m) in var.iter_mut().zip(row).zip(&mean) {
                let d = x as f64 - m;
                *v += d * d;
            }
        }
        let scale = var
            .into_iter()
            .map(|v| {
                let std = (v / n).sqrt();
                if std < f64::EPSILON { 1.0 } else { std }
            })
            .collect();

        self.mean           = Some(mean);
        self.scale          = Some(scale);
        self.n_samples_seen = rows.len();
        tracing::debug!("Scaler fit on {} rows x {} features", rows.len(), width);
    }

    /// Standardise `rows` in place with the fitted statistics.
    pub fn transform(&self, rows: &mut [Vec<f32>]) -> Result<(), PipelineError> {
        let (Some(mean), Some(scale)) = (&self.mean, &self.scale) else {
            return Err(PipelineError::ScalerNotFitted);
        };
        for row in rows.iter_mut() {
            for ((x, m), s) in row.iter_mut().zip(mean).zip(scale) {
                *x = ((*x as f64 - m) / s) as f32;
            }
        }
        Ok(())
    }
}
