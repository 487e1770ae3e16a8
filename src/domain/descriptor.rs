// ============================================================
// Layer 3 - Model Descriptor (Result Record)
// ============================================================
// The metadata handed back after a successful run. It only
// exists when BOTH artifacts were uploaded; a missing URL means
// there is no record at all.
//
// Serialised shape:
//   {
//     "modelUrl": "...",
//     "size": 0.0012,                 (GiB on disk)
//     "id": "uuid-v4",
//     "helpers": [{"scaler": "..."}],
//     "modelArch": {...},
//     "hyperparameters": {...}
//   }

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::hyperparameters::Hyperparameters;

const BYTES_PER_GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Auxiliary artifact needed alongside the model at inference time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HelperArtifact {
    Scaler(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelDescriptor {
    pub model_url:       String,
    pub size:            f64,
    pub id:              Uuid,
    pub helpers:         Vec<HelperArtifact>,
    pub model_arch:      serde_json::Value,
    pub hyperparameters: Hyperparameters,
}

impl ModelDescriptor {
    /// Build the record, or None unless both uploads produced a URL.
    pub fn assemble(
        model_url:       Option<String>,
        scaler_url:      Option<String>,
        model_bytes:     u64,
        model_arch:      serde_json::Value,
        hyperparameters: Hyperparameters,
    ) -> Option<Self> {
        let (model_url, scaler_url) = (model_url?, scaler_url?);
        Some(Self {
            model_url,
            size: model_bytes as f64 / BYTES_PER_GIB,
            id: Uuid::new_v4(),
            helpers: vec![HelperArtifact::Scaler(scaler_url)],
            model_arch,
            hyperparameters,
        })
    }

    pub fn scaler_url(&self) -> Option<&str> {
        self.helpers.iter().map(|h| match h {
            HelperArtifact::Scaler(url) => url.as_str(),
        }).next()
    }
}
