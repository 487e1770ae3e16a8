// ============================================================
// Layer 6 - Artifact Store
// ============================================================
// Writes the trained model and its scaler to one directory per
// run and reads them back.
//
//   <artifact_dir>/
//     model.mpk      ← network weights (CompactRecorder)
//     scaler.json    ← StandardScaler state
//     metrics.csv    ← written by MetricsLogger
//
// Both files are overwritten on every run. The recorder adds the
// `.mpk` extension itself, so it is handed the bare stem.

use std::{
    fs,
    path::PathBuf,
};
use burn::{
    prelude::*,
    record::{CompactRecorder, Recorder},
};

use crate::data::scaler::StandardScaler;
use crate::error::PipelineError;
use crate::ml::model::{DenseNetwork, DenseNetworkConfig};

const MODEL_STEM:      &str = "model";
const MODEL_EXTENSION: &str = "mpk";
const SCALER_FILE:     &str = "scaler.json";

#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn model_path(&self) -> PathBuf {
        self.dir.join(MODEL_STEM).with_extension(MODEL_EXTENSION)
    }

    pub fn scaler_path(&self) -> PathBuf {
        self.dir.join(SCALER_FILE)
    }

    /// Record the network weights, returning the written file.
    pub fn save_model<B: Backend>(&self, model: &DenseNetwork<B>) -> Result<PathBuf, PipelineError> {
        fs::create_dir_all(&self.dir)?;
        let stem = self.dir.join(MODEL_STEM);

        CompactRecorder::new()
            .record(model.clone().into_record(), stem.clone())
            .map_err(|e| PipelineError::Record { path: stem, reason: e.to_string() })?;

        let path = self.model_path();
        tracing::debug!("Saved model to '{}'", path.display());
        Ok(path)
    }

    /// Rebuild a network from `config` and load the saved weights into it.
    pub fn load_model<B: Backend>(
        &self,
        config: &DenseNetworkConfig,
        device: &B::Device,
    ) -> Result<DenseNetwork<B>, PipelineError> {
        let stem = self.dir.join(MODEL_STEM);
        let record = CompactRecorder::new()
            .load(stem.clone(), device)
            .map_err(|e| PipelineError::Record { path: stem, reason: e.to_string() })?;
        Ok(config.init::<B>(device).load_record(record))
    }

    pub fn save_scaler(&self, scaler: &StandardScaler) -> Result<PathBuf, PipelineError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.scaler_path();
        fs::write(&path, serde_json::to_string_pretty(scaler)?)?;
        tracing::debug!("Saved scaler to '{}'", path.display());
        Ok(path)
    }

    pub fn load_scaler(&self) -> Result<StandardScaler, PipelineError> {
        let json = fs::read_to_string(self.scaler_path())?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Size of the saved model file in bytes.
    pub fn model_size(&self) -> Result<u64, PipelineError> {
        Ok(fs::metadata(self.model_path())?.len())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type B = NdArray;

    #[test]
    fn test_model_roundtrip_keeps_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path().join("run"));
        let device = Default::default();

        let config = DenseNetworkConfig::new(3, vec![4], 1);
        let model: DenseNetwork<B> = config.init(&device);
        let path = store.save_model(&model).unwrap();

        assert_eq!(path, dir.path().join("run").join("model.mpk"));
        assert!(path.exists());
        assert!(store.model_size().unwrap() > 0);

        let loaded: DenseNetwork<B> = store.load_model(&config, &device).unwrap();
        let x = Tensor::<B, 2>::ones([1, 3], &device);
        let a: f32 = model.forward(x.clone()).into_scalar();
        let b: f32 = loaded.forward(x).into_scalar();
        // CompactRecorder stores half precision
        assert!((a - b).abs() < 1e-2);
    }

    #[test]
    fn test_scaler_roundtrip_and_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());

        store.save_scaler(&StandardScaler::new(vec!["a".into()])).unwrap();
        let mut fitted = StandardScaler::new(vec!["a".into()]);
        fitted.fit(&[vec![1.0], vec![3.0]]);
        store.save_scaler(&fitted).unwrap();

        assert_eq!(store.load_scaler().unwrap(), fitted);
    }

    #[test]
    fn test_missing_model_is_record_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        let config = DenseNetworkConfig::new(1, vec![], 1);
        let err = store.load_model::<B>(&config, &Default::default()).unwrap_err();
        assert!(matches!(err, PipelineError::Record { .. }));
    }
}
