// ============================================================
// Layer 2 - TrainUseCase
// ============================================================
// Orchestrates one training run in order:
//
//   Step 1: Validate configuration      (Layer 3 - domain)
//   Step 2: Load + prepare the table    (Layer 4 - data)
//   Step 3: Build the network           (Layer 5 - ml)
//   Step 4: Split, scale, train         (Layer 4 + 5)
//   Step 5: Evaluate on the holdout     (Layer 5 - ml)
//   Step 6: Save model + scaler         (Layer 6 - infra)
//   Step 7: Upload both artifacts       (Layer 6 - infra)
//   Step 8: Assemble the result record  (Layer 3 - domain)
//
// Steps 1-6 abort the run on error. Upload faults only remove a
// URL, and without both URLs the run returns no record.

use std::{
    path::PathBuf,
    time::Duration,
};
use anyhow::{Context, Result};
use burn::{module::AutodiffModule, tensor::backend::Backend};
use serde::{Deserialize, Serialize};

use crate::data::{
    dataset::{extract_samples, FeatureLayout, TabularSample},
    loader::CsvSource,
    preprocessor::{PreparedTable, Preprocessor},
    scaler::StandardScaler,
    splitter::{split_train_val, SPLIT_SEED, TEST_FRACTION},
};
use crate::domain::{
    architecture::Architecture,
    descriptor::ModelDescriptor,
    hyperparameters::Hyperparameters,
    task::{classify_task, TaskSelection, TaskType},
    traits::{ArtifactTransport, TableSource},
};
use crate::error::PipelineError;
use crate::infra::{
    artifacts::ArtifactStore,
    metrics::{EpochMetrics, MetricsLogger},
    uploader::{ArtifactUploader, HttpTransport, DEFAULT_UPLOAD_TIMEOUT_SECS},
};
use crate::ml::{
    evaluator::{evaluate, EvaluationReport},
    model::{describe, network_config, DenseNetwork, DenseNetworkConfig},
    trainer::{fit, EvalBackend, FitOptions, TrainBackend, TrainDevice, EARLY_STOPPING_PATIENCE},
};

// ─── Run Configuration ───────────────────────────────────────────────────────
// Everything one invocation needs. Built from CLI args, but the
// application layer never sees clap types.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub dataset:         String,
    pub delimiter:       u8,
    pub task:            TaskSelection,
    pub arch_type:       String,
    /// Caller's own architecture descriptor, echoed into the record.
    pub architecture:    Option<serde_json::Value>,
    pub hyperparameters: Hyperparameters,
    pub artifact_dir:    PathBuf,
    pub upload_url:      String,
    pub bucket:          String,
    pub timeout_secs:    u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            dataset:         String::new(),
            delimiter:       b',',
            task:            TaskSelection::Fixed(TaskType::Regression),
            arch_type:       "default".to_string(),
            architecture:    None,
            hyperparameters: Hyperparameters::default(),
            artifact_dir:    PathBuf::from("artifacts"),
            upload_url:      String::new(),
            bucket:          String::new(),
            timeout_secs:    DEFAULT_UPLOAD_TIMEOUT_SECS,
        }
    }
}

/// Turn the caller's selection into a concrete task. `Auto` looks
/// at how many distinct values the prepared target holds.
pub fn resolve_task(selection: TaskSelection, prepared: &PreparedTable) -> TaskType {
    match selection {
        TaskSelection::Fixed(task) => task,
        TaskSelection::Auto => {
            let distinct = prepared
                .table
                .column(&prepared.target)
                .map(|c| c.distinct_count())
                .unwrap_or(0);
            let task = classify_task(distinct, prepared.table.row_count());
            tracing::info!(
                "Target '{}' has {} distinct values in {} rows: treating as {}",
                prepared.target, distinct, prepared.table.row_count(), task
            );
            task
        }
    }
}

// ─── TrainingSession ─────────────────────────────────────────────────────────
/// State for one run: the prepared samples, then the network,
/// then the trained weights and the fitted scaler.
///
/// The stage methods must be called in order; calling one early
/// fails with a precondition error instead of panicking.
pub struct TrainingSession {
    task:    TaskType,
    samples: Vec<TabularSample>,
    layout:  FeatureLayout,
    device:  TrainDevice,
    network: Option<DenseNetworkConfig>,
    model:   Option<DenseNetwork<TrainBackend>>,
    trained: Option<DenseNetwork<EvalBackend>>,
    scaler:  StandardScaler,
    holdout: Vec<TabularSample>,
    history: Vec<EpochMetrics>,
}

impl TrainingSession {
    /// Load `source`, prepare it and extract samples for `selection`.
    pub fn prepare(source: &dyn TableSource, selection: TaskSelection) -> Result<Self, PipelineError> {
        tracing::info!("Loading dataset from '{}'", source.location());
        let table = source.load()?;
        let prepared = Preprocessor::new().prepare(table)?;
        let task = resolve_task(selection, &prepared);
        Self::from_prepared(&prepared, task)
    }

    pub fn from_prepared(prepared: &PreparedTable, task: TaskType) -> Result<Self, PipelineError> {
        let (samples, layout) = extract_samples(prepared, task)?;
        tracing::info!(
            "Prepared {} samples with {} features, target '{}' ({})",
            samples.len(),
            layout.input_width(),
            layout.target,
            task
        );

        Ok(Self {
            task,
            scaler: StandardScaler::new(layout.feature_names.clone()),
            samples,
            layout,
            device: TrainDevice::default(),
            network: None,
            model: None,
            trained: None,
            holdout: Vec::new(),
            history: Vec::new(),
        })
    }

    pub fn layout(&self) -> &FeatureLayout {
        &self.layout
    }

    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    /// Create the network for `architecture` with freshly seeded weights.
    pub fn build_model(&mut self, architecture: Architecture) -> Result<&DenseNetworkConfig, PipelineError> {
        let config = network_config(
            architecture,
            self.layout.input_width(),
            self.task,
            self.layout.class_count(),
        )?;

        TrainBackend::seed(SPLIT_SEED);
        self.model   = Some(config.init::<TrainBackend>(&self.device));
        self.trained = None;
        tracing::info!(
            "Built {} network: {} → {:?} → {}",
            architecture.name(),
            config.input_width,
            config.hidden_layers,
            config.output_width
        );

        Ok(self.network.insert(config))
    }

    /// Split 80/20, scale (regression only) and train.
    pub fn compile_and_train(
        &mut self,
        hyperparameters: &Hyperparameters,
        logger:          Option<&MetricsLogger>,
    ) -> Result<&[EpochMetrics], PipelineError> {
        if self.model.is_none() {
            return Err(PipelineError::ModelNotBuilt);
        }
        hyperparameters.validate()?;
        let optimizer = hyperparameters.optimizer_kind()?;

        // ── Split before any statistics are computed ──────────────────────────
        let (mut train, mut holdout) = split_train_val(self.samples.clone(), TEST_FRACTION, SPLIT_SEED);
        if train.is_empty() || holdout.is_empty() {
            return Err(PipelineError::InsufficientData(format!(
                "{} rows give {} training and {} validation samples; both must be non-empty",
                self.samples.len(),
                train.len(),
                holdout.len()
            )));
        }
        tracing::info!("Split: {} train, {} validation", train.len(), holdout.len());

        // ── Scale with training statistics only ───────────────────────────────
        if self.task == TaskType::Regression {
            let rows: Vec<Vec<f32>> = train.iter().map(|s| s.features.clone()).collect();
            self.scaler.fit(&rows);
            scale_samples(&self.scaler, &mut train)?;
            scale_samples(&self.scaler, &mut holdout)?;
        }

        let options = FitOptions {
            task:       self.task,
            optimizer,
            epochs:     hyperparameters.epochs,
            batch_size: hyperparameters.batch_size,
            patience:   EARLY_STOPPING_PATIENCE,
        };
        let model = self.model.take().ok_or(PipelineError::ModelNotBuilt)?;
        let outcome = fit(model, train, &holdout, &options, &self.device, logger)?;
        if outcome.stopped_early {
            tracing::info!("Stopped after {} epochs", outcome.history.len());
        }

        self.trained = Some(outcome.model.valid());
        self.holdout = holdout;
        self.history = outcome.history;
        Ok(&self.history)
    }

    /// Loss (and accuracy) on the held-out partition.
    pub fn evaluate(&self) -> Result<EvaluationReport, PipelineError> {
        let model = self.trained.as_ref().ok_or(PipelineError::ModelNotTrained)?;
        Ok(evaluate(model, &self.holdout, self.task, &self.device))
    }

    /// Write model and scaler, returning their paths.
    pub fn save(&self, store: &ArtifactStore) -> Result<(PathBuf, PathBuf), PipelineError> {
        let model = self.trained.as_ref().ok_or(PipelineError::ModelNotTrained)?;
        let model_path  = store.save_model(model)?;
        let scaler_path = store.save_scaler(&self.scaler)?;
        Ok((model_path, scaler_path))
    }

    /// Generated summary of the built network, if there is one.
    pub fn describe(&self) -> Option<serde_json::Value> {
        self.network.as_ref().map(|config| describe(config, self.task))
    }
}

fn scale_samples(scaler: &StandardScaler, samples: &mut [TabularSample]) -> Result<(), PipelineError> {
    let mut rows: Vec<Vec<f32>> = samples.iter_mut().map(|s| std::mem::take(&mut s.features)).collect();
    scaler.transform(&mut rows)?;
    for (sample, row) in samples.iter_mut().zip(rows) {
        sample.features = row;
    }
    Ok(())
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: RunConfig,
}

impl TrainUseCase {
    pub fn new(config: RunConfig) -> Self {
        Self { config }
    }

    /// Run the pipeline against the configured HTTP endpoint.
    pub fn execute(&self) -> Result<Option<ModelDescriptor>> {
        let transport = HttpTransport::new(
            &self.config.upload_url,
            Duration::from_secs(self.config.timeout_secs),
        )
        .context("Cannot build HTTP client for uploads")?;
        self.execute_with(&transport)
    }

    /// Run the pipeline, uploading through `transport`.
    pub fn execute_with(&self, transport: &dyn ArtifactTransport) -> Result<Option<ModelDescriptor>> {
        let cfg = &self.config;

        // ── Step 1: Validate configuration ────────────────────────────────────
        let architecture: Architecture = cfg.arch_type.parse()?;
        cfg.hyperparameters.validate()?;

        // ── Step 2: Load and prepare the table ────────────────────────────────
        let source = CsvSource::new(&cfg.dataset, cfg.delimiter);
        let mut session = TrainingSession::prepare(&source, cfg.task)
            .with_context(|| format!("Cannot prepare dataset '{}'", cfg.dataset))?;

        // ── Step 3: Build the network ─────────────────────────────────────────
        session.build_model(architecture)?;

        // ── Step 4: Train ─────────────────────────────────────────────────────
        let logger = MetricsLogger::new(&cfg.artifact_dir)
            .with_context(|| format!("Cannot create metrics log in '{}'", cfg.artifact_dir.display()))?;
        let history = session.compile_and_train(&cfg.hyperparameters, Some(&logger))?;
        tracing::info!("{} epoch metrics written to '{}'", history.len(), logger.csv_path().display());

        // ── Step 5: Evaluate ──────────────────────────────────────────────────
        let report = session.evaluate()?;
        match report.accuracy {
            Some(acc) => tracing::info!("Test loss: {:.4}, test accuracy: {:.1}%", report.loss, acc * 100.0),
            None      => tracing::info!("Test loss: {:.4}", report.loss),
        }

        // ── Step 6: Save artifacts ────────────────────────────────────────────
        let store = ArtifactStore::new(&cfg.artifact_dir);
        let (model_path, scaler_path) = session
            .save(&store)
            .with_context(|| format!("Cannot save artifacts to '{}'", cfg.artifact_dir.display()))?;

        // ── Step 7: Upload ────────────────────────────────────────────────────
        let uploader = ArtifactUploader::new(transport, cfg.bucket.clone());
        let (model_url, scaler_url) = uploader.upload_pair(&model_path, &scaler_path);

        // ── Step 8: Assemble the result record ────────────────────────────────
        let model_arch = cfg
            .architecture
            .clone()
            .or_else(|| session.describe())
            .unwrap_or(serde_json::Value::Null);
        let size = store.model_size()?;

        let descriptor = ModelDescriptor::assemble(
            model_url,
            scaler_url,
            size,
            model_arch,
            cfg.hyperparameters.clone(),
        );
        match &descriptor {
            Some(d) => tracing::info!(
                "Model {} published at {} (scaler: {})",
                d.id,
                d.model_url,
                d.scaler_url().unwrap_or("-")
            ),
            None    => tracing::warn!("An artifact upload failed; no result record produced"),
        }
        Ok(descriptor)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use crate::domain::traits::TransportResponse;
    use crate::error::UploadError;

    /// Accepts every upload and answers with a URL per file name,
    /// unless the name is listed in `reject`.
    struct FakeStore {
        reject: Vec<&'static str>,
    }

    impl ArtifactTransport for FakeStore {
        fn put(&self, bucket: &str, file_name: &str, _payload: Vec<u8>) -> Result<TransportResponse, UploadError> {
            if self.reject.contains(&file_name) {
                return Ok(TransportResponse { status: 500, body: r#"{"error":"disk full"}"#.into() });
            }
            Ok(TransportResponse {
                status: 200,
                body:   format!(r#"{{"locations":["https://store/{bucket}/{file_name}"]}}"#),
            })
        }
    }

    fn regression_csv() -> String {
        let mut csv = String::from("size,colour,note,price\n");
        for i in 0..30 {
            let colour = ["red", "green", "blue"][i % 3];
            csv.push_str(&format!("{},{},n{},{}\n", i, colour, i, i as f64 * 2.5 + 1.0));
        }
        csv
    }

    fn config_for(dir: &std::path::Path, csv: &str) -> RunConfig {
        let dataset = dir.join("data.csv");
        fs::write(&dataset, csv).unwrap();
        RunConfig {
            dataset: dataset.to_string_lossy().into_owned(),
            artifact_dir: dir.join("artifacts"),
            upload_url: "http://unused".into(),
            bucket: "models".into(),
            hyperparameters: Hyperparameters { epochs: 2, batch_size: 8, ..Default::default() },
            ..RunConfig::default()
        }
    }

    fn session_from(csv: &str, task: TaskType) -> TrainingSession {
        let table = crate::data::loader::parse_delimited(csv.as_bytes(), b',', "inline").unwrap();
        let prepared = Preprocessor::new().prepare(table).unwrap();
        TrainingSession::from_prepared(&prepared, task).unwrap()
    }

    #[test]
    fn test_train_before_build_fails() {
        let mut session = session_from(&regression_csv(), TaskType::Regression);
        let err = session.compile_and_train(&Hyperparameters::default(), None).unwrap_err();
        assert!(matches!(err, PipelineError::ModelNotBuilt));
    }

    #[test]
    fn test_evaluate_before_train_fails() {
        let mut session = session_from(&regression_csv(), TaskType::Regression);
        session.build_model(Architecture::Dense).unwrap();
        assert!(matches!(session.evaluate().unwrap_err(), PipelineError::ModelNotTrained));
    }

    #[test]
    fn test_input_width_counts_indicators() {
        let mut session = session_from(&regression_csv(), TaskType::Regression);
        // size + colour_blue + colour_green + colour_red; `note` is dropped
        let config = session.build_model(Architecture::Dense).unwrap();
        assert_eq!(config.input_width, 4);
        assert_eq!(config.output_width, 1);
    }

    #[test]
    fn test_scaler_fit_on_training_rows_only() {
        let mut session = session_from(&regression_csv(), TaskType::Regression);
        session.build_model(Architecture::Dense).unwrap();
        let hp = Hyperparameters { epochs: 1, batch_size: 8, ..Default::default() };
        session.compile_and_train(&hp, None).unwrap();

        // 30 rows → 6 validation, 24 training
        assert_eq!(session.scaler().n_samples_seen, 24);
        assert!(session.scaler().is_fitted());
    }

    #[test]
    fn test_classification_leaves_scaler_unfitted() {
        let mut csv = String::from("a,b,label\n");
        for i in 0..20 {
            csv.push_str(&format!("{},{},{}\n", i, 20 - i, i % 2));
        }
        let mut session = session_from(&csv, TaskType::Classification);
        assert_eq!(session.layout().class_count(), 2);

        session.build_model(Architecture::Dense).unwrap();
        let hp = Hyperparameters { epochs: 2, batch_size: 4, ..Default::default() };
        session.compile_and_train(&hp, None).unwrap();

        assert!(!session.scaler().is_fitted());
        assert!(session.evaluate().unwrap().accuracy.is_some());
    }

    #[test]
    fn test_single_row_is_insufficient() {
        let mut session = session_from("x,y\n1,2\n", TaskType::Regression);
        session.build_model(Architecture::Dense).unwrap();
        let err = session.compile_and_train(&Hyperparameters::default(), None).unwrap_err();
        assert!(matches!(err, PipelineError::InsufficientData(_)));
    }

    #[test]
    fn test_unsupported_architecture_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let config = RunConfig { arch_type: "lstm".into(), ..config_for(dir.path(), &regression_csv()) };
        let err = TrainUseCase::new(config)
            .execute_with(&FakeStore { reject: vec![] })
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::UnsupportedArchitecture(_))
        ));
    }

    #[test]
    fn test_end_to_end_produces_record() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(dir.path(), &regression_csv());
        let artifacts = config.artifact_dir.clone();

        let record = TrainUseCase::new(config)
            .execute_with(&FakeStore { reject: vec![] })
            .unwrap()
            .expect("both uploads succeed");

        assert_eq!(record.model_url, "https://store/models/model.mpk");
        assert_eq!(record.scaler_url(), Some("https://store/models/scaler.json"));
        assert_eq!(record.hyperparameters.epochs, 2);
        assert_eq!(record.model_arch["hiddenLayers"], serde_json::json!([64, 32]));
        assert!(record.size > 0.0);

        assert!(artifacts.join("model.mpk").exists());
        assert!(artifacts.join("scaler.json").exists());
        let metrics = fs::read_to_string(artifacts.join("metrics.csv")).unwrap();
        assert_eq!(metrics.lines().count(), 3);
    }

    #[test]
    fn test_caller_architecture_is_echoed() {
        let dir = tempfile::tempdir().unwrap();
        let arch = serde_json::json!({"layers": [{"units": 64}]});
        let config = RunConfig {
            architecture: Some(arch.clone()),
            ..config_for(dir.path(), &regression_csv())
        };
        let record = TrainUseCase::new(config)
            .execute_with(&FakeStore { reject: vec![] })
            .unwrap()
            .unwrap();
        assert_eq!(record.model_arch, arch);
    }

    #[test]
    fn test_failed_scaler_upload_gives_no_record() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(dir.path(), &regression_csv());
        let record = TrainUseCase::new(config)
            .execute_with(&FakeStore { reject: vec!["scaler.json"] })
            .unwrap();
        assert!(record.is_none());
    }

    #[test]
    fn test_textual_target_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(dir.path(), "x,label\n1,yes\n2,no\n3,yes\n4,no\n5,yes\n");
        let err = TrainUseCase::new(config)
            .execute_with(&FakeStore { reject: vec![] })
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::TargetDropped(_))
        ));
    }
}
