// ============================================================
// Layer 1 - CLI Commands and Arguments
// ============================================================
// Defines the two subcommands, `train` and `inspect`, and their
// flags. JSON-valued flags are parsed and validated here so a
// malformed mapping is reported before any data is loaded.

use std::path::PathBuf;
use clap::{Args, Subcommand};

use crate::application::train_use_case::RunConfig;
use crate::domain::{
    hyperparameters::Hyperparameters,
    task::TaskSelection,
};
use crate::infra::uploader::DEFAULT_UPLOAD_TIMEOUT_SECS;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train, evaluate, save and upload a model for a dataset
    Train(TrainArgs),

    /// Show the prepared columns and the suggested task type
    Inspect(InspectArgs),
}

#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Dataset location: local path or http(s) URL
    #[arg(long)]
    pub dataset: String,

    /// regression, classification, or auto (cardinality heuristic)
    #[arg(long, value_parser = parse_task)]
    pub task: TaskSelection,

    /// Architecture selector; only `default` is available
    #[arg(long, default_value = "default")]
    pub arch_type: String,

    /// Architecture descriptor (JSON) echoed into the result record
    #[arg(long, value_parser = parse_json)]
    pub architecture: Option<serde_json::Value>,

    /// JSON mapping with optimizer, epochs and batch_size
    #[arg(long, value_parser = parse_hyperparameters, default_value = "{}")]
    pub hyperparameters: Hyperparameters,

    /// Directory for model.mpk, scaler.json and metrics.csv
    #[arg(long, default_value = "artifacts")]
    pub artifact_dir: PathBuf,

    /// Field delimiter of the dataset
    #[arg(long, default_value = ",", value_parser = parse_delimiter)]
    pub delimiter: u8,

    /// Object store endpoint receiving the multipart uploads
    #[arg(long, env = "TABULAR_DL_UPLOAD_URL")]
    pub upload_url: String,

    /// Bucket the artifacts are stored under
    #[arg(long, env = "TABULAR_DL_BUCKET")]
    pub bucket: String,

    /// Per-request upload timeout in seconds
    #[arg(long, default_value_t = DEFAULT_UPLOAD_TIMEOUT_SECS)]
    pub timeout_secs: u64,
}

impl From<TrainArgs> for RunConfig {
    fn from(a: TrainArgs) -> Self {
        RunConfig {
            dataset:         a.dataset,
            delimiter:       a.delimiter,
            task:            a.task,
            arch_type:       a.arch_type,
            architecture:    a.architecture,
            hyperparameters: a.hyperparameters,
            artifact_dir:    a.artifact_dir,
            upload_url:      a.upload_url,
            bucket:          a.bucket,
            timeout_secs:    a.timeout_secs,
        }
    }
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Dataset location: local path or http(s) URL
    #[arg(long)]
    pub dataset: String,

    /// Field delimiter of the dataset
    #[arg(long, default_value = ",", value_parser = parse_delimiter)]
    pub delimiter: u8,
}

// ─── Value parsers ────────────────────────────────────────────────────────────
fn parse_task(s: &str) -> Result<TaskSelection, String> {
    s.parse().map_err(|e: crate::error::PipelineError| e.to_string())
}

fn parse_json(s: &str) -> Result<serde_json::Value, String> {
    serde_json::from_str(s).map_err(|e| format!("invalid JSON: {e}"))
}

fn parse_hyperparameters(s: &str) -> Result<Hyperparameters, String> {
    Hyperparameters::from_json(s).map_err(|e| e.to_string())
}

fn parse_delimiter(s: &str) -> Result<u8, String> {
    match s.as_bytes() {
        [b] if b.is_ascii() => Ok(*b),
        _ if s == "\\t" => Ok(b'\t'),
        _ => Err(format!("delimiter must be a single ASCII character, got '{s}'")),
    }
}
