use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};

use crate::data::preprocessor::PreparedTable;
use crate::domain::task::TaskType;
use crate::error::PipelineError;

/// One row of features plus its target.
///
/// For classification `target` is the class index (0..k-1)
/// stored as a float; for regression it is the raw value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabularSample {
    pub features: Vec<f32>,
    pub target:   f32,
}

/// How table columns map onto model inputs and outputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureLayout {
    pub feature_names: Vec<String>,
    pub target:        String,
    /// Sorted distinct target values; index = class id. Empty for regression.
    pub classes:       Vec<f64>,
}

impl FeatureLayout {
    pub fn input_width(&self) -> usize {
        self.feature_names.len()
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }
}

/// Row-major samples from a prepared table. Every column except
/// the target becomes a feature, in table order.
pub fn extract_samples(
    prepared: &PreparedTable,
    task:     TaskType,
) -> Result<(Vec<TabularSample>, FeatureLayout), PipelineError> {
    let table = &prepared.table;
    let target_col = table
        .column(&prepared.target)
        .ok_or_else(|| PipelineError::TargetDropped(prepared.target.clone()))?;

    let numeric = |name: &str, values: Option<Vec<Option<f64>>>| {
        values.ok_or_else(|| PipelineError::dataset_load(name, "column is not numeric after preparation"))
    };

    let mut feature_names = Vec::new();
    let mut feature_columns = Vec::new();
    for column in table.columns().iter().filter(|c| c.name != prepared.target) {
        feature_names.push(column.name.clone());
        feature_columns.push(numeric(&column.name, column.to_numbers())?);
    }

    let raw_targets = numeric(&target_col.name, target_col.to_numbers())?;
    let classes = match task {
        TaskType::Regression     => Vec::new(),
        TaskType::Classification => target_col.distinct_numbers(),
    };

    let samples = (0..table.row_count())
        .map(|row| {
            let features = feature_columns
                .iter()
                .map(|col| col[row].unwrap_or(0.0) as f32)
                .collect();
            let value = raw_targets[row].unwrap_or(0.0);
            let target = match task {
                TaskType::Regression => value as f32,
                TaskType::Classification => classes
                    .iter()
                    .position(|c| *c == value)
                    .unwrap_or(0) as f32,
            };
            TabularSample { features, target }
        })
        .collect();

    let layout = FeatureLayout {
        feature_names,
        target: prepared.target.clone(),
        classes,
    };
    Ok((samples, layout))
}

pub struct TabularDataset {
    samples: Vec<TabularSample>,
}

impl TabularDataset {
    pub fn new(samples: Vec<TabularSample>) -> Self { Self { samples } }
}

impl Dataset<TabularSample> for TabularDataset {
    fn get(&self, index: usize) -> Option<TabularSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}
