// ============================================================
// Layer 2 - Inspect Use Case
// ============================================================
// Loads and prepares a dataset without training, and reports
// what a training run would see: the prepared columns, the
// target, and the task the cardinality heuristic suggests.
//
// The suggestion is advisory; `train` only uses it when asked
// for `--task auto`.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::data::{loader::CsvSource, preprocessor::Preprocessor};
use crate::domain::{
    task::{classify_task, TaskType},
    traits::TableSource,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub rows:            usize,
    pub columns:         Vec<String>,
    pub target:          String,
    pub distinct_target: usize,
    pub suggested_task:  TaskType,
}

pub struct InspectUseCase {
    source: Box<dyn TableSource>,
}

impl InspectUseCase {
    pub fn new(dataset: impl Into<String>, delimiter: u8) -> Self {
        Self::with_source(Box::new(CsvSource::new(dataset, delimiter)))
    }

    pub fn with_source(source: Box<dyn TableSource>) -> Self {
        Self { source }
    }

    pub fn execute(&self) -> Result<DatasetSummary> {
        let table = self
            .source
            .load()
            .with_context(|| format!("Cannot inspect '{}'", self.source.location()))?;
        let prepared = Preprocessor::new().prepare(table)?;

        let rows = prepared.table.row_count();
        let distinct_target = prepared
            .table
            .column(&prepared.target)
            .map(|c| c.distinct_count())
            .unwrap_or(0);

        Ok(DatasetSummary {
            rows,
            columns: prepared.table.column_names(),
            target: prepared.target,
            distinct_target,
            suggested_task: classify_task(distinct_target, rows),
        })
    }
}
