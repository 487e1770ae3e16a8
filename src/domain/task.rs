// ============================================================
// Layer 3 - Task Type
// ============================================================
// A run is either regression (one continuous output) or
// classification (one output per class).
//
// The task is normally supplied by the caller. classify_task is
// an advisory heuristic that callers opt into explicitly
// (`--task auto` or the `inspect` command); it never overrides
// a task the caller named.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// Above this distinct-values / rows ratio a target is treated
/// as continuous.
pub const REGRESSION_CARDINALITY_RATIO: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    Regression,
    Classification,
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskType::Regression     => write!(f, "regression"),
            TaskType::Classification => write!(f, "classification"),
        }
    }
}

impl FromStr for TaskType {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "regression"     => Ok(TaskType::Regression),
            "classification" => Ok(TaskType::Classification),
            other => Err(PipelineError::UnsupportedTask(other.to_string())),
        }
    }
}

/// What the caller asked for: a fixed task, or the heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskSelection {
    Fixed(TaskType),
    Auto,
}

impl FromStr for TaskSelection {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("auto") {
            Ok(TaskSelection::Auto)
        } else {
            s.parse().map(TaskSelection::Fixed)
        }
    }
}

/// Label a target as regression when more than 10% of its
/// values are distinct, classification otherwise.
///
/// An empty target has no meaningful ratio and is reported as
/// classification.
pub fn classify_task(distinct_values: usize, row_count: usize) -> TaskType {
    if row_count == 0 {
        return TaskType::Classification;
    }
    let ratio = distinct_values as f64 / row_count as f64;
    if ratio > REGRESSION_CARDINALITY_RATIO {
        TaskType::Regression
    } else {
        TaskType::Classification
    }
}
