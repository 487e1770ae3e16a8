// ============================================================
// Layer 3 - Architecture Selector
// ============================================================
// The only network family is a plain stack of dense layers,
// selected with "default". Convolutional, recurrent and
// attention-based selectors are reserved names: they are
// rejected like any other unknown selector until implemented.

use std::str::FromStr;

use crate::error::PipelineError;

/// Hidden layer widths of the default dense network.
pub const DEFAULT_HIDDEN_LAYERS: [usize; 2] = [64, 32];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Architecture {
    Dense,
}

impl Architecture {
    pub fn name(&self) -> &'static str {
        match self {
            Architecture::Dense => "dense",
        }
    }
}

impl FromStr for Architecture {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "default" => Ok(Architecture::Dense),
            other => Err(PipelineError::UnsupportedArchitecture(other.to_string())),
        }
    }
}
