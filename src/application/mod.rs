// ============================================================
// Layer 2 - Application / Use Cases
// ============================================================
// Workflow coordination only: no model math, no printing.
// Each use case drives the data, ml and infra layers in order
// and returns a plain value for the CLI to render.

// The full train → evaluate → save → upload workflow
pub mod train_use_case;

// Dataset preview with the advisory task type
pub mod inspect_use_case;
