// ============================================================
// Layer 3 - Domain Layer
// ============================================================
// Plain Rust types describing what a training run works with:
// the table, the task, the hyperparameters, the architecture
// selector, and the result record handed back to callers.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O or network calls
//   - Only plain Rust structs, enums, traits and pure functions

/// Column-oriented table with typed columns
pub mod table;

/// Task type and the advisory cardinality heuristic
pub mod task;

/// Optimizer / epochs / batch size with their defaults
pub mod hyperparameters;

/// Architecture selector (dense only)
pub mod architecture;

/// The result record returned after a successful upload
pub mod descriptor;

// Core abstractions (traits) that other layers implement
pub mod traits;
