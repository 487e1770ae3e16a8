// ============================================================
// Layer 5 - ML / Model Layer (Burn)
// ============================================================
// All Burn model, loss and optimizer code lives here.
//
//   model.rs     - dense feed-forward network
//                  input → Linear(64) → ReLU → Linear(32) → ReLU → head
//                  head is 1 linear unit (regression) or one
//                  logit per class (classification)
//
//   trainer.rs   - mini-batch training loop with a named
//                  optimizer, per-epoch validation and early
//                  stopping on val_loss
//
//   evaluator.rs - loss (and accuracy) on held-out samples
//
// The data layer only shares TabularBatcher with this one; the
// application layer drives training through `trainer::fit`.

/// Dense network definition and architecture summary
pub mod model;

/// Training loop with early stopping
pub mod trainer;

/// Held-out evaluation
pub mod evaluator;
