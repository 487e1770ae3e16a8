// ============================================================
// Layer 6 - Infrastructure Layer
// ============================================================
// Side effects that sit outside the training math:
//
//   artifacts.rs - model record and scaler JSON on disk
//                  (Burn CompactRecorder + serde_json)
//
//   uploader.rs  - multipart PUT of each artifact to the object
//                  store; failures become missing URLs
//
//   metrics.rs   - per-epoch metrics CSV

/// Model and scaler persistence
pub mod artifacts;

/// HTTP upload of saved artifacts
pub mod uploader;

/// Training metrics CSV logger
pub mod metrics;
