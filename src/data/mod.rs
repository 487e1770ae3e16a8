// ============================================================
// Layer 4 - Data Pipeline
// ============================================================
// Everything from a raw delimited file to tensor batches.
//
//   CSV file / URL
//       │
//       ▼
//   CsvSource        → typed Table (numeric / boolean / text)
//       │
//       ▼
//   Preprocessor     → one-hot small categories, drop other text
//       │
//       ▼
//   extract_samples  → row-major features + encoded targets
//       │
//       ▼
//   split_train_val  → seeded 80/20 split
//       │
//       ▼
//   StandardScaler   → fit on train rows (regression only)
//       │
//       ▼
//   TabularDataset   → Burn Dataset
//       │
//       ▼
//   TabularBatcher   → tensor batches for the DataLoader

/// Reads delimited files from disk or HTTP
pub mod loader;

/// One-hot encoding and column pruning
pub mod preprocessor;

/// Burn Dataset plus feature/target extraction
pub mod dataset;

/// Burn Batcher producing tensor batches
pub mod batcher;

/// Seeded train/validation split
pub mod splitter;

/// Zero-mean, unit-variance feature scaling
pub mod scaler;
