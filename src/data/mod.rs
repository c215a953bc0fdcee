// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything between the corpus on disk and the model input:
//
//   sentences.json + images.json
//       │
//       ▼
//   JsonCorpusLoader  → ordered Vec<Sample>
//       │
//       ▼
//   SampleStore       → fixed train / validation partitions
//       │
//       ▼
//   BatchCursor       → fixed-size batches, mode-dependent tail policy
//       │
//       ▼
//   Preprocessor      → fit to canvas, optional augmentation
//       │
//       ▼
//   Recognizer (ml layer)

/// Reads a JSON corpus directory
pub mod loader;

/// Ordered corpus and its train/validation split
pub mod store;

/// Batch iteration over one partition
pub mod cursor;

/// Image fitting and augmentation
pub mod preprocessor;
