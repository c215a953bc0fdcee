// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust types shared by every other layer:
//
//   sample.rs — GrayImage, Sample and Batch
//   error.rs  — the typed error taxonomy (HtrError)
//   traits.rs — the collaborator seams: Recognizer, BatchProcessor,
//               CorpusSource
//
// Nothing in here touches the filesystem or knows how a model
// is implemented. The training core only ever sees these types.

/// Images, samples and batches
pub mod sample;

/// Error taxonomy for corpus, cursor and metric failures
pub mod error;

/// Interfaces implemented by the model, preprocessor and corpus loader
pub mod traits;
