// ============================================================
// Layer 5 — ML Layer
// ============================================================
//   metrics.rs    — edit distance, character error rate and word
//                   accuracy, accumulated over a whole pass
//
//   controller.rs — the epoch loop: train pass, validation pass,
//                   summary, checkpoint on best CER, early stopping
//
//   recognizer.rs — nearest-template reference implementation of
//                   the Recognizer trait used by the CLI
//
// The controller only knows the Recognizer and BatchProcessor traits
// from the domain layer, never a concrete model.

/// CER / word accuracy
pub mod metrics;

/// Training and validation control loop
pub mod controller;

/// Reference recognizer
pub mod recognizer;
