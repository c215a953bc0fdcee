// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// One use case per CLI mode. Each wires data, ml and infra
// together and does no work of its own:
//
//   train    — corpus → split → char list → epoch loop
//   validate — restore model → one validation pass
//   infer    — restore model → transcribe a folder of images
//
// No clap types cross into this layer; the CLI converts its
// arguments into the config structs defined here.

/// Training workflow
pub mod train_use_case;

/// Stand-alone validation of a trained model
pub mod validate_use_case;

/// Transcription of unlabelled images
pub mod infer_use_case;
