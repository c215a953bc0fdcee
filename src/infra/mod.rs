// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Files that outlive a single process:
//
//   checkpoint.rs — model directory: config, recognizer snapshot,
//                   and the paths of the two files below
//   char_list.rs  — the alphabet shared by training and inference
//   summary.rs    — per-epoch CER / word accuracy history
//
// Reference: Rust Book §9 (Error Handling with anyhow)

/// Model directory, config and snapshot persistence
pub mod checkpoint;

/// Character list file
pub mod char_list;

/// summary.json writer
pub mod summary;
