// ============================================================
// Layer 3 — Core Traits (Collaborator Seams)
// ============================================================
// The training core never sees a concrete model, preprocessor or
// corpus format. It is written against these three traits:
//
//   CorpusSource   — yields the ordered corpus of samples
//   BatchProcessor — image preprocessing / augmentation
//   Recognizer     — the trainable text recognizer
//
// All calls are blocking. The controller never issues two of them
// at the same time, so none of the traits require Send or Sync.
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;

use crate::domain::sample::{Batch, GrayImage, Sample};

// ─── CorpusSource ─────────────────────────────────────────────────────────────
/// Anything that can produce the full ordered corpus.
pub trait CorpusSource {
    fn load_all(&self) -> Result<Vec<Sample>>;
}

// ─── BatchProcessor ───────────────────────────────────────────────────────────
/// Image preprocessing applied between the cursor and the model.
pub trait BatchProcessor {
    /// Turn augmentation on or off. The controller mirrors the
    /// cursor's augmentation flag here after every mode switch.
    fn set_augmentation(&mut self, enabled: bool);

    /// Preprocess every image of a batch, keeping texts and order.
    fn process_batch(&mut self, batch: Batch) -> Result<Batch>;

    /// Preprocess a single image (inference path).
    fn process_img(&mut self, img: &GrayImage) -> Result<GrayImage>;
}

// ─── Recognizer ───────────────────────────────────────────────────────────────
/// Output of one inference call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Inference {
    /// One recognized text per batch element, in batch order
    pub texts: Vec<String>,

    /// Per-sample confidence, only filled when raw mode was requested
    pub confidences: Option<Vec<f32>>,
}

/// The trainable model, seen from the training loop.
pub trait Recognizer {
    /// One optimisation step on a labelled batch; returns the loss.
    fn train_batch(&mut self, batch: &Batch) -> Result<f32>;

    /// Recognize the text in every image of the batch.
    /// `raw_mode` additionally asks for per-sample confidences.
    fn infer_batch(&mut self, batch: &Batch, raw_mode: bool) -> Result<Inference>;

    /// Persist the current model state.
    fn save(&mut self) -> Result<()>;
}
