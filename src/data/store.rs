// ============================================================
// Layer 4 — Sample Store (Train/Validation Split)
// ============================================================
// Holds the ordered corpus and splits it into two partitions:
//   - Training set:   the first ⌊f·N⌋ samples
//   - Validation set: everything after that
//
// The split is deterministic and order-preserving. There is no
// shuffle: the handwriting corpora this is used with are already
// mixed, and a reproducible split keeps validation numbers
// comparable across runs. Re-splitting means building a new store.
//
// Reference: Rust Book §8 (Vectors and Slices)

use std::collections::BTreeSet;

use crate::domain::error::HtrError;
use crate::domain::sample::{CursorMode, Sample};

/// Default fraction of the corpus used for training
pub const DEFAULT_SPLIT: f64 = 0.8;

/// The full corpus plus the boundary between its two partitions.
#[derive(Debug)]
pub struct SampleStore {
    samples:  Vec<Sample>,
    split_at: usize,
}

impl SampleStore {
    /// Build a store from an ordered corpus.
    ///
    /// # Errors
    /// `InvalidCorpus` when the corpus is empty, the fraction is not
    /// in (0, 1], or ⌊f·N⌋ leaves the training partition empty.
    pub fn new(samples: Vec<Sample>, fraction: f64) -> Result<Self, HtrError> {
        if samples.is_empty() {
            return Err(HtrError::InvalidCorpus("corpus contains no samples".into()));
        }
        if !fraction.is_finite() || fraction <= 0.0 || fraction > 1.0 {
            return Err(HtrError::InvalidCorpus(format!(
                "split fraction {fraction} is outside (0, 1]"
            )));
        }

        // floor, not round: 0.8 of 9 samples is 7 training samples
        let split_at = ((samples.len() as f64) * fraction).floor() as usize;
        let split_at = split_at.min(samples.len());
        if split_at == 0 {
            return Err(HtrError::InvalidCorpus(format!(
                "split fraction {fraction} of {} samples leaves no training data",
                samples.len()
            )));
        }

        tracing::debug!(
            "Corpus split: {} training, {} validation",
            split_at,
            samples.len() - split_at,
        );

        Ok(Self { samples, split_at })
    }

    pub fn train(&self) -> &[Sample] {
        &self.samples[..self.split_at]
    }

    pub fn validation(&self) -> &[Sample] {
        &self.samples[self.split_at..]
    }

    /// Partition lookup by mode tag
    pub fn partition(&self, mode: CursorMode) -> &[Sample] {
        match mode {
            CursorMode::Train      => self.train(),
            CursorMode::Validation => self.validation(),
        }
    }

    /// Sorted distinct characters over every ground-truth text
    pub fn char_list(&self) -> Vec<char> {
        self.samples
            .iter()
            .flat_map(|s| s.text().chars())
            .collect::<BTreeSet<char>>()
            .into_iter()
            .collect()
    }
}
