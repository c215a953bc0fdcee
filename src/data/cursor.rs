// ============================================================
// Layer 4 — Batch Cursor
// ============================================================
// Walks one partition of a SampleStore in fixed-size batches.
//
// The boundary policy depends on the mode:
//
//   Train      — only full batches. With 10 samples and a batch
//                size of 4 the cursor yields [0..4) and [4..8);
//                the two leftover samples are dropped for this epoch.
//
//   Validation — every sample exactly once. Same example yields
//                [0..4), [4..8) and the short tail [8..10).
//
// The offset always advances by batch_size, so in validation mode
// it can overshoot the partition length after the short tail.
// has_next() is the only loop condition callers should use.
//
// Selecting a mode is a full reset: offset back to 0 and the
// augmentation flag cleared.

use crate::data::store::SampleStore;
use crate::domain::error::HtrError;
use crate::domain::sample::{Batch, CursorMode, Sample};

/// Iterator state over one partition of a store.
#[derive(Debug)]
pub struct BatchCursor<'a> {
    store:        &'a SampleStore,
    batch_size:   usize,
    mode:         CursorMode,
    offset:       usize,
    augmentation: bool,
}

impl<'a> BatchCursor<'a> {
    /// Create a cursor positioned at the start of the training set.
    ///
    /// # Errors
    /// `InvalidConfig` when `batch_size` is 0.
    pub fn new(store: &'a SampleStore, batch_size: usize) -> Result<Self, HtrError> {
        if batch_size == 0 {
            return Err(HtrError::InvalidConfig("batch size must be at least 1".into()));
        }
        Ok(Self {
            store,
            batch_size,
            mode: CursorMode::Train,
            offset: 0,
            augmentation: false,
        })
    }

    /// Switch partitions. Resets the offset and clears augmentation.
    pub fn select(&mut self, mode: CursorMode) {
        self.mode = mode;
        self.offset = 0;
        self.augmentation = false;
    }

    /// Enable augmentation for the current pass.
    /// Ignored outside training mode.
    pub fn set_augmentation(&mut self, enabled: bool) {
        self.augmentation = enabled && self.mode == CursorMode::Train;
    }

    pub fn augmentation(&self) -> bool {
        self.augmentation
    }

    pub fn mode(&self) -> CursorMode {
        self.mode
    }

    /// Monotonic position; may exceed the partition length in
    /// validation mode once the short tail batch has been read.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    fn partition(&self) -> &'a [Sample] {
        self.store.partition(self.mode)
    }

    pub fn has_next(&self) -> bool {
        let len = self.partition().len();
        match self.mode {
            CursorMode::Train      => self.offset + self.batch_size <= len,
            CursorMode::Validation => self.offset < len,
        }
    }

    /// Return the samples in `[offset, min(offset + batch_size, len))`
    /// and advance the offset by a full batch size.
    ///
    /// # Errors
    /// `ExhaustedCursor` when `has_next()` is false.
    pub fn next_batch(&mut self) -> Result<Batch, HtrError> {
        let partition = self.partition();
        if !self.has_next() {
            return Err(HtrError::ExhaustedCursor {
                mode:   self.mode,
                offset: self.offset,
                len:    partition.len(),
            });
        }

        let end = (self.offset + self.batch_size).min(partition.len());
        let window = &partition[self.offset..end];

        let images = window.iter().map(|s| s.image().clone()).collect();
        let texts  = window.iter().map(|s| s.text().to_string()).collect();

        self.offset += self.batch_size;
        Ok(Batch::labelled(images, texts))
    }

    /// `(current batch number, total batches)` for progress display.
    /// Training counts only full batches; validation counts the tail.
    pub fn progress(&self) -> (usize, usize) {
        let n = self.partition().len();
        let total = match self.mode {
            CursorMode::Train      => n / self.batch_size,
            CursorMode::Validation => n.div_ceil(self.batch_size),
        };
        (self.offset / self.batch_size + 1, total)
    }
}
