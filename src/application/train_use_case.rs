// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates a training run in order:
//
//   Step 1: Load the corpus              (Layer 4 - data)
//   Step 2: Split train/validation       (Layer 4 - data)
//   Step 3: Write the character list     (Layer 6 - infra)
//   Step 4: Save the run config          (Layer 6 - infra)
//   Step 5: Build model + preprocessor   (Layers 4/5)
//   Step 6: Run the epoch loop           (Layer 5 - ml)
//
// Reference: Rust Book §13 (Iterators and Closures)

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::data::{
    loader::JsonCorpusLoader,
    preprocessor::{img_size, Preprocessor},
    store::{SampleStore, DEFAULT_SPLIT},
};
use crate::domain::traits::CorpusSource;
use crate::infra::{
    char_list::{prepare_char_list, CharListStore},
    checkpoint::CheckpointManager,
};
use crate::ml::controller::{ControllerConfig, TrainingController, TrainingOutcome};
use crate::ml::recognizer::{DecoderType, TemplateRecognizer};

// ─── Training Configuration ──────────────────────────────────────────────────
// Everything a run needs. Saved next to the model so validate and
// infer can rebuild the same decoder and canvas size.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub data_dir:       String,
    pub model_dir:      String,
    pub batch_size:     usize,
    /// Epochs without CER improvement before stopping
    pub early_stopping: usize,
    pub decoder:        DecoderType,
    /// Text lines (256x32 canvas) instead of single words (128x32)
    pub line_mode:      bool,
    /// Fraction of the corpus used for training
    pub data_split:     f64,
    /// Warp training images
    pub augment:        bool,
    /// Seed for augmentation; None draws from the OS
    pub seed:           Option<u64>,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            data_dir:       "data".to_string(),
            model_dir:      "model".to_string(),
            batch_size:     200,
            early_stopping: 25,
            decoder:        DecoderType::BeamSearch,
            line_mode:      true,
            data_split:     DEFAULT_SPLIT,
            augment:        false,
            seed:           None,
        }
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<TrainingOutcome> {
        let cfg = &self.config;

        // ── Steps 1-2: corpus and split ───────────────────────────────────────
        tracing::info!("Loading corpus from '{}'", cfg.data_dir);
        let samples = JsonCorpusLoader::new(&cfg.data_dir).load_all()?;
        let store   = SampleStore::new(samples, cfg.data_split)?;
        tracing::info!(
            "Split: {} train, {} validation",
            store.train().len(),
            store.validation().len()
        );

        // ── Step 3: character list ────────────────────────────────────────────
        // Written before any training step so an interrupted run still
        // leaves a usable alphabet next to its best snapshot.
        let ckpt      = CheckpointManager::new(&cfg.model_dir);
        let char_list = prepare_char_list(store.char_list(), cfg.line_mode);
        CharListStore::new(ckpt.char_list_path()).save(&char_list)?;

        // ── Step 4: config ────────────────────────────────────────────────────
        ckpt.save_config(cfg)?;

        // ── Step 5: collaborators ─────────────────────────────────────────────
        let model = TemplateRecognizer::new(char_list, cfg.decoder, ckpt.clone());
        let mut preprocessor = Preprocessor::new(img_size(cfg.line_mode));
        if let Some(seed) = cfg.seed {
            preprocessor = preprocessor.with_seed(seed);
        }

        // ── Step 6: epoch loop ────────────────────────────────────────────────
        let controller_cfg = ControllerConfig {
            batch_size:     cfg.batch_size,
            early_stopping: cfg.early_stopping,
            summary_path:   ckpt.summary_path(),
            augmentation:   cfg.augment,
        };
        let mut controller = TrainingController::new(controller_cfg, model, preprocessor)?;
        let outcome = controller.train(&store)?;

        tracing::info!(
            "Training finished after {} epochs ({:?}), best CER {:.2}%",
            outcome.state.epoch,
            outcome.status,
            outcome.state.best_char_error_rate * 100.0
        );
        Ok(outcome)
    }
}
