// ============================================================
// Layer 2 — ValidateUseCase
// ============================================================
// Re-runs the validation pass of a finished training run:
// restores the saved recognizer, splits the corpus with the
// fraction the run was trained with, and reports CER and word
// accuracy over the validation partition.

use anyhow::{Context, Result};

use crate::data::{
    loader::JsonCorpusLoader,
    preprocessor::{img_size, Preprocessor},
    store::SampleStore,
};
use crate::domain::traits::CorpusSource;
use crate::infra::{char_list::CharListStore, checkpoint::CheckpointManager};
use crate::ml::controller::{ControllerConfig, TrainingController};
use crate::ml::metrics::EvalReport;
use crate::ml::recognizer::{DecoderType, TemplateRecognizer};

#[derive(Debug, Clone)]
pub struct ValidateConfig {
    pub data_dir:   String,
    pub model_dir:  String,
    pub batch_size: usize,
    /// Overrides the decoder saved with the model
    pub decoder:    Option<DecoderType>,
}

pub struct ValidateUseCase {
    config: ValidateConfig,
}

impl ValidateUseCase {
    pub fn new(config: ValidateConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<EvalReport> {
        let cfg   = &self.config;
        let ckpt  = CheckpointManager::new(&cfg.model_dir);
        let saved = ckpt
            .load_config()
            .context("No trained model found; run `train` first")?;

        let char_list = CharListStore::new(ckpt.char_list_path()).load()?;
        let decoder   = cfg.decoder.unwrap_or(saved.decoder);
        let model     = TemplateRecognizer::restore(char_list, decoder, ckpt.clone())?;

        let samples = JsonCorpusLoader::new(&cfg.data_dir).load_all()?;
        let store   = SampleStore::new(samples, saved.data_split)?;

        let controller_cfg = ControllerConfig {
            batch_size:     cfg.batch_size,
            early_stopping: saved.early_stopping,
            summary_path:   ckpt.summary_path(),
            augmentation:   false,
        };
        let preprocessor = Preprocessor::new(img_size(saved.line_mode));
        let mut controller = TrainingController::new(controller_cfg, model, preprocessor)?;

        controller.validate(&store)
    }
}
