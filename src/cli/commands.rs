// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Three subcommands, one per mode: `train`, `validate`, `infer`.
// Each argument struct converts into the matching application
// config, so clap types stop at this layer.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand, ValueEnum};

use crate::application::{
    infer_use_case::InferConfig,
    train_use_case::TrainConfig,
    validate_use_case::ValidateConfig,
};
use crate::data::store::DEFAULT_SPLIT;
use crate::ml::recognizer::DecoderType;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train a recognizer on a corpus directory
    Train(TrainArgs),

    /// Measure CER and word accuracy of a trained recognizer
    Validate(ValidateArgs),

    /// Transcribe a folder of images with a trained recognizer
    Infer(InferArgs),
}

/// CTC-style decoder selection
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecoderArg {
    Bestpath,
    Beamsearch,
}

impl From<DecoderArg> for DecoderType {
    fn from(d: DecoderArg) -> Self {
        match d {
            DecoderArg::Bestpath   => DecoderType::BestPath,
            DecoderArg::Beamsearch => DecoderType::BeamSearch,
        }
    }
}

#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Directory containing sentences.json and images.json
    #[arg(long, default_value = "data")]
    pub data_dir: String,

    /// Directory for the char list, summary, config and model snapshot
    #[arg(long, default_value = "model")]
    pub model_dir: String,

    #[arg(long, default_value_t = 200)]
    pub batch_size: usize,

    /// Stop after this many epochs without CER improvement
    #[arg(long, default_value_t = 25)]
    pub early_stopping: usize,

    #[arg(long, value_enum, default_value_t = DecoderArg::Beamsearch)]
    pub decoder: DecoderArg,

    /// Train on single words (128x32) instead of text lines (256x32)
    #[arg(long)]
    pub word_mode: bool,

    /// Fraction of the corpus used for training, the rest validates
    #[arg(long, default_value_t = DEFAULT_SPLIT)]
    pub data_split: f64,

    /// Apply random warps to training images
    #[arg(long)]
    pub augment: bool,

    /// Seed for augmentation
    #[arg(long)]
    pub seed: Option<u64>,
}

impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            data_dir:       a.data_dir,
            model_dir:      a.model_dir,
            batch_size:     a.batch_size,
            early_stopping: a.early_stopping,
            decoder:        a.decoder.into(),
            line_mode:      !a.word_mode,
            data_split:     a.data_split,
            augment:        a.augment,
            seed:           a.seed,
        }
    }
}

#[derive(Args, Debug)]
pub struct ValidateArgs {
    #[arg(long, default_value = "data")]
    pub data_dir: String,

    #[arg(long, default_value = "model")]
    pub model_dir: String,

    #[arg(long, default_value_t = 200)]
    pub batch_size: usize,

    /// Defaults to the decoder the model was trained with
    #[arg(long, value_enum)]
    pub decoder: Option<DecoderArg>,
}

impl From<ValidateArgs> for ValidateConfig {
    fn from(a: ValidateArgs) -> Self {
        ValidateConfig {
            data_dir:   a.data_dir,
            model_dir:  a.model_dir,
            batch_size: a.batch_size,
            decoder:    a.decoder.map(Into::into),
        }
    }
}

#[derive(Args, Debug)]
pub struct InferArgs {
    /// Directory containing images.json with named images
    #[arg(long, default_value = "input")]
    pub input_dir: String,

    #[arg(long, default_value = "model")]
    pub model_dir: String,

    /// Transcripts are appended here
    #[arg(long, default_value = "result.txt")]
    pub output: String,

    #[arg(long, value_enum)]
    pub decoder: Option<DecoderArg>,
}

impl From<InferArgs> for InferConfig {
    fn from(a: InferArgs) -> Self {
        InferConfig {
            input_dir: a.input_dir,
            model_dir: a.model_dir,
            output:    a.output,
            decoder:   a.decoder.map(Into::into),
        }
    }
}
