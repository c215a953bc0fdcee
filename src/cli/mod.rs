// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses arguments with clap and routes each subcommand to its
// use case. Printing the final result is the only work done here.

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, InferArgs, TrainArgs, ValidateArgs};

#[derive(Parser, Debug)]
#[command(
    name = "htr-trainer",
    version,
    about = "Train, validate and run a handwritten-text recognizer."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)    => run_train(args),
            Commands::Validate(args) => run_validate(args),
            Commands::Infer(args)    => run_infer(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    tracing::info!("Starting training on corpus in: {}", args.data_dir);
    let outcome = TrainUseCase::new(args.into()).execute()?;

    println!(
        "Training stopped after {} epochs ({:?}). Best character error rate: {:.2}%",
        outcome.state.epoch,
        outcome.status,
        outcome.state.best_char_error_rate * 100.0,
    );
    Ok(())
}

fn run_validate(args: ValidateArgs) -> Result<()> {
    use crate::application::validate_use_case::ValidateUseCase;

    let report = ValidateUseCase::new(args.into()).execute()?;
    println!(
        "Character error rate: {:.2}%. Word accuracy: {:.2}%. ({} samples)",
        report.char_error_rate * 100.0,
        report.word_accuracy * 100.0,
        report.samples,
    );
    Ok(())
}

fn run_infer(args: InferArgs) -> Result<()> {
    use crate::application::infer_use_case::InferUseCase;

    let results = InferUseCase::new(args.into()).execute()?;
    for r in &results {
        match r.confidence {
            Some(c) => println!("{}: \"{}\" (confidence {:.2})", r.name, r.text, c),
            None    => println!("{}: \"{}\"", r.name, r.text),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::train_use_case::TrainConfig;
    use crate::ml::recognizer::DecoderType;

    #[test]
    fn test_train_defaults() {
        let cli = Cli::try_parse_from(["htr-trainer", "train"]).unwrap();
        let Commands::Train(args) = cli.command else { panic!("expected train") };
        let cfg: TrainConfig = args.into();
        assert_eq!(cfg.batch_size, 200);
        assert_eq!(cfg.early_stopping, 25);
        assert_eq!(cfg.decoder, DecoderType::BeamSearch);
        assert!(cfg.line_mode);
        assert!(!cfg.augment);
    }

    #[test]
    fn test_train_flags() {
        let cli = Cli::try_parse_from([
            "htr-trainer", "train",
            "--batch-size", "16",
            "--early-stopping", "3",
            "--decoder", "bestpath",
            "--word-mode",
        ])
        .unwrap();
        let Commands::Train(args) = cli.command else { panic!("expected train") };
        let cfg: TrainConfig = args.into();
        assert_eq!(cfg.batch_size, 16);
        assert_eq!(cfg.early_stopping, 3);
        assert_eq!(cfg.decoder, DecoderType::BestPath);
        assert!(!cfg.line_mode);
    }

    #[test]
    fn test_unknown_decoder_is_rejected() {
        assert!(Cli::try_parse_from(["htr-trainer", "infer", "--decoder", "greedy"]).is_err());
    }
}
