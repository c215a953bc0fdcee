use std::fs;
use std::path::Path;

use htr_trainer::application::infer_use_case::{InferConfig, InferUseCase};
use htr_trainer::application::train_use_case::{TrainConfig, TrainUseCase};
use htr_trainer::application::validate_use_case::{ValidateConfig, ValidateUseCase};
use htr_trainer::domain::error::HtrError;
use htr_trainer::infra::summary::SummaryWriter;
use htr_trainer::ml::controller::RunStatus;
use htr_trainer::ml::recognizer::DecoderType;
use serde_json::json;
use tempfile::tempdir;

fn image(value: u8) -> serde_json::Value {
    json!({"width": 8, "height": 4, "pixels": vec![value; 32]})
}

/// 3 training samples followed by 2 validation samples that repeat
/// the first two training images
fn write_corpus(dir: &Path) {
    fs::create_dir_all(dir).unwrap();
    let texts = ["ab", "cd", "ef", "ab", "cd"];
    let values = [0u8, 120, 240, 0, 120];
    fs::write(dir.join("sentences.json"), json!(texts).to_string()).unwrap();
    fs::write(
        dir.join("images.json"),
        serde_json::Value::Array(values.iter().map(|&v| image(v)).collect()).to_string(),
    )
    .unwrap();
}

fn train_config(root: &Path) -> TrainConfig {
    TrainConfig {
        data_dir: root.join("data").display().to_string(),
        model_dir: root.join("model").display().to_string(),
        batch_size: 1,
        early_stopping: 2,
        decoder: DecoderType::BestPath,
        line_mode: true,
        data_split: 0.6,
        augment: false,
        seed: Some(1),
    }
}

#[test]
fn train_then_validate_then_infer() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    write_corpus(&root.join("data"));

    // perfect on epoch 1, then two epochs without strict improvement
    let outcome = TrainUseCase::new(train_config(root)).execute().unwrap();
    assert_eq!(outcome.status, RunStatus::StoppedByConvergenceCriterion);
    assert_eq!(outcome.state.epoch, 3);
    assert_eq!(outcome.state.best_char_error_rate, 0.0);
    assert_eq!(outcome.state.word_accuracies, vec![1.0, 1.0, 1.0]);

    let model = root.join("model");
    assert_eq!(fs::read_to_string(model.join("charList.txt")).unwrap(), " abcdef");
    assert!(model.join("snapshot.json").is_file());
    assert!(model.join("train_config.json").is_file());

    let summary = SummaryWriter::new(model.join("summary.json")).load().unwrap();
    assert_eq!(summary.char_error_rates, vec![0.0, 0.0, 0.0]);

    let report = ValidateUseCase::new(ValidateConfig {
        data_dir: root.join("data").display().to_string(),
        model_dir: model.display().to_string(),
        batch_size: 4,
        decoder: None,
    })
    .execute()
    .unwrap();
    assert_eq!(report.char_error_rate, 0.0);
    assert_eq!(report.word_accuracy, 1.0);
    assert_eq!(report.samples, 2);

    let input = root.join("input");
    fs::create_dir_all(&input).unwrap();
    fs::write(
        input.join("images.json"),
        json!([{"name": "first.png", "image": image(0)}, {"name": "second.png", "image": image(240)}]).to_string(),
    )
    .unwrap();
    let output = root.join("result.txt");

    let results = InferUseCase::new(InferConfig {
        input_dir: input.display().to_string(),
        model_dir: model.display().to_string(),
        output: output.display().to_string(),
        decoder: None,
    })
    .execute()
    .unwrap();

    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r.confidence.is_some()));
    assert!(results.iter().all(|r| r.text.chars().all(|c| " abcdef".contains(c))));

    let transcript = fs::read_to_string(&output).unwrap();
    assert!(transcript.starts_with("first.png\n"));
    assert!(transcript.contains("\n\nsecond.png\n"));
}

#[test]
fn empty_corpus_is_rejected_before_training() {
    let temp = tempdir().unwrap();
    let data = temp.path().join("data");
    fs::create_dir_all(&data).unwrap();
    fs::write(data.join("sentences.json"), "[]").unwrap();
    fs::write(data.join("images.json"), "[]").unwrap();

    let err = TrainUseCase::new(train_config(temp.path())).execute().unwrap_err();
    assert!(matches!(err.downcast_ref::<HtrError>(), Some(HtrError::InvalidCorpus(_))));
    assert!(!temp.path().join("model/charList.txt").exists());
}

#[test]
fn validate_without_training_fails_clearly() {
    let temp = tempdir().unwrap();
    write_corpus(&temp.path().join("data"));

    let err = ValidateUseCase::new(ValidateConfig {
        data_dir: temp.path().join("data").display().to_string(),
        model_dir: temp.path().join("model").display().to_string(),
        batch_size: 2,
        decoder: None,
    })
    .execute()
    .unwrap_err();
    assert!(format!("{err:#}").contains("train"));
}
