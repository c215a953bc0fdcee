// ============================================================
// Layer 2 — InferUseCase
// ============================================================
// Recognizes the text in a folder of images with a trained model.
//
//   1. Restore the recognizer (character list + snapshot)
//   2. Preprocess each image with a dynamic-width canvas
//   3. Infer one image at a time, with confidences
//   4. Append "<name>\n<text>\n\n" to the result file
//
// The result file is appended to, never truncated, so several
// input folders can be collected into one transcript.

use anyhow::{bail, Context, Result};
use std::{
    fs::OpenOptions,
    io::Write,
    path::{Path, PathBuf},
};

use crate::data::{
    loader::load_named_images,
    preprocessor::{img_size, Preprocessor},
};
use crate::domain::sample::Batch;
use crate::domain::traits::{BatchProcessor, Inference, Recognizer};
use crate::infra::{char_list::CharListStore, checkpoint::CheckpointManager};
use crate::ml::recognizer::{DecoderType, TemplateRecognizer};

/// Horizontal padding added around each inference image
const INFER_PADDING: usize = 16;

#[derive(Debug, Clone)]
pub struct InferConfig {
    pub input_dir: String,
    pub model_dir: String,
    pub output:    String,
    pub decoder:   Option<DecoderType>,
}

/// One transcribed image
#[derive(Debug, Clone, PartialEq)]
pub struct Recognition {
    pub name:       String,
    pub text:       String,
    pub confidence: Option<f32>,
}

pub struct InferUseCase {
    config: InferConfig,
}

impl InferUseCase {
    pub fn new(config: InferConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<Vec<Recognition>> {
        let cfg  = &self.config;
        let ckpt = CheckpointManager::new(&cfg.model_dir);

        let char_list = CharListStore::new(ckpt.char_list_path()).load()?;
        let decoder   = match cfg.decoder {
            Some(d) => d,
            None    => ckpt.load_config()?.decoder,
        };
        let mut model = TemplateRecognizer::restore(char_list, decoder, ckpt)?;

        let mut preprocessor = Preprocessor::new(img_size(false)).with_dynamic_width(INFER_PADDING);

        tracing::info!("Image processing start");
        let images = load_named_images(Path::new(&cfg.input_dir))?;
        let mut results = Vec::with_capacity(images.len());

        for named in images {
            let img   = preprocessor.process_img(&named.image)?;
            let batch = Batch::unlabelled(vec![img]);
            let out   = model
                .infer_batch(&batch, true)
                .with_context(|| format!("Inference failed for '{}'", named.name))?;

            let (text, confidence) = single_result(out)
                .with_context(|| format!("Inference failed for '{}'", named.name))?;
            tracing::debug!("{} -> {:?} ({:?})", named.name, text, confidence);

            results.push(Recognition { name: named.name, text, confidence });
        }

        append_results(&PathBuf::from(&cfg.output), &results)?;
        Ok(results)
    }
}

/// Unpack the inference of a one-image batch
fn single_result(out: Inference) -> Result<(String, Option<f32>)> {
    if out.texts.len() != 1 {
        bail!("recognizer returned {} texts for 1 image", out.texts.len());
    }
    let confidence = out.confidences.and_then(|c| c.first().copied());
    let text = out.texts.into_iter().next().unwrap_or_default();
    Ok((text, confidence))
}

fn append_results(path: &Path, results: &[Recognition]) -> Result<()> {
    let mut f = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Cannot open result file '{}'", path.display()))?;

    for r in results {
        write!(f, "{}\n{}\n\n", r.name, r.text)?;
    }
    tracing::info!("Appended {} results to '{}'", results.len(), path.display());
    Ok(())
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_results_are_appended() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("result.txt");
        let r = |n: &str, t: &str| Recognition { name: n.into(), text: t.into(), confidence: None };

        append_results(&path, &[r("a.png", "hello")]).unwrap();
        append_results(&path, &[r("b.png", "world")]).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "a.png\nhello\n\nb.png\nworld\n\n");
    }

    #[test]
    fn test_single_result_unpacks_text_and_confidence() {
        let out = Inference { texts: vec!["ab".into()], confidences: Some(vec![0.75]) };
        assert_eq!(single_result(out).unwrap(), ("ab".to_string(), Some(0.75)));
    }

    #[test]
    fn test_missing_text_is_an_error() {
        let out = Inference { texts: Vec::new(), confidences: None };
        let err = single_result(out).unwrap_err();
        assert!(err.to_string().contains("0 texts"));

        let out = Inference { texts: vec!["a".into(), "b".into()], confidences: None };
        assert!(single_result(out).is_err());
    }
}
