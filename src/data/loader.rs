// ============================================================
// Layer 4 — Corpus Loader
// ============================================================
// Reads a corpus directory laid out as two index-aligned files:
//
//   <data_dir>/
//     sentences.json   ["A MOVE to stop", "Mr. Gaitskell", ...]
//     images.json      [{"width":..,"height":..,"pixels":[..]}, ...]
//
// sentences[i] is the transcription of images[i]. Any length
// mismatch or malformed image makes the whole corpus invalid:
// silently dropping a sample would shift every later label.
//
// Inference input is a single file of named images:
//
//   <input_dir>/images.json  [{"name":"a01.png","image":{..}}, ...]

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::{Path, PathBuf}};

use crate::domain::error::HtrError;
use crate::domain::sample::{GrayImage, Sample};
use crate::domain::traits::CorpusSource;

pub const SENTENCES_FILE: &str = "sentences.json";
pub const IMAGES_FILE:    &str = "images.json";

/// Loads a corpus directory of JSON files.
/// Implements the CorpusSource trait from Layer 3.
pub struct JsonCorpusLoader {
    dir: PathBuf,
}

impl JsonCorpusLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl CorpusSource for JsonCorpusLoader {
    fn load_all(&self) -> Result<Vec<Sample>> {
        if !self.dir.is_dir() {
            return Err(HtrError::InvalidCorpus(format!(
                "data directory '{}' does not exist",
                self.dir.display()
            ))
            .into());
        }

        let sentences: Vec<String>    = read_json(&self.dir.join(SENTENCES_FILE))?;
        let images:    Vec<GrayImage> = read_json(&self.dir.join(IMAGES_FILE))?;

        if sentences.len() != images.len() {
            return Err(HtrError::InvalidCorpus(format!(
                "{} sentences but {} images in '{}'",
                sentences.len(),
                images.len(),
                self.dir.display()
            ))
            .into());
        }

        if let Some(i) = images.iter().position(|img| !img.is_consistent()) {
            return Err(HtrError::InvalidCorpus(format!(
                "image {i} has {} pixels, expected {}x{}",
                images[i].pixels.len(),
                images[i].width,
                images[i].height
            ))
            .into());
        }

        let samples: Vec<Sample> = images
            .into_iter()
            .zip(sentences)
            .map(|(img, text)| Sample::new(img, text))
            .collect();

        tracing::info!("Loaded {} samples from '{}'", samples.len(), self.dir.display());
        Ok(samples)
    }
}

/// One image submitted for inference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedImage {
    pub name:  String,
    pub image: GrayImage,
}

/// Read `<dir>/images.json` as a list of named images.
/// Malformed entries are skipped with a warning; one bad scan
/// should not stop the rest of the folder from being read.
pub fn load_named_images(dir: &Path) -> Result<Vec<NamedImage>> {
    let all: Vec<NamedImage> = read_json(&dir.join(IMAGES_FILE))?;
    let total = all.len();

    let ok: Vec<NamedImage> = all
        .into_iter()
        .filter(|n| {
            let good = n.image.is_consistent() && n.image.width > 0 && n.image.height > 0;
            if !good {
                tracing::warn!("Skipping '{}': inconsistent image dimensions", n.name);
            }
            good
        })
        .collect();

    tracing::info!("Loaded {}/{} images for inference", ok.len(), total);
    Ok(ok)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Cannot read '{}'", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Cannot parse '{}'", path.display()))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write(dir: &Path, name: &str, value: serde_json::Value) {
        fs::write(dir.join(name), value.to_string()).unwrap();
    }

    #[test]
    fn test_loads_aligned_corpus_in_order() {
        let temp = tempdir().unwrap();
        write(temp.path(), SENTENCES_FILE, serde_json::json!(["ab", "cd"]));
        write(
            temp.path(),
            IMAGES_FILE,
            serde_json::json!([
                {"width": 1, "height": 1, "pixels": [0]},
                {"width": 2, "height": 1, "pixels": [0, 255]}
            ]),
        );

        let samples = JsonCorpusLoader::new(temp.path()).load_all().unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].text(), "ab");
        assert_eq!(samples[1].image().width, 2);
    }

    #[test]
    fn test_length_mismatch_is_invalid_corpus() {
        let temp = tempdir().unwrap();
        write(temp.path(), SENTENCES_FILE, serde_json::json!(["ab"]));
        write(temp.path(), IMAGES_FILE, serde_json::json!([]));

        let err = JsonCorpusLoader::new(temp.path()).load_all().unwrap_err();
        assert!(matches!(err.downcast_ref::<HtrError>(), Some(HtrError::InvalidCorpus(_))));
    }

    #[test]
    fn test_inconsistent_image_is_invalid_corpus() {
        let temp = tempdir().unwrap();
        write(temp.path(), SENTENCES_FILE, serde_json::json!(["ab"]));
        write(temp.path(), IMAGES_FILE, serde_json::json!([{"width": 2, "height": 2, "pixels": [0]}]));

        let err = JsonCorpusLoader::new(temp.path()).load_all().unwrap_err();
        assert!(matches!(err.downcast_ref::<HtrError>(), Some(HtrError::InvalidCorpus(_))));
    }

    #[test]
    fn test_overflowing_dimensions_are_invalid_corpus() {
        let temp = tempdir().unwrap();
        write(temp.path(), SENTENCES_FILE, serde_json::json!(["ab"]));
        write(
            temp.path(),
            IMAGES_FILE,
            serde_json::json!([{"width": 8_589_934_592u64, "height": 8_589_934_592u64, "pixels": [0]}]),
        );

        let err = JsonCorpusLoader::new(temp.path()).load_all().unwrap_err();
        assert!(matches!(err.downcast_ref::<HtrError>(), Some(HtrError::InvalidCorpus(_))));
    }

    #[test]
    fn test_missing_directory_fails() {
        let temp = tempdir().unwrap();
        let loader = JsonCorpusLoader::new(temp.path().join("nope"));
        assert!(loader.load_all().is_err());
    }

    #[test]
    fn test_named_images_skip_malformed_entries() {
        let temp = tempdir().unwrap();
        write(
            temp.path(),
            IMAGES_FILE,
            serde_json::json!([
                {"name": "good.png", "image": {"width": 1, "height": 1, "pixels": [9]}},
                {"name": "bad.png",  "image": {"width": 3, "height": 1, "pixels": [9]}},
                {"name": "huge.png", "image": {"width": 8_589_934_592u64, "height": 8_589_934_592u64, "pixels": [9]}}
            ]),
        );
        let images = load_named_images(temp.path()).unwrap();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].name, "good.png");
    }
}
