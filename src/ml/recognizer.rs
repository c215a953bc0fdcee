// ============================================================
// Layer 5 — Template Recognizer
// ============================================================
// A small nearest-neighbour recognizer that satisfies the
// Recognizer trait without any neural network. It exists so the
// CLI runs end to end and so the training loop can be exercised
// against a real model; swap in a trained network behind the same
// trait for actual handwriting work.
//
// Training  — every (preprocessed image, text) pair seen is kept as
//             a template (exact duplicates once). The loss of a
//             batch is the fraction of its images whose nearest
//             existing template carries a different text.
//
// Decoding  — distance is the mean absolute pixel difference over
//             the union of both canvases (missing pixels count as
//             white paper).
//               bestpath   → text of the single nearest template
//               beamsearch → most frequent text among the
//                            `beam_width` nearest; ties go to the
//                            text whose best template is closest
//
// Recognized texts are filtered to the character list, the same
// constraint a CTC decoder has.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::domain::sample::{Batch, GrayImage};
use crate::domain::traits::{Inference, Recognizer};
use crate::infra::checkpoint::CheckpointManager;

pub const DEFAULT_BEAM_WIDTH: usize = 5;

const WHITE: u8 = 255;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecoderType {
    BestPath,
    BeamSearch,
}

#[derive(Debug, Clone, PartialEq, Hash, Serialize, Deserialize)]
struct Template {
    image: GrayImage,
    text:  String,
}

/// Everything `save()` persists
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognizerSnapshot {
    decoder:    DecoderType,
    beam_width: usize,
    char_list:  Vec<char>,
    templates:  Vec<Template>,
}

pub struct TemplateRecognizer {
    char_list:   Vec<char>,
    decoder:     DecoderType,
    beam_width:  usize,
    templates:   Vec<Template>,
    seen:        HashSet<u64>,
    checkpoints: CheckpointManager,
}

impl TemplateRecognizer {
    /// A fresh, untrained recognizer
    pub fn new(char_list: Vec<char>, decoder: DecoderType, checkpoints: CheckpointManager) -> Self {
        Self {
            char_list,
            decoder,
            beam_width: DEFAULT_BEAM_WIDTH,
            templates: Vec::new(),
            seen: HashSet::new(),
            checkpoints,
        }
    }

    pub fn with_beam_width(mut self, beam_width: usize) -> Self {
        self.beam_width = beam_width.max(1);
        self
    }

    /// Load the last saved snapshot. Fails if there is none, or if it
    /// was trained with a different character list.
    pub fn restore(char_list: Vec<char>, decoder: DecoderType, checkpoints: CheckpointManager) -> Result<Self> {
        if !checkpoints.has_snapshot() {
            bail!(
                "no saved model in '{}'. Have you run 'train' first?",
                checkpoints.dir().display()
            );
        }
        let snapshot: RecognizerSnapshot = checkpoints.load_snapshot()?;
        if snapshot.char_list != char_list {
            bail!(
                "character list does not match the saved model ({} vs {} characters)",
                char_list.len(),
                snapshot.char_list.len()
            );
        }

        let seen = snapshot.templates.iter().map(fingerprint).collect();
        tracing::info!("Restored model with {} templates", snapshot.templates.len());
        Ok(Self {
            char_list,
            decoder,
            beam_width: snapshot.beam_width,
            templates: snapshot.templates,
            seen,
            checkpoints,
        })
    }

    pub fn template_count(&self) -> usize {
        self.templates.len()
    }

    pub fn decoder(&self) -> DecoderType {
        self.decoder
    }

    /// Up to `k` templates ordered by increasing distance
    fn nearest(&self, img: &GrayImage, k: usize) -> Vec<(f64, &Template)> {
        let mut scored: Vec<(f64, &Template)> = self
            .templates
            .iter()
            .map(|t| (distance(img, &t.image), t))
            .collect();
        scored.sort_by(|a, b| a.0.total_cmp(&b.0));
        scored.truncate(k);
        scored
    }

    fn decode(&self, img: &GrayImage) -> (String, f32) {
        let k = match self.decoder {
            DecoderType::BestPath   => 1,
            DecoderType::BeamSearch => self.beam_width,
        };
        let candidates = self.nearest(img, k);
        let Some(&(best_dist, _)) = candidates.first() else {
            return (String::new(), 0.0);
        };

        // candidates are sorted, so the first text to reach the top
        // count is also the closest one among the tied texts
        let mut votes: Vec<(&str, usize)> = Vec::new();
        for (_, t) in &candidates {
            match votes.iter_mut().find(|(text, _)| *text == t.text) {
                Some((_, n)) => *n += 1,
                None         => votes.push((t.text.as_str(), 1)),
            }
        }
        let top = votes.iter().map(|(_, n)| *n).max().unwrap_or(0);
        let text = votes
            .iter()
            .find(|(_, n)| *n == top)
            .map(|(t, _)| *t)
            .unwrap_or_default();

        let confidence = (1.0 - best_dist / f64::from(WHITE)) as f32;
        (self.filter(text), confidence)
    }

    fn filter(&self, text: &str) -> String {
        text.chars().filter(|c| self.char_list.contains(c)).collect()
    }

    fn snapshot(&self) -> RecognizerSnapshot {
        RecognizerSnapshot {
            decoder:    self.decoder,
            beam_width: self.beam_width,
            char_list:  self.char_list.clone(),
            templates:  self.templates.clone(),
        }
    }
}

impl Recognizer for TemplateRecognizer {
    fn train_batch(&mut self, batch: &Batch) -> Result<f32> {
        let Some(texts) = batch.gt_texts.as_ref() else {
            bail!("training batch carries no ground truth");
        };
        if texts.len() != batch.images.len() {
            bail!("batch has {} images but {} texts", batch.images.len(), texts.len());
        }
        if batch.images.is_empty() {
            return Ok(0.0);
        }

        // score against what was known before this batch
        let misses = batch
            .images
            .iter()
            .zip(texts)
            .filter(|(img, text)| {
                self.nearest(img, 1)
                    .first()
                    .map_or(true, |(_, t)| &t.text != *text)
            })
            .count();

        for (img, text) in batch.images.iter().zip(texts) {
            let template = Template { image: img.clone(), text: text.clone() };
            if self.seen.insert(fingerprint(&template)) {
                self.templates.push(template);
            }
        }

        Ok(misses as f32 / batch.images.len() as f32)
    }

    fn infer_batch(&mut self, batch: &Batch, raw_mode: bool) -> Result<Inference> {
        let (texts, confidences): (Vec<String>, Vec<f32>) =
            batch.images.iter().map(|img| self.decode(img)).unzip();
        Ok(Inference {
            texts,
            confidences: raw_mode.then_some(confidences),
        })
    }

    fn save(&mut self) -> Result<()> {
        self.checkpoints.save_snapshot(&self.snapshot())?;
        tracing::info!("Model saved ({} templates)", self.templates.len());
        Ok(())
    }
}

fn fingerprint(t: &Template) -> u64 {
    let mut h = DefaultHasher::new();
    t.hash(&mut h);
    h.finish()
}

/// Mean absolute pixel difference over the union of both canvases
fn distance(a: &GrayImage, b: &GrayImage) -> f64 {
    let w = a.width.max(b.width);
    let h = a.height.max(b.height);
    if w == 0 || h == 0 {
        return 0.0;
    }

    let px = |img: &GrayImage, x: usize, y: usize| {
        if x < img.width && y < img.height { img.get(x, y) } else { WHITE }
    };

    let mut total = 0u64;
    for y in 0..h {
        for x in 0..w {
            total += u64::from(px(a, x, y).abs_diff(px(b, x, y)));
        }
    }
    total as f64 / (w * h) as f64
}
