// ============================================================
// Layer 6 — Character List Store
// ============================================================
// The recognizer decodes into a fixed alphabet. The alphabet used
// at training time must be exactly the one used for validation and
// inference, so it is written once before training starts and read
// back verbatim afterwards.
//
// File format: the characters concatenated, no separator and no
// trailing newline (a newline would become part of the alphabet).

use anyhow::{Context, Result};
use std::{fs, path::PathBuf};

/// Add a leading space for line-mode training when the corpus has
/// none; words in a text line must be separable by the decoder.
pub fn prepare_char_list(mut chars: Vec<char>, line_mode: bool) -> Vec<char> {
    if line_mode && !chars.contains(&' ') {
        chars.insert(0, ' ');
    }
    chars
}

pub struct CharListStore {
    path: PathBuf,
}

impl CharListStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn save(&self, chars: &[char]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let text: String = chars.iter().collect();
        fs::write(&self.path, text)
            .with_context(|| format!("Cannot write character list to '{}'", self.path.display()))?;
        tracing::info!("Saved {} characters to '{}'", chars.len(), self.path.display());
        Ok(())
    }

    pub fn load(&self) -> Result<Vec<char>> {
        let text = fs::read_to_string(&self.path).with_context(|| {
            format!(
                "Cannot read character list '{}'. Have you run 'train' first?",
                self.path.display()
            )
        })?;
        Ok(text.chars().collect())
    }
}
