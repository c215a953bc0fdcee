// ============================================================
// Layer 6 — Training Summary
// ============================================================
// Keeps model/summary.json in step with the run:
//
//   {"charErrorRates": [0.31, 0.22, 0.19],
//    "wordAccuracies": [0.41, 0.55, 0.60]}
//
// The file is rewritten in full after every epoch (not appended),
// so it always holds the complete history of the current run from
// epoch 1 onwards, even if the process dies mid-run.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

/// Serialised form of the summary file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub char_error_rates: Vec<f64>,
    pub word_accuracies:  Vec<f64>,
}

pub struct SummaryWriter {
    path: PathBuf,
}

impl SummaryWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Overwrite the summary with the full history so far
    pub fn write(&self, char_error_rates: &[f64], word_accuracies: &[f64]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Cannot create '{}'", parent.display()))?;
        }

        let summary = Summary {
            char_error_rates: char_error_rates.to_vec(),
            word_accuracies:  word_accuracies.to_vec(),
        };
        fs::write(&self.path, serde_json::to_string(&summary)?)
            .with_context(|| format!("Cannot write summary to '{}'", self.path.display()))?;

        tracing::debug!("Summary updated: {} epochs", char_error_rates.len());
        Ok(())
    }

    pub fn load(&self) -> Result<Summary> {
        let json = fs::read_to_string(&self.path)
            .with_context(|| format!("Cannot read summary from '{}'", self.path.display()))?;
        Ok(serde_json::from_str(&json)?)
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}
