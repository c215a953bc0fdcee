// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Owns the model directory and everything persisted in it:
//
//   model/
//     train_config.json   ← TrainConfig of the run that produced the model
//     snapshot.json       ← recognizer state, rewritten on each new best CER
//     charList.txt        ← alphabet (see char_list.rs)
//     summary.json        ← per-epoch CER / word accuracy (see summary.rs)
//
// The config is saved before training starts so validate/infer can
// rebuild the recognizer with the same decoder and image size.

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::{fs, path::{Path, PathBuf}};

use crate::application::train_use_case::TrainConfig;

const CONFIG_FILE:    &str = "train_config.json";
const SNAPSHOT_FILE:  &str = "snapshot.json";
const CHAR_LIST_FILE: &str = "charList.txt";
const SUMMARY_FILE:   &str = "summary.json";

#[derive(Debug, Clone)]
pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn char_list_path(&self) -> PathBuf {
        self.dir.join(CHAR_LIST_FILE)
    }

    pub fn summary_path(&self) -> PathBuf {
        self.dir.join(SUMMARY_FILE)
    }

    /// Write the training configuration as pretty JSON
    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        let path = self.dir.join(CONFIG_FILE);
        self.write_json(&path, cfg, true)?;
        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(())
    }

    pub fn load_config(&self) -> Result<TrainConfig> {
        self.read_json(&self.dir.join(CONFIG_FILE))
    }

    /// Persist model state; replaces the previous snapshot
    pub fn save_snapshot<T: Serialize>(&self, snapshot: &T) -> Result<()> {
        let path = self.dir.join(SNAPSHOT_FILE);
        // write-then-rename so a crash never leaves half a snapshot
        let tmp = self.dir.join(format!("{SNAPSHOT_FILE}.tmp"));
        self.write_json(&tmp, snapshot, false)?;
        fs::rename(&tmp, &path)
            .with_context(|| format!("Cannot move snapshot into '{}'", path.display()))?;
        tracing::debug!("Saved model snapshot to '{}'", path.display());
        Ok(())
    }

    pub fn load_snapshot<T: DeserializeOwned>(&self) -> Result<T> {
        self.read_json(&self.dir.join(SNAPSHOT_FILE))
    }

    pub fn has_snapshot(&self) -> bool {
        self.dir.join(SNAPSHOT_FILE).is_file()
    }

    fn write_json<T: Serialize>(&self, path: &Path, value: &T, pretty: bool) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create model directory '{}'", self.dir.display()))?;
        let json = if pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        fs::write(path, json).with_context(|| format!("Cannot write '{}'", path.display()))
    }

    fn read_json<T: DeserializeOwned>(&self, path: &Path) -> Result<T> {
        let json = fs::read_to_string(path).with_context(|| {
            format!(
                "Cannot read '{}'. Make sure you have run 'train' first.",
                path.display()
            )
        })?;
        serde_json::from_str(&json).with_context(|| format!("Cannot parse '{}'", path.display()))
    }
}
