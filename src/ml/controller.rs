// ============================================================
// Layer 5 — Training Controller
// ============================================================
// Drives the epoch loop:
//
//   loop {
//     1. train pass      — every full batch of the training set
//     2. validation pass — every validation sample, CER + word accuracy
//     3. summary         — append both numbers, rewrite summary.json
//     4. checkpoint      — strictly lower CER than ever before → save()
//     5. early stopping  — `early_stopping` epochs without a new best → stop
//   }
//
// Only CER decides checkpoints; word accuracy is reported alongside.
// There is no epoch limit: a run ends when improvement stalls or
// when the caller stops it through a StopHandle. The stop request is
// checked before each epoch, never in the middle of one.
//
// A failing batch is not skipped or retried. The error is returned
// immediately with the epoch and batch coordinates attached.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::data::cursor::BatchCursor;
use crate::data::store::SampleStore;
use crate::domain::error::HtrError;
use crate::domain::sample::CursorMode;
use crate::domain::traits::{BatchProcessor, Recognizer};
use crate::infra::summary::SummaryWriter;
use crate::ml::metrics::{EvalReport, MetricsAccumulator};

/// Everything the controller needs besides its collaborators
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    pub batch_size:     usize,
    /// Epochs without CER improvement before the run stops
    pub early_stopping: usize,
    pub summary_path:   PathBuf,
    /// Augment training batches (never validation batches)
    pub augmentation:   bool,
}

/// Lifecycle of a controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Constructed, or the last run ended with an error
    Idle,
    Running,
    StoppedByConvergenceCriterion,
    StoppedByCaller,
}

impl RunStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, RunStatus::StoppedByConvergenceCriterion | RunStatus::StoppedByCaller)
    }
}

/// Cooperative cancellation flag, cheap to clone and hand to
/// another thread (e.g. a signal handler).
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Outcome of the checkpoint decision for one epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckpointDecision {
    Improved,
    NotImproved,
}

/// Per-run bookkeeping
#[derive(Debug, Clone, PartialEq)]
pub struct RunState {
    pub epoch:                    usize,
    pub best_char_error_rate:     f64,
    pub epochs_since_improvement: usize,
    pub char_error_rates:         Vec<f64>,
    pub word_accuracies:          Vec<f64>,
}

impl Default for RunState {
    fn default() -> Self {
        Self {
            epoch:                    0,
            best_char_error_rate:     f64::INFINITY,
            epochs_since_improvement: 0,
            char_error_rates:         Vec::new(),
            word_accuracies:          Vec::new(),
        }
    }
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the epoch's metrics and apply the checkpoint rule.
    pub fn record_epoch(&mut self, report: &EvalReport) -> CheckpointDecision {
        self.char_error_rates.push(report.char_error_rate);
        self.word_accuracies.push(report.word_accuracy);

        if report.char_error_rate < self.best_char_error_rate {
            self.best_char_error_rate = report.char_error_rate;
            self.epochs_since_improvement = 0;
            CheckpointDecision::Improved
        } else {
            self.epochs_since_improvement += 1;
            CheckpointDecision::NotImproved
        }
    }

    pub fn should_stop(&self, early_stopping: usize) -> bool {
        self.epochs_since_improvement >= early_stopping
    }
}

/// What `train` hands back once the run reaches a terminal state
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingOutcome {
    pub status: RunStatus,
    pub state:  RunState,
}

pub struct TrainingController<R, P> {
    config:    ControllerConfig,
    model:     R,
    processor: P,
    summary:   SummaryWriter,
    status:    RunStatus,
    stop:      StopHandle,
}

impl<R: Recognizer, P: BatchProcessor> TrainingController<R, P> {
    /// # Errors
    /// `InvalidConfig` for a zero batch size or zero patience.
    pub fn new(config: ControllerConfig, model: R, processor: P) -> Result<Self, HtrError> {
        if config.batch_size == 0 {
            return Err(HtrError::InvalidConfig("batch size must be at least 1".into()));
        }
        if config.early_stopping == 0 {
            return Err(HtrError::InvalidConfig("early stopping patience must be at least 1".into()));
        }
        let summary = SummaryWriter::new(config.summary_path.clone());
        Ok(Self {
            config,
            model,
            processor,
            summary,
            status: RunStatus::Idle,
            stop: StopHandle::default(),
        })
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Request a stop at the next epoch boundary
    pub fn stop(&self) {
        self.stop.stop();
    }

    pub fn model(&self) -> &R {
        &self.model
    }

    /// Run epochs until early stopping or a caller stop.
    /// Every call starts a fresh run: new counters, new summary.
    pub fn train(&mut self, store: &SampleStore) -> Result<TrainingOutcome> {
        let mut cursor = BatchCursor::new(store, self.config.batch_size)?;
        let mut state  = RunState::new();

        if store.train().len() < self.config.batch_size {
            tracing::warn!(
                "Training set has {} samples, fewer than one batch of {}: no training steps will run",
                store.train().len(),
                self.config.batch_size,
            );
        }

        self.status = RunStatus::Running;
        match self.run_epochs(&mut cursor, &mut state) {
            Ok(status) => {
                self.status = status;
                Ok(TrainingOutcome { status, state })
            }
            Err(e) => {
                self.status = RunStatus::Idle;
                Err(e)
            }
        }
    }

    /// One validation pass outside of training
    pub fn validate(&mut self, store: &SampleStore) -> Result<EvalReport> {
        let mut cursor = BatchCursor::new(store, self.config.batch_size)?;
        self.evaluate(&mut cursor, None)
    }

    fn run_epochs(&mut self, cursor: &mut BatchCursor<'_>, state: &mut RunState) -> Result<RunStatus> {
        loop {
            if self.stop.is_stopped() {
                tracing::info!("Stop requested after {} epochs", state.epoch);
                return Ok(RunStatus::StoppedByCaller);
            }

            state.epoch += 1;
            let epoch = state.epoch;
            tracing::info!("Epoch: {}", epoch);

            let mean_loss = self.train_epoch(cursor, epoch)?;
            let report    = self.evaluate(cursor, Some(epoch))?;

            let decision = state.record_epoch(&report);
            self.summary
                .write(&state.char_error_rates, &state.word_accuracies)
                .with_context(|| format!("epoch {epoch}: writing summary"))?;

            println!(
                "Epoch {:>3} | train_loss={} | CER={:.2}% | word_acc={:.2}%",
                epoch,
                mean_loss.map_or_else(|| "n/a".to_string(), |l| format!("{l:.4}")),
                report.char_error_rate * 100.0,
                report.word_accuracy * 100.0,
            );

            match decision {
                CheckpointDecision::Improved => {
                    tracing::info!("Character error rate improved, save model");
                    self.model
                        .save()
                        .with_context(|| format!("epoch {epoch}: saving model"))?;
                }
                CheckpointDecision::NotImproved => {
                    tracing::info!(
                        "Character error rate not improved, best so far: {:.2}%",
                        state.best_char_error_rate * 100.0
                    );
                }
            }

            if state.should_stop(self.config.early_stopping) {
                tracing::info!(
                    "No more improvement since {} epochs. Training stopped.",
                    self.config.early_stopping
                );
                return Ok(RunStatus::StoppedByConvergenceCriterion);
            }
        }
    }

    /// Train on every full batch; returns the mean loss, if any batch ran
    fn train_epoch(&mut self, cursor: &mut BatchCursor<'_>, epoch: usize) -> Result<Option<f64>> {
        cursor.select(CursorMode::Train);
        cursor.set_augmentation(self.config.augmentation);
        self.processor.set_augmentation(cursor.augmentation());

        let mut loss_sum = 0.0f64;
        let mut batches  = 0usize;

        while cursor.has_next() {
            let (current, total) = cursor.progress();
            let at = || format!("epoch {epoch}, batch {current}/{total}");

            let batch = cursor.next_batch()?;
            let batch = self
                .processor
                .process_batch(batch)
                .with_context(|| format!("{}: preprocessing failed", at()))?;
            let loss = self
                .model
                .train_batch(&batch)
                .with_context(|| format!("{}: training step failed", at()))?;

            tracing::debug!("Epoch: {} Batch: {}/{} Loss: {}", epoch, current, total, loss);
            loss_sum += f64::from(loss);
            batches  += 1;
        }

        Ok((batches > 0).then(|| loss_sum / batches as f64))
    }

    fn evaluate(&mut self, cursor: &mut BatchCursor<'_>, epoch: Option<usize>) -> Result<EvalReport> {
        tracing::info!("Validate NN");
        cursor.select(CursorMode::Validation);
        self.processor.set_augmentation(cursor.augmentation());

        let mut metrics = MetricsAccumulator::new();

        while cursor.has_next() {
            let (current, total) = cursor.progress();
            let at = || match epoch {
                Some(e) => format!("epoch {e}, validation batch {current}/{total}"),
                None    => format!("validation batch {current}/{total}"),
            };
            tracing::debug!("Batch: {} / {}", current, total);

            let batch = cursor.next_batch()?;
            let batch = self
                .processor
                .process_batch(batch)
                .with_context(|| format!("{}: preprocessing failed", at()))?;
            let inference = self
                .model
                .infer_batch(&batch, false)
                .with_context(|| format!("{}: inference failed", at()))?;
            let scores = metrics
                .record_batch(batch.texts(), &inference.texts)
                .with_context(at)?;

            for ((gt, rec), score) in batch.texts().iter().zip(&inference.texts).zip(&scores) {
                if score.is_exact() {
                    tracing::debug!("[OK] {:?} -> {:?}", gt, rec);
                } else {
                    tracing::debug!("[ERR:{}] {:?} -> {:?}", score.char_errors, gt, rec);
                }
            }
        }

        let report = metrics
            .finish()
            .context("validation pass produced no measurable ground truth")?;

        tracing::info!(
            "Character error rate: {:.2}%. Word accuracy: {:.2}%.",
            report.char_error_rate * 100.0,
            report.word_accuracy * 100.0,
        );
        Ok(report)
    }
}
