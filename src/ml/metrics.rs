// ============================================================
// Layer 5 — Recognition Metrics
// ============================================================
// Two numbers summarise a validation pass:
//
//   Character error rate (CER)
//     Σ edit_distance(recognized, ground_truth) / Σ len(ground_truth)
//     Lengths and distances are counted in Unicode scalar values,
//     so "naïve" is 5 characters, not 6 bytes.
//
//   Word accuracy
//     matching word positions / total word positions
//     Texts are split on whitespace. Positions 0..min(gt, rec) are
//     compared pairwise; the sample contributes max(gt, rec)
//     positions to the total, so a surplus or missing word always
//     counts as wrong:
//
//       gt "a b"    rec "a b c"  → 2 ok of 3
//       gt "a b c"  rec "a"      → 1 ok of 3
//
// Both are accumulated over the whole pass and divided once at
// the end. Averaging per-batch ratios would over-weight the short
// tail batch of the validation set.
//
// A zero denominator is an error (UndefinedMetric), never NaN.

use serde::{Deserialize, Serialize};

use crate::domain::error::HtrError;

/// Minimum number of single-character insertions, deletions and
/// substitutions turning `a` into `b`.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    // two rolling rows of the DP table
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitute = prev[j] + usize::from(ca != cb);
            let delete     = prev[j + 1] + 1;
            let insert     = curr[j] + 1;
            curr[j + 1] = substitute.min(delete).min(insert);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// Counts contributed by a single (ground truth, recognized) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SampleScore {
    pub char_errors: usize,
    pub char_total:  usize,
    pub words_ok:    usize,
    pub words_total: usize,
}

impl SampleScore {
    pub fn score(ground_truth: &str, recognized: &str) -> Self {
        let gt_words:  Vec<&str> = ground_truth.split_whitespace().collect();
        let rec_words: Vec<&str> = recognized.split_whitespace().collect();

        let words_ok = gt_words
            .iter()
            .zip(&rec_words)
            .filter(|(g, r)| g == r)
            .count();

        Self {
            char_errors: edit_distance(recognized, ground_truth),
            char_total:  ground_truth.chars().count(),
            words_ok,
            words_total: gt_words.len().max(rec_words.len()),
        }
    }

    pub fn is_exact(&self) -> bool {
        self.char_errors == 0
    }
}

/// Result of one evaluation pass
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvalReport {
    pub char_error_rate: f64,
    pub word_accuracy:   f64,
    pub samples:         usize,
}

/// Running numerators and denominators for one evaluation pass.
#[derive(Debug, Clone, Default)]
pub struct MetricsAccumulator {
    char_errors: usize,
    char_total:  usize,
    words_ok:    usize,
    words_total: usize,
    samples:     usize,
}

impl MetricsAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one pair and return its individual score
    pub fn record(&mut self, ground_truth: &str, recognized: &str) -> SampleScore {
        let s = SampleScore::score(ground_truth, recognized);
        self.char_errors += s.char_errors;
        self.char_total  += s.char_total;
        self.words_ok    += s.words_ok;
        self.words_total += s.words_total;
        self.samples     += 1;
        s
    }

    /// Add a batch of parallel texts.
    ///
    /// # Errors
    /// `MisalignedTexts` if the lists differ in length; nothing is
    /// recorded in that case.
    pub fn record_batch<G, R>(&mut self, ground_truth: &[G], recognized: &[R]) -> Result<Vec<SampleScore>, HtrError>
    where
        G: AsRef<str>,
        R: AsRef<str>,
    {
        check_aligned(ground_truth.len(), recognized.len())?;
        Ok(ground_truth
            .iter()
            .zip(recognized)
            .map(|(g, r)| self.record(g.as_ref(), r.as_ref()))
            .collect())
    }

    pub fn samples(&self) -> usize {
        self.samples
    }

    pub fn char_error_rate(&self) -> Result<f64, HtrError> {
        if self.char_total == 0 {
            return Err(HtrError::UndefinedMetric {
                metric: "character error rate",
                reason: "total ground-truth length is zero",
            });
        }
        Ok(self.char_errors as f64 / self.char_total as f64)
    }

    pub fn word_accuracy(&self) -> Result<f64, HtrError> {
        if self.words_total == 0 {
            return Err(HtrError::UndefinedMetric {
                metric: "word accuracy",
                reason: "total word count is zero",
            });
        }
        Ok(self.words_ok as f64 / self.words_total as f64)
    }

    /// Both metrics for the pass so far
    pub fn finish(&self) -> Result<EvalReport, HtrError> {
        Ok(EvalReport {
            char_error_rate: self.char_error_rate()?,
            word_accuracy:   self.word_accuracy()?,
            samples:         self.samples,
        })
    }
}

/// CER over two parallel lists
pub fn character_error_rate<G: AsRef<str>, R: AsRef<str>>(ground_truth: &[G], recognized: &[R]) -> Result<f64, HtrError> {
    let mut acc = MetricsAccumulator::new();
    acc.record_batch(ground_truth, recognized)?;
    acc.char_error_rate()
}

/// Word accuracy over two parallel lists
pub fn word_accuracy<G: AsRef<str>, R: AsRef<str>>(ground_truth: &[G], recognized: &[R]) -> Result<f64, HtrError> {
    let mut acc = MetricsAccumulator::new();
    acc.record_batch(ground_truth, recognized)?;
    acc.word_accuracy()
}

fn check_aligned(ground_truth: usize, recognized: usize) -> Result<(), HtrError> {
    if ground_truth != recognized {
        return Err(HtrError::MisalignedTexts { ground_truth, recognized });
    }
    Ok(())
}
