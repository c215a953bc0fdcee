// ============================================================
// Layer 3 — Error Taxonomy
// ============================================================
// Typed failures raised by the training core. Everything else
// (model calls, file I/O) travels as anyhow::Error with context
// attached by the caller; these variants can be recovered from
// an anyhow::Error with downcast_ref::<HtrError>().

use thiserror::Error;

use crate::domain::sample::CursorMode;

#[derive(Debug, Error, PartialEq)]
pub enum HtrError {
    /// The corpus cannot support training (construction-time, fatal).
    #[error("invalid corpus: {0}")]
    InvalidCorpus(String),

    /// next_batch() was called after has_next() returned false.
    #[error("cursor exhausted in {mode} mode: offset {offset} of {len} samples")]
    ExhaustedCursor {
        mode:   CursorMode,
        offset: usize,
        len:    usize,
    },

    /// A metric denominator was zero for a whole evaluation pass.
    #[error("{metric} is undefined: {reason}")]
    UndefinedMetric {
        metric: &'static str,
        reason: &'static str,
    },

    /// Ground-truth and recognized lists differ in length.
    #[error("misaligned texts: {ground_truth} ground truths vs {recognized} recognized")]
    MisalignedTexts {
        ground_truth: usize,
        recognized:   usize,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exhausted_cursor_message_names_mode() {
        let e = HtrError::ExhaustedCursor { mode: CursorMode::Validation, offset: 12, len: 10 };
        assert_eq!(
            e.to_string(),
            "cursor exhausted in validation mode: offset 12 of 10 samples"
        );
    }

    #[test]
    fn test_downcast_through_anyhow() {
        let err: anyhow::Error = HtrError::InvalidCorpus("empty".into()).into();
        assert_eq!(
            err.downcast_ref::<HtrError>(),
            Some(&HtrError::InvalidCorpus("empty".into()))
        );
    }
}
