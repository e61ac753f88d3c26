use super::error_code::{self, CalErrorCode};

/// Partition invariants broken by a selection batch or a replayed history.
/// Indicates a sampler bug; never retried.
#[derive(Debug, thiserror::Error)]
pub enum InvariantViolation {
    #[error("sample {index} is not in the unlabeled pool")]
    NotUnlabeled { index: usize },

    #[error("sample {index} is already labeled")]
    AlreadyLabeled { index: usize },

    #[error("sample {index} appears more than once in the batch")]
    DuplicateInBatch { index: usize },

    #[error("sampler {sampler} returned {actual} samples, expected {expected}")]
    BatchSize {
        sampler: String,
        expected: usize,
        actual: usize,
    },

    #[error("partition sets are not disjoint or do not cover the dataset: {details}")]
    Disjointness { details: String },

    #[error("history does not match this run: {details}")]
    HistoryMismatch { details: String },
}

impl CalErrorCode for InvariantViolation {
    fn error_code(&self) -> &'static str {
        error_code::INVARIANT_VIOLATION
    }
}
