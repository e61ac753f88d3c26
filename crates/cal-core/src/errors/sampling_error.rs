use super::error_code::{self, CalErrorCode};

/// Malformed sampler inputs.
#[derive(Debug, thiserror::Error)]
pub enum SamplingError {
    #[error("{sampler} requires {input} for the {pool} pool")]
    MissingInput {
        sampler: String,
        input: String,
        pool: String,
    },

    #[error("{what}: expected {expected} entries, got {actual}")]
    LengthMismatch {
        what: String,
        expected: usize,
        actual: usize,
    },

    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("class count mismatch: expected {expected}, got {actual}")]
    ClassCountMismatch { expected: usize, actual: usize },

    #[error("invalid predictive distribution: {reason}")]
    InvalidDistribution { reason: String },

    #[error("metric {metric} requires a log-variance on every embedding")]
    MissingVariance { metric: String },

    #[error("projection failed: {reason}")]
    Projection { reason: String },

    #[error("discriminator training failed: {reason}")]
    Discriminator { reason: String },
}

impl CalErrorCode for SamplingError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Projection { .. } => error_code::PROJECTION_FAILED,
            _ => error_code::SAMPLING_ERROR,
        }
    }
}
