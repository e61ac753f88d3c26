//! Error handling for the workspace.
//! One error enum per concern, `thiserror` only, aggregated by [`CalError`].

pub mod collaborator_error;
pub mod config_error;
pub mod error_code;
pub mod invariant_violation;
pub mod round_failure;
pub mod sampling_error;

pub use collaborator_error::CollaboratorError;
pub use config_error::ConfigError;
pub use error_code::CalErrorCode;
pub use invariant_violation::InvariantViolation;
pub use round_failure::{RoundFailure, RoundStage};
pub use sampling_error::SamplingError;

/// Top-level error for every fallible operation in the workspace.
#[derive(Debug, thiserror::Error)]
pub enum CalError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("invariant violation: {0}")]
    Invariant(#[from] InvariantViolation),

    #[error("round failure: {0}")]
    Round(#[from] RoundFailure),

    #[error("sampling error: {0}")]
    Sampling(#[from] SamplingError),
}

pub type CalResult<T> = Result<T, CalError>;

impl CalErrorCode for CalError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Config(e) => e.error_code(),
            Self::Invariant(e) => e.error_code(),
            Self::Round(e) => e.error_code(),
            Self::Sampling(e) => e.error_code(),
        }
    }
}
