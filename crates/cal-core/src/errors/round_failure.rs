use serde::{Deserialize, Serialize};

use super::error_code::{self, CalErrorCode};
use super::CollaboratorError;

/// Which external call of a round failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundStage {
    Training,
    Embedding,
    Prediction,
}

impl std::fmt::Display for RoundStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Training => "training",
            Self::Embedding => "embedding",
            Self::Prediction => "prediction",
        };
        f.write_str(s)
    }
}

/// An external training/embedding call failed. Fatal for the affected seed
/// only.
#[derive(Debug, thiserror::Error)]
#[error("seed {seed}, round {round}: {stage} failed: {source}")]
pub struct RoundFailure {
    pub seed: u64,
    pub round: usize,
    pub stage: RoundStage,
    #[source]
    pub source: CollaboratorError,
}

impl CalErrorCode for RoundFailure {
    fn error_code(&self) -> &'static str {
        error_code::ROUND_FAILURE
    }
}
