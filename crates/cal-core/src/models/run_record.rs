use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::SelectionBatch;

/// Evaluation figures the classifier reports after retraining.
/// All optional: the orchestrator never inspects training internals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingOutcome {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_accuracy: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_loss: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_accuracy: Option<f64>,
}

/// State of one seed's partition after round `round` was trained.
///
/// `acquired` is the batch that moved round `round - 1`'s partition to this
/// one; round 0 has none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub seed: u64,
    pub round: usize,
    pub labeled: usize,
    pub unlabeled: usize,
    pub validation: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acquired: Option<SelectionBatch>,
    #[serde(default)]
    pub outcome: TrainingOutcome,
    pub committed_at: DateTime<Utc>,
}

impl RunRecord {
    /// `|L| + |U|`, constant across a seed's rounds.
    pub fn pool_size(&self) -> usize {
        self.labeled + self.unlabeled
    }
}
