use crate::errors::CollaboratorError;
use crate::models::{PredictiveDistribution, SampleIndex, TrainingOutcome};

/// Black-box classifier retrained between rounds.
pub trait IClassifierOracle: Send {
    /// Retrain on the current labeled set. `round` is 0-based.
    fn retrain(
        &mut self,
        labeled: &[SampleIndex],
        round: usize,
    ) -> Result<TrainingOutcome, CollaboratorError>;

    /// Predictive distributions for the given samples, in order.
    fn predict(
        &self,
        indices: &[SampleIndex],
    ) -> Result<Vec<PredictiveDistribution>, CollaboratorError>;

    fn num_classes(&self) -> usize;
}
