use crate::errors::CollaboratorError;
use crate::models::RunRecord;

/// Sink for the run-record stream. Called once per committed round.
pub trait IRunReporter: Send + Sync {
    fn record(&self, record: &RunRecord) -> Result<(), CollaboratorError>;
}
