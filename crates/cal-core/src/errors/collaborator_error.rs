/// Errors raised by external collaborators: the classifier oracle, the
/// embedding provider, and run reporters.
#[derive(Debug, thiserror::Error)]
pub enum CollaboratorError {
    #[error("training failed: {reason}")]
    TrainingFailed { reason: String },

    #[error("inference failed: {reason}")]
    InferenceFailed { reason: String },

    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("returned {actual} outputs for {expected} samples")]
    OutputCountMismatch { expected: usize, actual: usize },

    #[error("unknown sample index {index}")]
    UnknownSample { index: usize },

    #[error("collaborator unavailable: {name}")]
    Unavailable { name: String },

    #[error("report write failed: {reason}")]
    ReportFailed { reason: String },
}
