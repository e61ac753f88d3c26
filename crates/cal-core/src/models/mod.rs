pub mod distribution;
pub mod embedding;
pub mod pool_snapshot;
pub mod run_record;
pub mod selection_batch;

pub use distribution::PredictiveDistribution;
pub use embedding::Embedding;
pub use pool_snapshot::{PoolSnapshot, SelectionRequest};
pub use run_record::{RunRecord, TrainingOutcome};
pub use selection_batch::SelectionBatch;

/// Stable identifier of a sample in the dataset.
pub type SampleIndex = usize;
