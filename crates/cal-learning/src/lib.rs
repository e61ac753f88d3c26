//! # cal-learning
//!
//! The active-learning loop: a seeded partition of the dataset into
//! labeled, unlabeled and validation sets, the per-seed round orchestrator,
//! and the experiment runner that fans seeds out over rayon.

pub mod experiment;
pub mod orchestrator;
pub mod partition;

pub use experiment::{Experiment, SeedOutcome};
pub use orchestrator::{
    ActiveLearningOrchestrator, Cancellation, OrchestratorState, RunStatus, SeedComponents,
    SeedReport,
};
pub use partition::DatasetPartition;
