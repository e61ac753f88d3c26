//! # cal-core
//!
//! Foundation crate for the contrastive active learning workspace.
//! Defines the data model, collaborator traits, errors, config, and constants.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod models;
pub mod rng;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::ExperimentConfig;
pub use errors::{CalError, CalResult};
pub use models::{
    Embedding, PoolSnapshot, PredictiveDistribution, RunRecord, SampleIndex, SelectionBatch,
    SelectionRequest, TrainingOutcome,
};
