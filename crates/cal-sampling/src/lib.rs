//! # cal-sampling
//!
//! Acquisition strategies for the active learning loop.
//! CAL scoring: exact k-NN over labeled embeddings → neighborhood mean
//! distribution → smoothed KL divergence → deterministic ranking.

pub mod divergence;
pub mod neighbors;
pub mod projection;
pub mod ranking;
pub mod strategies;

pub use neighbors::{Metric, Neighbor, NeighborIndex};
pub use projection::Pca;
pub use strategies::{
    build_sampler, CalPcaSampler, CalSampler, CalScore, CalScorer, RandomSampler, ScoringPool,
    VaalSampler,
};
