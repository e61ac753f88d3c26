//! Typed golden datasets.

use serde::de::DeserializeOwned;
use serde::Deserialize;

use cal_core::models::{Embedding, PoolSnapshot, PredictiveDistribution, SampleIndex};

use crate::fixture_path;

/// Load and deserialize a JSON fixture file.
///
/// # Panics
/// Panics if the file doesn't exist or can't be deserialized.
pub fn load_fixture<T: DeserializeOwned>(relative_path: &str) -> T {
    let path = fixture_path(relative_path);
    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse fixture {}: {}", path.display(), e))
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoldenPoint {
    pub index: SampleIndex,
    pub mean: Vec<f32>,
    pub probs: Vec<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoldenScore {
    pub index: SampleIndex,
    pub neighbors: Vec<SampleIndex>,
    pub distances: Vec<f64>,
    pub neighborhood: Vec<f64>,
    pub neighborhood_kl: f64,
    pub mean_neighbor_kl: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExpectedBatches {
    pub neighborhood_kl: Vec<SampleIndex>,
    pub mean_neighbor_kl: Vec<SampleIndex>,
}

/// A CAL scoring case with hand-computed neighbors, neighborhoods and scores.
#[derive(Debug, Clone, Deserialize)]
pub struct GoldenCalCase {
    pub description: String,
    pub n_neighs: usize,
    pub batch_size: usize,
    pub labeled: Vec<GoldenPoint>,
    pub unlabeled: Vec<GoldenPoint>,
    pub expected: Vec<GoldenScore>,
    pub expected_batch: ExpectedBatches,
}

impl GoldenCalCase {
    pub fn load(relative_path: &str) -> Self {
        load_fixture(relative_path)
    }

    pub fn labeled_snapshot(&self) -> PoolSnapshot {
        snapshot(&self.labeled)
    }

    pub fn unlabeled_snapshot(&self) -> PoolSnapshot {
        snapshot(&self.unlabeled)
    }
}

fn snapshot(points: &[GoldenPoint]) -> PoolSnapshot {
    PoolSnapshot::new(points.iter().map(|p| p.index).collect())
        .with_embeddings(points.iter().map(|p| Embedding::new(p.mean.clone())).collect())
        .with_distributions(
            points
                .iter()
                .map(|p| {
                    PredictiveDistribution::new(p.probs.clone())
                        .unwrap_or_else(|e| panic!("bad golden distribution {}: {e}", p.index))
                })
                .collect(),
        )
}
