//! Contrastive Active Learning.
//!
//! Scores each unlabeled sample by how much the classifier's prediction on
//! it disagrees with the predictions on its nearest labeled neighbors in
//! embedding space, then acquires the highest-scoring samples.

use rayon::prelude::*;
use tracing::debug;

use cal_core::config::{NeighborMetricKind, ScoreMode};
use cal_core::constants::{DEFAULT_SMOOTHING_EPSILON, PARALLEL_SCORING_THRESHOLD};
use cal_core::errors::{CalResult, SamplingError};
use cal_core::models::{
    Embedding, PoolSnapshot, PredictiveDistribution, SampleIndex, SelectionBatch,
    SelectionRequest,
};
use cal_core::traits::{ISampler, SamplerInputs};

use crate::divergence::{mean_distribution, smoothed_kl_with};
use crate::neighbors::{Metric, Neighbor, NeighborIndex};
use crate::ranking::rank_descending;

/// Score of one unlabeled sample with the evidence behind it.
#[derive(Debug, Clone, PartialEq)]
pub struct CalScore {
    pub index: SampleIndex,
    /// Nearest labeled samples, nearest first.
    pub neighbors: Vec<Neighbor>,
    /// Mean predictive distribution of `neighbors`. Empty without neighbors.
    pub neighborhood: Vec<f64>,
    pub score: f64,
}

/// One pool's inputs to [`CalScorer::score_pool`], parallel slices.
#[derive(Debug, Clone, Copy)]
pub struct ScoringPool<'a> {
    pub indices: &'a [SampleIndex],
    pub embeddings: &'a [Embedding],
    pub distributions: &'a [PredictiveDistribution],
}

/// k-NN divergence scorer shared by `cal` and `cal_pca`.
#[derive(Debug, Clone)]
pub struct CalScorer<M: Metric + Clone = NeighborMetricKind> {
    n_neighs: usize,
    metric: M,
    mode: ScoreMode,
    epsilon: f64,
}

impl CalScorer<NeighborMetricKind> {
    pub fn new(n_neighs: usize, metric: NeighborMetricKind, mode: ScoreMode) -> Self {
        Self::with_metric(n_neighs, metric, mode)
    }
}

impl<M: Metric + Clone> CalScorer<M> {
    pub fn with_metric(n_neighs: usize, metric: M, mode: ScoreMode) -> Self {
        Self {
            n_neighs,
            metric,
            mode,
            epsilon: DEFAULT_SMOOTHING_EPSILON,
        }
    }

    /// Override the additive smoothing applied before each KL divergence.
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn n_neighs(&self) -> usize {
        self.n_neighs
    }

    pub fn metric(&self) -> &M {
        &self.metric
    }

    pub fn mode(&self) -> ScoreMode {
        self.mode
    }

    /// Score every unlabeled sample against the labeled pool.
    ///
    /// Results are in unlabeled input order. With an empty labeled pool
    /// every score is 0.
    pub fn score_pool(
        &self,
        labeled: ScoringPool<'_>,
        unlabeled: ScoringPool<'_>,
    ) -> Result<Vec<CalScore>, SamplingError> {
        check_parallel(&labeled, "labeled")?;
        check_parallel(&unlabeled, "unlabeled")?;
        let num_classes = check_class_counts(labeled.distributions, unlabeled.distributions)?;

        let index = NeighborIndex::build(labeled.indices, labeled.embeddings, self.metric.clone())?;
        debug!(
            labeled = labeled.indices.len(),
            unlabeled = unlabeled.indices.len(),
            k = self.n_neighs,
            classes = num_classes,
            metric = self.metric.name(),
            "scoring unlabeled pool"
        );

        let score_one = |position: usize| self.score_sample(&index, labeled, unlabeled, position);
        if unlabeled.indices.len() >= PARALLEL_SCORING_THRESHOLD {
            (0..unlabeled.indices.len())
                .into_par_iter()
                .map(score_one)
                .collect()
        } else {
            (0..unlabeled.indices.len()).map(score_one).collect()
        }
    }

    fn score_sample(
        &self,
        index: &NeighborIndex<'_, M>,
        labeled: ScoringPool<'_>,
        unlabeled: ScoringPool<'_>,
        position: usize,
    ) -> Result<CalScore, SamplingError> {
        let sample = unlabeled.indices[position];
        let neighbors = index.query(&unlabeled.embeddings[position], self.n_neighs)?;
        if neighbors.is_empty() {
            return Ok(CalScore {
                index: sample,
                neighbors,
                neighborhood: Vec::new(),
                score: 0.0,
            });
        }

        let p_u = unlabeled.distributions[position].as_slice();
        let neighbor_dists = || {
            neighbors
                .iter()
                .map(|n| labeled.distributions[n.position].as_slice())
        };
        let neighborhood = mean_distribution(neighbor_dists()).unwrap_or_default();

        let score = match self.mode {
            ScoreMode::NeighborhoodKl => smoothed_kl_with(p_u, &neighborhood, self.epsilon)?,
            ScoreMode::MeanNeighborKl => {
                let mut total = 0.0;
                for p_n in neighbor_dists() {
                    total += smoothed_kl_with(p_n, p_u, self.epsilon)?;
                }
                total / neighbors.len() as f64
            }
        };

        Ok(CalScore {
            index: sample,
            neighbors,
            neighborhood,
            score,
        })
    }
}

fn check_parallel(pool: &ScoringPool<'_>, name: &str) -> Result<(), SamplingError> {
    let n = pool.indices.len();
    for (what, actual) in [
        ("embeddings", pool.embeddings.len()),
        ("distributions", pool.distributions.len()),
    ] {
        if actual != n {
            return Err(SamplingError::LengthMismatch {
                what: format!("{name} {what}"),
                expected: n,
                actual,
            });
        }
    }
    Ok(())
}

/// Every distribution must cover the same classes. Returns the class count
/// (0 when both pools are empty).
fn check_class_counts(
    labeled: &[PredictiveDistribution],
    unlabeled: &[PredictiveDistribution],
) -> Result<usize, SamplingError> {
    let mut all = labeled.iter().chain(unlabeled.iter());
    let Some(first) = all.next() else {
        return Ok(0);
    };
    let expected = first.num_classes();
    for dist in all {
        if dist.num_classes() != expected {
            return Err(SamplingError::ClassCountMismatch {
                expected,
                actual: dist.num_classes(),
            });
        }
    }
    Ok(expected)
}

/// `cal` strategy: k-NN in the encoder's latent space.
#[derive(Debug, Clone)]
pub struct CalSampler {
    scorer: CalScorer,
}

impl CalSampler {
    pub fn new(scorer: CalScorer) -> Self {
        Self { scorer }
    }

    pub fn scorer(&self) -> &CalScorer {
        &self.scorer
    }
}

impl ISampler for CalSampler {
    fn name(&self) -> &str {
        "cal"
    }

    fn inputs(&self) -> SamplerInputs {
        SamplerInputs::ALL
    }

    fn select(&mut self, request: &SelectionRequest<'_>) -> CalResult<SelectionBatch> {
        let take = request.effective_batch_size();
        if take == 0 {
            return Ok(SelectionBatch::empty());
        }
        let labeled = scoring_pool(self.name(), "labeled", request.labeled)?;
        let unlabeled = scoring_pool(self.name(), "unlabeled", request.unlabeled)?;
        let scores = self.scorer.score_pool(labeled, unlabeled)?;
        Ok(select_top(scores, take, request.round))
    }
}

/// View a snapshot as a scoring pool, requiring embeddings and distributions.
pub(crate) fn scoring_pool<'a>(
    sampler: &str,
    pool: &str,
    snapshot: &'a PoolSnapshot,
) -> Result<ScoringPool<'a>, SamplingError> {
    Ok(ScoringPool {
        indices: &snapshot.indices,
        embeddings: snapshot.require_embeddings(sampler, pool)?,
        distributions: snapshot.require_distributions(sampler, pool)?,
    })
}

pub(crate) fn select_top(scores: Vec<CalScore>, take: usize, round: usize) -> SelectionBatch {
    let (max, sum) = scores
        .iter()
        .fold((0.0f64, 0.0f64), |(max, sum), s| (max.max(s.score), sum + s.score));
    if !scores.is_empty() {
        debug!(
            round,
            max_score = max,
            mean_score = sum / scores.len() as f64,
            "cal scores"
        );
    }
    rank_descending(scores.into_iter().map(|s| (s.index, s.score)).collect(), take)
}
