//! Property tests for cal-sampling: score sign, batch validity,
//! determinism.

use std::collections::HashSet;

use proptest::prelude::*;

use cal_core::config::{NeighborMetricKind, ScoreMode};
use cal_core::models::{Embedding, PoolSnapshot, PredictiveDistribution, SelectionRequest};
use cal_core::traits::ISampler;
use cal_sampling::divergence::smoothed_kl;
use cal_sampling::{CalSampler, CalScorer, RandomSampler, ScoringPool};

fn normalize(raw: Vec<f64>) -> Vec<f64> {
    let sum: f64 = raw.iter().sum();
    raw.into_iter().map(|v| v / sum).collect()
}

fn distribution(classes: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(0.001f64..1.0, classes).prop_map(normalize)
}

/// A pool of `n` 2-D points with 3-class distributions.
fn pool(n: std::ops::Range<usize>) -> impl Strategy<Value = Vec<(Vec<f32>, Vec<f64>)>> {
    prop::collection::vec(
        (prop::collection::vec(-10.0f32..10.0, 2), distribution(3)),
        n,
    )
}

fn snapshot(offset: usize, points: &[(Vec<f32>, Vec<f64>)]) -> PoolSnapshot {
    PoolSnapshot::new((offset..offset + points.len()).collect())
        .with_embeddings(points.iter().map(|(m, _)| Embedding::new(m.clone())).collect())
        .with_distributions(
            points
                .iter()
                .map(|(_, p)| PredictiveDistribution::new(p.clone()).unwrap())
                .collect(),
        )
}

fn as_pool(s: &PoolSnapshot) -> ScoringPool<'_> {
    ScoringPool {
        indices: &s.indices,
        embeddings: s.embeddings.as_deref().unwrap(),
        distributions: s.distributions.as_deref().unwrap(),
    }
}

proptest! {
    #[test]
    fn prop_kl_non_negative(p in distribution(4), q in distribution(4)) {
        prop_assert!(smoothed_kl(&p, &q).unwrap() >= 0.0);
    }
}

proptest! {
    #[test]
    fn prop_kl_zero_on_identity(p in distribution(5)) {
        prop_assert!(smoothed_kl(&p, &p).unwrap().abs() < 1e-12);
    }
}

/// `p` and a distribution pulled towards class `j` by weight `t`, which
/// differs from `p` in every coordinate.
fn distinct_pair() -> impl Strategy<Value = (Vec<f64>, Vec<f64>)> {
    (distribution(4), 0usize..4, 0.1f64..0.9).prop_map(|(p, j, t)| {
        let q = p
            .iter()
            .enumerate()
            .map(|(i, &v)| (1.0 - t) * v + if i == j { t } else { 0.0 })
            .collect();
        (p, q)
    })
}

proptest! {
    #[test]
    fn prop_kl_positive_on_distinct((p, q) in distinct_pair()) {
        prop_assert!(smoothed_kl(&p, &q).unwrap() > 0.0);
        prop_assert!(smoothed_kl(&q, &p).unwrap() > 0.0);
    }
}

proptest! {
    #[test]
    fn prop_cal_score_positive_when_neighbor_disagrees((p, q) in distinct_pair()) {
        let l = snapshot(0, &[(vec![0.0, 0.0], q)]);
        let u = snapshot(1, &[(vec![1.0, 1.0], p)]);
        for mode in [ScoreMode::NeighborhoodKl, ScoreMode::MeanNeighborKl] {
            let scorer = CalScorer::new(1, NeighborMetricKind::L2, mode);
            let scores = scorer.score_pool(as_pool(&l), as_pool(&u)).unwrap();
            prop_assert!(scores[0].score > 0.0);
        }
    }
}

proptest! {
    #[test]
    fn prop_cal_scores_non_negative(
        labeled in pool(0..8),
        unlabeled in pool(1..20),
        k in 1usize..6,
    ) {
        let l = snapshot(0, &labeled);
        let u = snapshot(1000, &unlabeled);
        for mode in [ScoreMode::NeighborhoodKl, ScoreMode::MeanNeighborKl] {
            let scorer = CalScorer::new(k, NeighborMetricKind::L2, mode);
            let scores = scorer.score_pool(as_pool(&l), as_pool(&u)).unwrap();
            prop_assert_eq!(scores.len(), u.len());
            for s in &scores {
                prop_assert!(s.score >= 0.0);
                prop_assert_eq!(s.neighbors.len(), k.min(l.len()));
            }
        }
    }
}

proptest! {
    #[test]
    fn prop_cal_batch_is_valid(
        labeled in pool(1..8),
        unlabeled in pool(0..20),
        b in 0usize..25,
    ) {
        let l = snapshot(0, &labeled);
        let u = snapshot(1000, &unlabeled);
        let request = SelectionRequest { round: 1, batch_size: b, labeled: &l, unlabeled: &u };
        let mut sampler = CalSampler::new(CalScorer::new(3, NeighborMetricKind::Cosine, ScoreMode::NeighborhoodKl));
        let batch = sampler.select(&request).unwrap();
        let pool: HashSet<_> = u.indices.iter().copied().collect();
        let unique: HashSet<_> = batch.iter().collect();
        prop_assert_eq!(batch.len(), b.min(u.len()));
        prop_assert_eq!(unique.len(), batch.len());
        prop_assert!(unique.is_subset(&pool));
    }
}

proptest! {
    #[test]
    fn prop_cal_deterministic(labeled in pool(1..8), unlabeled in pool(1..20)) {
        let l = snapshot(0, &labeled);
        let u = snapshot(1000, &unlabeled);
        let request = SelectionRequest { round: 1, batch_size: 4, labeled: &l, unlabeled: &u };
        let scorer = CalScorer::new(2, NeighborMetricKind::L2, ScoreMode::NeighborhoodKl);
        let a = CalSampler::new(scorer.clone()).select(&request).unwrap();
        let b = CalSampler::new(scorer).select(&request).unwrap();
        prop_assert_eq!(a, b);
    }
}

proptest! {
    #[test]
    fn prop_random_batch_is_valid(seed in 0u64..1000, n in 0usize..60, b in 0usize..70) {
        let l = PoolSnapshot::default();
        let u = PoolSnapshot::new((0..n).collect());
        let request = SelectionRequest { round: 1, batch_size: b, labeled: &l, unlabeled: &u };
        let first = RandomSampler::new(seed).select(&request).unwrap();
        let again = RandomSampler::new(seed).select(&request).unwrap();
        let unique: HashSet<_> = first.iter().collect();
        prop_assert_eq!(first.len(), b.min(n));
        prop_assert_eq!(unique.len(), first.len());
        prop_assert!(first.iter().all(|i| i < n));
        prop_assert_eq!(first, again);
    }
}
