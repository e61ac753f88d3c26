//! Property tests for DatasetPartition: disjointness, coverage, monotone
//! growth, replay.

use proptest::prelude::*;

use cal_core::models::{RunRecord, SelectionBatch, TrainingOutcome};
use cal_learning::DatasetPartition;

/// Ratios whose sum stays within 1.
fn ratios() -> impl Strategy<Value = (f64, f64)> {
    (0.0f64..=1.0).prop_flat_map(|init| (Just(init), 0.0f64..=(1.0 - init)))
}

proptest! {
    #[test]
    fn prop_initial_split_is_a_partition(
        n in 0usize..300,
        (init, val) in ratios(),
        seed in 0u64..1000,
    ) {
        let all: Vec<usize> = (0..n).collect();
        let p = DatasetPartition::initialize(&all, init, val, seed, 0).unwrap();
        p.check_invariants(&all).unwrap();
        prop_assert_eq!(p.size(), n);
        prop_assert_eq!(p.size_validation(), ((val * n as f64).round() as usize).min(n));
    }
}

proptest! {
    #[test]
    fn prop_moves_keep_invariants(
        n in 10usize..200,
        seed in 0u64..1000,
        picks in prop::collection::vec(prop::collection::vec(any::<prop::sample::Index>(), 0..8), 1..6),
    ) {
        let all: Vec<usize> = (0..n).collect();
        let mut p = DatasetPartition::initialize(&all, 0.1, 0.1, seed, 1).unwrap();
        let total = p.size_labeled() + p.size_unlabeled();
        let mut history = vec![record(seed, 0, &p, None)];

        for (round, pick) in picks.iter().enumerate() {
            let u = p.unlabeled();
            if u.is_empty() {
                break;
            }
            let mut batch: Vec<usize> = pick.iter().map(|i| u[i.index(u.len())]).collect();
            batch.sort_unstable();
            batch.dedup();
            let batch = SelectionBatch::new(batch);

            let before = (p.size_labeled(), p.size_unlabeled());
            p.move_to_labeled(&batch).unwrap();
            p.check_invariants(&all).unwrap();
            prop_assert_eq!(p.size_labeled(), before.0 + batch.len());
            prop_assert_eq!(p.size_unlabeled(), before.1 - batch.len());
            prop_assert_eq!(p.size_labeled() + p.size_unlabeled(), total);
            prop_assert!(batch.iter().all(|i| p.is_labeled(i)));

            history.push(record(seed, round + 1, &p, Some(batch)));
        }

        let mut replayed = DatasetPartition::initialize(&all, 0.1, 0.1, seed, 1).unwrap();
        replayed.replay(&history).unwrap();
        prop_assert_eq!(replayed, p);
    }
}

proptest! {
    #[test]
    fn prop_rejected_batch_changes_nothing(n in 10usize..100, seed in 0u64..1000) {
        let all: Vec<usize> = (0..n).collect();
        let mut p = DatasetPartition::initialize(&all, 0.2, 0.0, seed, 1).unwrap();
        let before = p.clone();
        let mut batch = p.unlabeled();
        batch.push(p.labeled()[0]);
        prop_assert!(p.move_to_labeled(&SelectionBatch::new(batch)).is_err());
        prop_assert_eq!(p, before);
    }
}

fn record(
    seed: u64,
    round: usize,
    p: &DatasetPartition,
    acquired: Option<SelectionBatch>,
) -> RunRecord {
    RunRecord {
        seed,
        round,
        labeled: p.size_labeled(),
        unlabeled: p.size_unlabeled(),
        validation: p.size_validation(),
        acquired,
        outcome: TrainingOutcome::default(),
        committed_at: chrono::Utc::now(),
    }
}
