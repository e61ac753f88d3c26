//! Round loop behavior of a single seed: sizes, failures, cancellation,
//! resume.

use std::sync::Arc;

use cal_core::config::SeedSpec;
use cal_core::errors::{CalError, CollaboratorError, ConfigError, InvariantViolation, RoundStage};
use cal_core::models::{RunRecord, SelectionBatch, SelectionRequest};
use cal_core::traits::{IRunReporter, ISampler, SamplerInputs};
use cal_core::{CalResult, ExperimentConfig};
use cal_learning::{
    ActiveLearningOrchestrator, Cancellation, DatasetPartition, OrchestratorState, RunStatus,
    SeedComponents,
};
use cal_observability::MemoryRunReporter;
use test_fixtures::{
    FailingEmbeddingProvider, FailingReporter, NearestCentroidOracle, SyntheticDataset,
    TableEmbeddingProvider,
};

/// 100 points, 4 classes, 3 dimensions.
fn blobs() -> Arc<SyntheticDataset> {
    Arc::new(SyntheticDataset::gaussian_blobs(25, 4, 3, 0.8, 11))
}

fn config(sampler: &str, n_runs: usize) -> ExperimentConfig {
    let mut config = ExperimentConfig {
        experiment_name: "blobs".to_string(),
        update_ratio: 0.05,
        n_runs,
        seed: SeedSpec::One(0),
        ..Default::default()
    };
    config.dataset.init_lbl_ratio = 0.1;
    config.dataset.val_ratio = 0.0;
    config.smp.name = sampler.to_string();
    config.smp.n_pca_comp = 2;
    config.smp.n_sub_epochs = 2;
    config
}

fn components(data: &Arc<SyntheticDataset>) -> SeedComponents {
    SeedComponents {
        classifier: Box::new(NearestCentroidOracle::new(Arc::clone(data))),
        embeddings: Arc::new(TableEmbeddingProvider::from_dataset(data)),
    }
}

fn orchestrator(
    config: &ExperimentConfig,
    data: &Arc<SyntheticDataset>,
    seed: u64,
) -> ActiveLearningOrchestrator {
    ActiveLearningOrchestrator::new(config, &data.indices(), seed, components(data)).unwrap()
}

/// Summary of a record that ignores its timestamp.
fn shape(r: &RunRecord) -> (usize, usize, usize, Option<SelectionBatch>) {
    (r.round, r.labeled, r.unlabeled, r.acquired.clone())
}

/// Cancels the shared handle once `round` is committed.
struct CancelAfter {
    round: usize,
    cancellation: Cancellation,
}

impl IRunReporter for CancelAfter {
    fn record(&self, record: &RunRecord) -> Result<(), CollaboratorError> {
        if record.round == self.round {
            self.cancellation.cancel();
        }
        Ok(())
    }
}

#[test]
fn every_sampler_grows_labeled_set_by_update_size() {
    let data = blobs();
    for name in ["random", "cal", "cal_pca", "vaal"] {
        let config = config(name, 5);
        let mut orch = orchestrator(&config, &data, 0);
        let report = orch.run();

        assert!(report.is_completed(), "{name}: {:?}", report.status);
        assert_eq!(orch.state(), OrchestratorState::Terminated);
        assert_eq!(report.records.len(), 5);
        for (round, record) in report.records.iter().enumerate() {
            assert_eq!(record.round, round);
            assert_eq!(record.labeled, 10 + 5 * round, "{name}");
            assert_eq!(record.pool_size(), 100);
            assert_eq!(record.acquired.as_ref().map(SelectionBatch::len), (round > 0).then_some(5));
        }
        let last = report.last().unwrap();
        assert_eq!((last.labeled, last.unlabeled), (30, 70));

        // The acquired batches rebuild a valid partition.
        let mut replayed = DatasetPartition::from_config(&config, &data.indices(), 0).unwrap();
        replayed.replay(&report.records).unwrap();
        replayed.check_invariants(&data.indices()).unwrap();
        assert_eq!(&replayed, orch.partition());
    }
}

#[test]
fn single_round_acquires_nothing() {
    let data = blobs();
    let config = config("cal", 1);
    let mut orch = orchestrator(&config, &data, 0);
    let initial = orch.partition().clone();
    let report = orch.run();

    assert!(report.is_completed());
    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].acquired, None);
    assert_eq!(orch.partition(), &initial);
}

#[test]
fn batch_is_clamped_to_remaining_pool() {
    let data = blobs();
    let mut config = config("random", 3);
    config.update_ratio = 0.5;
    let mut orch = orchestrator(&config, &data, 0);
    let report = orch.run();

    let sizes: Vec<_> = report.records.iter().map(|r| (r.labeled, r.unlabeled)).collect();
    assert_eq!(sizes, vec![(10, 90), (60, 40), (100, 0)]);
}

#[test]
fn embeddings_are_fetched_fresh_each_sampling_round() {
    let data = blobs();
    let provider = Arc::new(TableEmbeddingProvider::from_dataset(&data));
    let components = SeedComponents {
        classifier: Box::new(NearestCentroidOracle::new(Arc::clone(&data))),
        embeddings: Arc::clone(&provider) as _,
    };
    let mut orch =
        ActiveLearningOrchestrator::new(&config("cal", 5), &data.indices(), 0, components).unwrap();
    orch.run();
    // Labeled and unlabeled pools, four sampling rounds.
    assert_eq!(provider.calls(), 8);
}

#[test]
fn random_sampler_needs_no_embeddings() {
    let data = blobs();
    let components = SeedComponents {
        classifier: Box::new(NearestCentroidOracle::new(Arc::clone(&data))),
        embeddings: Arc::new(FailingEmbeddingProvider),
    };
    let mut orch =
        ActiveLearningOrchestrator::new(&config("random", 3), &data.indices(), 0, components)
            .unwrap();
    assert!(orch.run().is_completed());
}

#[test]
fn same_seed_repeats_the_run() {
    let data = blobs();
    let config = config("random", 4);
    let a = orchestrator(&config, &data, 3).run();
    let b = orchestrator(&config, &data, 3).run();
    let c = orchestrator(&config, &data, 4).run();
    let shapes = |r: &[RunRecord]| r.iter().map(shape).collect::<Vec<_>>();
    assert_eq!(shapes(&a.records), shapes(&b.records));
    assert_ne!(shapes(&a.records), shapes(&c.records));
    assert_ne!(a.run_name, b.run_name);
}

#[test]
fn training_failure_keeps_committed_rounds() {
    let data = blobs();
    let components = SeedComponents {
        classifier: Box::new(NearestCentroidOracle::new(Arc::clone(&data)).fail_at_round(2)),
        embeddings: Arc::new(TableEmbeddingProvider::from_dataset(&data)),
    };
    let mut orch =
        ActiveLearningOrchestrator::new(&config("cal", 5), &data.indices(), 7, components).unwrap();
    let report = orch.run();

    match &report.status {
        RunStatus::Failed(CalError::Round(failure)) => {
            assert_eq!(failure.seed, 7);
            assert_eq!(failure.round, 2);
            assert_eq!(failure.stage, RoundStage::Training);
        }
        other => panic!("unexpected status {other:?}"),
    }
    assert_eq!(report.records.len(), 2);
    assert_eq!(orch.state(), OrchestratorState::Failed { round: 2 });
}

#[test]
fn embedding_failure_is_a_round_failure() {
    let data = blobs();
    let components = SeedComponents {
        classifier: Box::new(NearestCentroidOracle::new(Arc::clone(&data))),
        embeddings: Arc::new(FailingEmbeddingProvider),
    };
    let mut orch =
        ActiveLearningOrchestrator::new(&config("cal", 3), &data.indices(), 0, components).unwrap();
    let report = orch.run();

    assert!(matches!(
        report.error(),
        Some(CalError::Round(f)) if f.stage == RoundStage::Embedding && f.round == 0
    ));
    assert_eq!(report.records.len(), 1);
    assert_eq!(orch.state(), OrchestratorState::Failed { round: 0 });
}

/// Returns an already-labeled sample.
struct Relabeler;

impl ISampler for Relabeler {
    fn name(&self) -> &str {
        "relabeler"
    }

    fn inputs(&self) -> SamplerInputs {
        SamplerInputs::NONE
    }

    fn select(&mut self, request: &SelectionRequest<'_>) -> CalResult<SelectionBatch> {
        let mut batch = request.unlabeled.indices[..request.effective_batch_size() - 1].to_vec();
        batch.push(request.labeled.indices[0]);
        Ok(SelectionBatch::new(batch))
    }
}

/// Returns one sample whatever the batch size.
struct Stingy;

impl ISampler for Stingy {
    fn name(&self) -> &str {
        "stingy"
    }

    fn inputs(&self) -> SamplerInputs {
        SamplerInputs::NONE
    }

    fn select(&mut self, request: &SelectionRequest<'_>) -> CalResult<SelectionBatch> {
        Ok(SelectionBatch::new(request.unlabeled.indices[..1].to_vec()))
    }
}

#[test]
fn sampler_breaking_the_partition_is_an_invariant_violation() {
    let data = blobs();
    let mut orch = orchestrator(&config("random", 3), &data, 0).with_sampler(Box::new(Relabeler));
    let report = orch.run();
    assert!(matches!(
        report.error(),
        Some(CalError::Invariant(InvariantViolation::AlreadyLabeled { .. }))
    ));
    // Nothing moved.
    assert_eq!(orch.partition().size_labeled(), 10);
    assert_eq!(orch.state(), OrchestratorState::Failed { round: 0 });
}

#[test]
fn short_batch_is_an_invariant_violation() {
    let data = blobs();
    let mut orch = orchestrator(&config("random", 3), &data, 0).with_sampler(Box::new(Stingy));
    let report = orch.run();
    assert!(matches!(
        report.error(),
        Some(CalError::Invariant(InvariantViolation::BatchSize {
            expected: 5,
            actual: 1,
            ..
        }))
    ));
}

#[test]
fn reporters_see_every_round_and_failures_do_not_stop_the_run() {
    let data = blobs();
    let memory = Arc::new(MemoryRunReporter::new());
    let failing = Arc::new(FailingReporter::default());
    let mut orch = orchestrator(&config("cal", 5), &data, 0)
        .with_reporter(Arc::clone(&memory) as _)
        .with_reporter(Arc::clone(&failing) as _);
    let report = orch.run();

    assert!(report.is_completed());
    assert_eq!(failing.attempts(), 5);
    assert_eq!(memory.records(), report.records);
}

#[test]
fn cancelled_before_start_commits_nothing() {
    let data = blobs();
    let cancellation = Cancellation::new();
    cancellation.cancel();
    let mut orch = orchestrator(&config("cal", 5), &data, 0).with_cancellation(cancellation);
    let report = orch.run();
    assert!(matches!(report.status, RunStatus::Cancelled { at_round: 0 }));
    assert!(report.records.is_empty());
    assert_eq!(orch.state(), OrchestratorState::Cancelled { at_round: 0 });
}

#[test]
fn cancelled_run_leaves_partition_at_last_record() {
    let data = blobs();
    let cancellation = Cancellation::new();
    let stopper = Arc::new(CancelAfter {
        round: 2,
        cancellation: cancellation.clone(),
    });
    let mut orch = orchestrator(&config("cal", 5), &data, 0)
        .with_cancellation(cancellation)
        .with_reporter(stopper);
    let report = orch.run();

    assert!(matches!(report.status, RunStatus::Cancelled { at_round: 3 }));
    let last = report.last().unwrap();
    assert_eq!(last.labeled, 20);
    assert_eq!(orch.partition().size_labeled(), last.labeled);
    assert_eq!(orch.partition().size_unlabeled(), last.unlabeled);

    let mut replayed = DatasetPartition::from_config(&config("cal", 5), &data.indices(), 0).unwrap();
    replayed.replay(&report.records).unwrap();
    assert_eq!(&replayed, orch.partition());
}

#[test]
fn cancel_then_resume_matches_an_uninterrupted_run() {
    let data = blobs();
    let config = config("cal", 5);
    let full = orchestrator(&config, &data, 2).run();

    let cancellation = Cancellation::new();
    let stopper = Arc::new(CancelAfter {
        round: 2,
        cancellation: cancellation.clone(),
    });
    let interrupted = orchestrator(&config, &data, 2)
        .with_cancellation(cancellation)
        .with_reporter(stopper)
        .run();
    assert!(matches!(interrupted.status, RunStatus::Cancelled { at_round: 3 }));
    assert_eq!(interrupted.records.len(), 3);

    let mut resumed = orchestrator(&config, &data, 2);
    resumed.resume(interrupted.records.clone()).unwrap();
    let report = resumed.run();
    assert!(report.is_completed());

    let shapes = |r: &[RunRecord]| r.iter().map(shape).collect::<Vec<_>>();
    assert_eq!(shapes(&report.records), shapes(&full.records));
    // Replayed records are kept verbatim.
    assert_eq!(report.records[..3], interrupted.records[..]);
}

#[test]
fn resume_rejects_foreign_or_tampered_history() {
    let data = blobs();
    let config = config("random", 4);
    let history = orchestrator(&config, &data, 1).run().records;

    let mut other_seed = orchestrator(&config, &data, 0);
    assert!(matches!(
        other_seed.resume(history.clone()),
        Err(InvariantViolation::HistoryMismatch { .. })
    ));

    let mut tampered = history.clone();
    tampered[1].labeled += 1;
    let mut orch = orchestrator(&config, &data, 1);
    assert!(orch.resume(tampered).is_err());
    assert!(orch.history().is_empty());

    let mut complete = orchestrator(&config, &data, 1);
    complete.resume(history).unwrap();
    let report = complete.run();
    assert!(report.is_completed());
    assert_eq!(report.records.len(), 4);
}

#[test]
fn finished_orchestrator_does_not_run_again() {
    let data = blobs();
    let mut orch = orchestrator(&config("random", 2), &data, 0);
    assert!(orch.run().is_completed());
    let again = orch.run();
    assert!(matches!(again.error(), Some(CalError::Invariant(_))));
    assert_eq!(orch.state(), OrchestratorState::Terminated);
    assert_eq!(again.records.len(), 2);
}

#[test]
fn latent_dimension_must_match_embeddings() {
    let data = blobs();
    let mut config = config("cal", 3);
    config.z_dim = Some(8);
    let err = ActiveLearningOrchestrator::new(&config, &data.indices(), 0, components(&data))
        .err()
        .unwrap();
    assert!(matches!(
        err,
        CalError::Config(ConfigError::LatentDimMismatch { expected: 8, actual: 3, .. })
    ));
}

#[test]
fn sampler_latent_dim_is_checked_at_construction() {
    let data = blobs();
    let mut config = config("vaal", 3);
    config.smp.latent_dim = Some(5);
    let err = ActiveLearningOrchestrator::new(&config, &data.indices(), 0, components(&data))
        .err()
        .unwrap();
    assert!(matches!(
        err,
        CalError::Config(ConfigError::LatentDimMismatch { expected: 5, actual: 3, .. })
    ));
}

#[test]
fn pca_components_beyond_embedding_width_are_rejected_up_front() {
    let data = blobs();
    let mut config = config("cal_pca", 3);
    config.smp.n_pca_comp = 4;
    let err = ActiveLearningOrchestrator::new(&config, &data.indices(), 0, components(&data))
        .err()
        .unwrap();
    assert!(matches!(
        err,
        CalError::Config(ConfigError::ValidationFailed { ref field, .. }) if field == "smp.n_pca_comp"
    ));
}
