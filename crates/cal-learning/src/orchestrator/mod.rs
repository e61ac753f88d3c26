//! Per-seed round loop: train, commit, sample, grow the labeled set.

pub mod cancellation;
pub mod state;

pub use cancellation::Cancellation;
pub use state::OrchestratorState;

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use cal_core::errors::{
    CalError, CalErrorCode, CalResult, CollaboratorError, InvariantViolation, RoundFailure,
    RoundStage,
};
use cal_core::models::{
    PoolSnapshot, RunRecord, SampleIndex, SelectionBatch, SelectionRequest, TrainingOutcome,
};
use cal_core::traits::{IClassifierOracle, IEmbeddingProvider, IRunReporter, ISampler};
use cal_core::ExperimentConfig;
use cal_observability::tracing_setup::events;
use cal_observability::{round_span, sampling_span, training_span};
use cal_sampling::build_sampler;

use crate::partition::DatasetPartition;

/// External collaborators owned by one seed.
pub struct SeedComponents {
    pub classifier: Box<dyn IClassifierOracle>,
    /// May be shared read-only across seeds.
    pub embeddings: Arc<dyn IEmbeddingProvider>,
}

/// How a seed's run ended.
#[derive(Debug)]
pub enum RunStatus {
    Completed,
    /// Stopped before training `at_round`.
    Cancelled { at_round: usize },
    Failed(CalError),
}

/// Result of one seed: its committed records and how the run ended.
#[derive(Debug)]
pub struct SeedReport {
    pub seed: u64,
    pub run_name: String,
    pub status: RunStatus,
    pub records: Vec<RunRecord>,
}

impl SeedReport {
    pub fn is_completed(&self) -> bool {
        matches!(self.status, RunStatus::Completed)
    }

    pub fn error(&self) -> Option<&CalError> {
        match &self.status {
            RunStatus::Failed(e) => Some(e),
            _ => None,
        }
    }

    /// Record of the last committed round.
    pub fn last(&self) -> Option<&RunRecord> {
        self.records.last()
    }
}

/// Drives one seed through `n_runs` rounds.
///
/// Round `r` retrains the classifier on L and commits a [`RunRecord`]; every
/// round but the last then asks the sampler for a batch and moves it from U
/// to L. That batch is the `acquired` field of round `r + 1`'s record.
pub struct ActiveLearningOrchestrator {
    seed: u64,
    run_name: String,
    n_runs: usize,
    batch_size: usize,
    all_indices: Vec<SampleIndex>,
    partition: DatasetPartition,
    classifier: Box<dyn IClassifierOracle>,
    embeddings: Arc<dyn IEmbeddingProvider>,
    sampler: Box<dyn ISampler>,
    reporters: Vec<Arc<dyn IRunReporter>>,
    cancellation: Cancellation,
    state: OrchestratorState,
    history: Vec<RunRecord>,
    pending: Option<SelectionBatch>,
}

impl ActiveLearningOrchestrator {
    /// Validate `config`, partition `all_indices` for `seed`, and build the
    /// configured sampler.
    pub fn new(
        config: &ExperimentConfig,
        all_indices: &[SampleIndex],
        seed: u64,
        components: SeedComponents,
    ) -> CalResult<Self> {
        config.validate()?;
        config.check_embedding_dim(
            components.embeddings.name(),
            components.embeddings.dimensions(),
        )?;
        let partition = DatasetPartition::from_config(config, all_indices, seed)?;
        let sampler = build_sampler(&config.sampler_spec()?, seed);

        Ok(Self {
            seed,
            run_name: run_name(&config.experiment_name, seed),
            n_runs: config.n_runs,
            batch_size: config.batch_size(all_indices.len()),
            all_indices: all_indices.to_vec(),
            partition,
            classifier: components.classifier,
            embeddings: components.embeddings,
            sampler,
            reporters: Vec::new(),
            cancellation: Cancellation::new(),
            state: OrchestratorState::Initialized,
            history: Vec::new(),
            pending: None,
        })
    }

    /// Replace the configured sampler.
    pub fn with_sampler(mut self, sampler: Box<dyn ISampler>) -> Self {
        self.sampler = sampler;
        self
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn IRunReporter>) -> Self {
        self.reporters.push(reporter);
        self
    }

    pub fn with_cancellation(mut self, cancellation: Cancellation) -> Self {
        self.cancellation = cancellation;
        self
    }

    pub fn with_run_name(mut self, run_name: impl Into<String>) -> Self {
        self.run_name = run_name.into();
        self
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn run_name(&self) -> &str {
        &self.run_name
    }

    pub fn state(&self) -> OrchestratorState {
        self.state
    }

    pub fn partition(&self) -> &DatasetPartition {
        &self.partition
    }

    /// Records committed so far.
    pub fn history(&self) -> &[RunRecord] {
        &self.history
    }

    /// Requested acquisition size, before clamping to |U|.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Adopt the committed records of an interrupted run of this seed.
    ///
    /// The batches are replayed onto the partition and checked against the
    /// recorded set sizes. Reporters do not see the replayed records again.
    pub fn resume(&mut self, history: Vec<RunRecord>) -> Result<(), InvariantViolation> {
        if self.state != OrchestratorState::Initialized || !self.history.is_empty() {
            return Err(InvariantViolation::HistoryMismatch {
                details: format!("cannot resume from state {}", self.state),
            });
        }
        if history.len() > self.n_runs {
            return Err(InvariantViolation::HistoryMismatch {
                details: format!("{} records for {} rounds", history.len(), self.n_runs),
            });
        }
        if let Some(other) = history.iter().find(|r| r.seed != self.seed) {
            return Err(InvariantViolation::HistoryMismatch {
                details: format!("record of seed {} in history of seed {}", other.seed, self.seed),
            });
        }
        let mut partition = self.partition.clone();
        partition.replay(&history)?;
        partition.check_invariants(&self.all_indices)?;

        info!(seed = self.seed, rounds = history.len(), "resuming from history");
        self.partition = partition;
        self.history = history;
        Ok(())
    }

    /// Run every remaining round. A collaborator failure ends the run: the
    /// error is in the report's status alongside the records committed
    /// before it. A finished orchestrator cannot run again.
    pub fn run(&mut self) -> SeedReport {
        let status = match self.run_rounds() {
            Ok(status) => status,
            Err(error) => {
                let round = match self.state {
                    OrchestratorState::Training { round } | OrchestratorState::Sampling { round } => {
                        round
                    }
                    _ => self.history.len(),
                };
                if !self.state.is_terminal() {
                    self.transition(OrchestratorState::Failed { round });
                }
                events::seed_failed(self.seed, error.error_code(), &error.to_string());
                RunStatus::Failed(error)
            }
        };
        SeedReport {
            seed: self.seed,
            run_name: self.run_name.clone(),
            status,
            records: self.history.clone(),
        }
    }

    fn run_rounds(&mut self) -> CalResult<RunStatus> {
        if self.state != OrchestratorState::Initialized {
            return Err(InvariantViolation::HistoryMismatch {
                details: format!("run already ended in state {}", self.state),
            }
            .into());
        }
        let start = self.history.len();
        if start < self.n_runs {
            if let Some(status) = self.stop_if_cancelled(start) {
                return Ok(status);
            }
        }
        if start > 0 && start < self.n_runs {
            // The classifier lost its state with the interrupted run. Retrain
            // it on the replayed labeled set, then redo the pending sampling.
            let last = start - 1;
            self.transition(OrchestratorState::Training { round: last });
            self.train(last)?;
            self.transition(OrchestratorState::Sampling { round: last });
            let batch = self.acquire(last)?;
            self.pending = Some(batch);
        }

        for round in start..self.n_runs {
            let _round = round_span!(self.seed, round).entered();

            self.transition(OrchestratorState::Training { round });
            let outcome = self.train(round)?;
            self.commit(round, outcome);

            if round + 1 < self.n_runs {
                // Stop before sampling so the partition matches the last record.
                if let Some(status) = self.stop_if_cancelled(round + 1) {
                    return Ok(status);
                }
                self.transition(OrchestratorState::Sampling { round });
                let batch = self.acquire(round)?;
                self.pending = Some(batch);
            }
        }

        self.transition(OrchestratorState::Terminated);
        events::seed_completed(self.seed, self.history.len());
        Ok(RunStatus::Completed)
    }

    fn stop_if_cancelled(&mut self, at_round: usize) -> Option<RunStatus> {
        if !self.cancellation.is_cancelled() {
            return None;
        }
        self.transition(OrchestratorState::Cancelled { at_round });
        events::seed_cancelled(self.seed, at_round);
        Some(RunStatus::Cancelled { at_round })
    }

    fn train(&mut self, round: usize) -> Result<TrainingOutcome, RoundFailure> {
        let labeled = self.partition.labeled();
        let _span = training_span!(round, labeled.len()).entered();
        self.classifier
            .retrain(&labeled, round)
            .map_err(|source| self.failure(round, RoundStage::Training, source))
    }

    fn commit(&mut self, round: usize, outcome: TrainingOutcome) {
        let record = RunRecord {
            seed: self.seed,
            round,
            labeled: self.partition.size_labeled(),
            unlabeled: self.partition.size_unlabeled(),
            validation: self.partition.size_validation(),
            acquired: self.pending.take(),
            outcome,
            committed_at: Utc::now(),
        };
        for reporter in &self.reporters {
            if let Err(e) = reporter.record(&record) {
                events::reporter_failed(self.seed, round, &e.to_string());
            }
        }
        events::round_committed(self.seed, round, record.labeled, record.unlabeled);
        self.history.push(record);
    }

    /// Ask the sampler for a batch and move it into L.
    fn acquire(&mut self, round: usize) -> CalResult<SelectionBatch> {
        let unlabeled_size = self.partition.size_unlabeled();
        if self.batch_size > unlabeled_size {
            events::batch_clamped(self.seed, round, self.batch_size, unlabeled_size);
        }
        let _span = sampling_span!(self.sampler.name(), self.batch_size.min(unlabeled_size)).entered();

        let labeled = self.snapshot(self.partition.labeled(), round)?;
        let unlabeled = self.snapshot(self.partition.unlabeled(), round)?;
        let request = SelectionRequest {
            round,
            batch_size: self.batch_size,
            labeled: &labeled,
            unlabeled: &unlabeled,
        };
        let batch = self.sampler.select(&request)?;

        let expected = request.effective_batch_size();
        if batch.len() != expected {
            return Err(InvariantViolation::BatchSize {
                sampler: self.sampler.name().to_string(),
                expected,
                actual: batch.len(),
            }
            .into());
        }
        self.partition.move_to_labeled(&batch)?;
        debug!(seed = self.seed, round, batch = ?batch.indices(), "batch moved to labeled");
        events::batch_acquired(self.seed, round, self.sampler.name(), batch.len());
        Ok(batch)
    }

    /// Fetch what the sampler asked for, fresh for this round.
    fn snapshot(&self, indices: Vec<SampleIndex>, round: usize) -> Result<PoolSnapshot, RoundFailure> {
        let inputs = self.sampler.inputs();
        let n = indices.len();
        let mut snapshot = PoolSnapshot::new(indices);
        if inputs.embeddings {
            let embeddings = self
                .embeddings
                .embed(&snapshot.indices)
                .and_then(|e| check_count(n, e))
                .map_err(|source| self.failure(round, RoundStage::Embedding, source))?;
            snapshot = snapshot.with_embeddings(embeddings);
        }
        if inputs.distributions {
            let distributions = self
                .classifier
                .predict(&snapshot.indices)
                .and_then(|d| check_count(n, d))
                .map_err(|source| self.failure(round, RoundStage::Prediction, source))?;
            snapshot = snapshot.with_distributions(distributions);
        }
        Ok(snapshot)
    }

    fn failure(&self, round: usize, stage: RoundStage, source: CollaboratorError) -> RoundFailure {
        RoundFailure {
            seed: self.seed,
            round,
            stage,
            source,
        }
    }

    fn transition(&mut self, next: OrchestratorState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "invalid transition {} → {next}",
            self.state
        );
        debug!(seed = self.seed, from = %self.state, to = %next, "state transition");
        self.state = next;
    }
}

fn check_count<T>(expected: usize, outputs: Vec<T>) -> Result<Vec<T>, CollaboratorError> {
    if outputs.len() != expected {
        return Err(CollaboratorError::OutputCountMismatch {
            expected,
            actual: outputs.len(),
        });
    }
    Ok(outputs)
}

/// `<yymmdd_HHMM>_<experiment>_<seed>_<8 hex chars>`.
pub fn run_name(experiment_name: &str, seed: u64) -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!(
        "{}_{}_{}_{}",
        Utc::now().format("%y%m%d_%H%M"),
        experiment_name,
        seed,
        &id[..8]
    )
}
