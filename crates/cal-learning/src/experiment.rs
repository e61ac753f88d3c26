//! Multi-seed experiment runner.

use std::collections::BTreeMap;
use std::sync::Arc;

use rayon::prelude::*;
use tracing::info;

use cal_core::errors::{CalError, CalResult, ConfigError};
use cal_core::models::{RunRecord, SampleIndex};
use cal_core::traits::IRunReporter;
use cal_core::ExperimentConfig;
use cal_observability::experiment_span;
use cal_observability::summary::{ExperimentSummary, SeedResult};

use crate::orchestrator::{ActiveLearningOrchestrator, Cancellation, SeedComponents, SeedReport};
use crate::partition::DatasetPartition;

/// Outcome of one seed. `result` is an error when the seed could not be set
/// up; failures during the run are in the report's status.
#[derive(Debug)]
pub struct SeedOutcome {
    pub seed: u64,
    pub result: Result<SeedReport, CalError>,
}

impl SeedOutcome {
    /// Setup or run error, if any.
    pub fn error(&self) -> Option<&CalError> {
        match &self.result {
            Ok(report) => report.error(),
            Err(e) => Some(e),
        }
    }

    /// Committed records (empty when setup failed).
    pub fn records(&self) -> &[RunRecord] {
        match &self.result {
            Ok(report) => &report.records,
            Err(_) => &[],
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(&self.result, Ok(report) if report.is_completed())
    }

    pub fn as_summary_entry(&self) -> SeedResult<'_> {
        match self.error() {
            Some(error) => SeedResult::Failed {
                seed: self.seed,
                error,
            },
            None => SeedResult::Records {
                seed: self.seed,
                records: self.records(),
            },
        }
    }
}

/// Runs one orchestration per configured seed.
///
/// Seeds share nothing mutable: each gets its own partition, sampler,
/// classifier and RNG streams. Reporters and the cancellation handle are
/// shared.
pub struct Experiment {
    config: ExperimentConfig,
    all_indices: Vec<SampleIndex>,
    reporters: Vec<Arc<dyn IRunReporter>>,
    cancellation: Cancellation,
}

impl Experiment {
    /// Validate `config` against the dataset before any round runs.
    pub fn new(config: ExperimentConfig, all_indices: Vec<SampleIndex>) -> Result<Self, ConfigError> {
        config.validate()?;
        // Set sizes do not depend on the seed, so one trial split catches
        // duplicate indices and an unlabeled pool that would start empty.
        let seeds = config.seeds();
        DatasetPartition::from_config(&config, &all_indices, seeds[0])?;
        Ok(Self {
            config,
            all_indices,
            reporters: Vec::new(),
            cancellation: Cancellation::new(),
        })
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn IRunReporter>) -> Self {
        self.reporters.push(reporter);
        self
    }

    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    /// Handle that stops every seed at its next round boundary.
    pub fn cancellation(&self) -> Cancellation {
        self.cancellation.clone()
    }

    /// Run every seed from round 0.
    pub fn run<F>(&self, factory: F) -> Vec<SeedOutcome>
    where
        F: Fn(u64) -> CalResult<SeedComponents> + Sync,
    {
        self.run_resuming(Vec::new(), factory)
    }

    /// Run every seed, continuing each from its records in `history` (which
    /// may mix seeds, e.g. a JSON-lines log read back). Seeds without records
    /// start from round 0.
    pub fn run_resuming<F>(&self, history: Vec<RunRecord>, factory: F) -> Vec<SeedOutcome>
    where
        F: Fn(u64) -> CalResult<SeedComponents> + Sync,
    {
        let seeds = self.config.seeds();
        let _span = experiment_span!(self.config.experiment_name, seeds.len()).entered();

        let mut by_seed: BTreeMap<u64, Vec<RunRecord>> = BTreeMap::new();
        for record in history {
            by_seed.entry(record.seed).or_default().push(record);
        }
        let jobs: Vec<(u64, Vec<RunRecord>)> = seeds
            .into_iter()
            .map(|seed| {
                let mut records = by_seed.remove(&seed).unwrap_or_default();
                records.sort_by_key(|r| r.round);
                (seed, records)
            })
            .collect();

        info!(
            experiment = %self.config.experiment_name,
            seeds = jobs.len(),
            "experiment started"
        );
        let outcomes: Vec<SeedOutcome> = jobs
            .into_par_iter()
            .map(|(seed, records)| SeedOutcome {
                seed,
                result: self.run_seed(seed, records, &factory),
            })
            .collect();
        let failed = outcomes.iter().filter(|o| o.error().is_some()).count();
        info!(
            experiment = %self.config.experiment_name,
            failed,
            "experiment finished"
        );
        outcomes
    }

    fn run_seed<F>(&self, seed: u64, history: Vec<RunRecord>, factory: &F) -> CalResult<SeedReport>
    where
        F: Fn(u64) -> CalResult<SeedComponents> + Sync,
    {
        let components = factory(seed)?;
        let mut orchestrator =
            ActiveLearningOrchestrator::new(&self.config, &self.all_indices, seed, components)?
                .with_cancellation(self.cancellation.clone());
        for reporter in &self.reporters {
            orchestrator = orchestrator.with_reporter(Arc::clone(reporter));
        }
        if !history.is_empty() {
            orchestrator.resume(history)?;
        }
        Ok(orchestrator.run())
    }

    /// Per-round statistics across seeds.
    pub fn summarize(&self, outcomes: &[SeedOutcome]) -> ExperimentSummary {
        ExperimentSummary::from_outcomes(
            &self.config.experiment_name,
            outcomes.iter().map(SeedOutcome::as_summary_entry),
        )
    }
}
