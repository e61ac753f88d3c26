//! Cross-seed aggregation of run records.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cal_core::errors::{CalError, CalErrorCode};
use cal_core::models::RunRecord;

/// One seed's result as fed to [`ExperimentSummary::from_outcomes`].
#[derive(Debug, Clone, Copy)]
pub enum SeedResult<'a> {
    /// Committed records of a finished or cancelled seed.
    Records { seed: u64, records: &'a [RunRecord] },
    Failed { seed: u64, error: &'a CalError },
}

/// Mean and spread of one round across the seeds that reached it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundStats {
    pub round: usize,
    pub n_seeds: usize,
    pub labeled_mean: f64,
    pub labeled_std: f64,
    /// Present when at least one seed reported a validation accuracy.
    pub validation_accuracy_mean: Option<f64>,
    pub validation_accuracy_std: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedFailure {
    pub seed: u64,
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentSummary {
    pub experiment_name: String,
    pub n_seeds: usize,
    pub rounds: Vec<RoundStats>,
    pub failures: Vec<SeedFailure>,
    pub generated_at: DateTime<Utc>,
}

impl ExperimentSummary {
    /// Aggregate per-round statistics. Failed seeds contribute no rounds, even
    /// ones they committed before failing, so every round is averaged over
    /// seeds that were healthy.
    pub fn from_outcomes<'a, I>(experiment_name: &str, outcomes: I) -> Self
    where
        I: IntoIterator<Item = SeedResult<'a>>,
    {
        let mut labeled: BTreeMap<usize, Vec<f64>> = BTreeMap::new();
        let mut accuracy: BTreeMap<usize, Vec<f64>> = BTreeMap::new();
        let mut failures = Vec::new();
        let mut n_seeds = 0;

        for outcome in outcomes {
            n_seeds += 1;
            match outcome {
                SeedResult::Records { records, .. } => {
                    for r in records {
                        labeled.entry(r.round).or_default().push(r.labeled as f64);
                        if let Some(acc) = r.outcome.validation_accuracy {
                            accuracy.entry(r.round).or_default().push(acc);
                        }
                    }
                }
                SeedResult::Failed { seed, error } => failures.push(SeedFailure {
                    seed,
                    code: error.error_code().to_string(),
                    message: error.to_string(),
                }),
            }
        }

        let rounds = labeled
            .into_iter()
            .map(|(round, values)| {
                let (labeled_mean, labeled_std) = mean_std(&values);
                let acc = accuracy.get(&round).map(|a| mean_std(a));
                RoundStats {
                    round,
                    n_seeds: values.len(),
                    labeled_mean,
                    labeled_std,
                    validation_accuracy_mean: acc.map(|(m, _)| m),
                    validation_accuracy_std: acc.map(|(_, s)| s),
                }
            })
            .collect();

        Self {
            experiment_name: experiment_name.to_string(),
            n_seeds,
            rounds,
            failures,
            generated_at: Utc::now(),
        }
    }

    pub fn succeeded(&self) -> usize {
        self.n_seeds - self.failures.len()
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Mean and sample standard deviation (0 for a single value).
fn mean_std(values: &[f64]) -> (f64, f64) {
    let n = values.len();
    if n == 0 {
        return (0.0, 0.0);
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    if n == 1 {
        return (mean, 0.0);
    }
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    (mean, var.sqrt())
}
