//! In-memory collaborators for orchestrator and experiment tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use cal_core::errors::CollaboratorError;
use cal_core::models::{Embedding, PredictiveDistribution, RunRecord, SampleIndex, TrainingOutcome};
use cal_core::traits::{IClassifierOracle, IEmbeddingProvider, IRunReporter};

use crate::synthetic::SyntheticDataset;

/// Embedding provider backed by a fixed table, one row per sample.
#[derive(Debug)]
pub struct TableEmbeddingProvider {
    table: Vec<Embedding>,
    dim: usize,
    calls: AtomicUsize,
}

impl TableEmbeddingProvider {
    pub fn new(table: Vec<Embedding>) -> Self {
        let dim = table.first().map(Embedding::dim).unwrap_or(0);
        Self {
            table,
            dim,
            calls: AtomicUsize::new(0),
        }
    }

    /// Use the dataset's points as embedding means.
    pub fn from_dataset(data: &SyntheticDataset) -> Self {
        Self::new(data.points.iter().cloned().map(Embedding::new).collect())
    }

    /// Same, with a constant log-variance on every dimension.
    pub fn gaussian_from_dataset(data: &SyntheticDataset, log_var: f32) -> Self {
        Self::new(
            data.points
                .iter()
                .map(|p| Embedding::gaussian(p.clone(), vec![log_var; p.len()]))
                .collect(),
        )
    }

    /// Number of `embed` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl IEmbeddingProvider for TableEmbeddingProvider {
    fn embed(&self, indices: &[SampleIndex]) -> Result<Vec<Embedding>, CollaboratorError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        indices
            .iter()
            .map(|&i| {
                self.table
                    .get(i)
                    .cloned()
                    .ok_or(CollaboratorError::UnknownSample { index: i })
            })
            .collect()
    }

    fn dimensions(&self) -> usize {
        self.dim
    }

    fn name(&self) -> &str {
        "table"
    }
}

/// Provider whose every call fails.
#[derive(Debug, Default)]
pub struct FailingEmbeddingProvider;

impl IEmbeddingProvider for FailingEmbeddingProvider {
    fn embed(&self, _indices: &[SampleIndex]) -> Result<Vec<Embedding>, CollaboratorError> {
        Err(CollaboratorError::Unavailable {
            name: "failing-encoder".to_string(),
        })
    }

    fn dimensions(&self) -> usize {
        0
    }

    fn name(&self) -> &str {
        "failing"
    }
}

/// Classifier that assigns each sample to the nearest labeled class centroid.
///
/// Predictions are a softmax over negative squared centroid distances.
/// Classes without labeled samples get zero probability; before any class
/// has one, predictions are uniform.
#[derive(Debug, Clone)]
pub struct NearestCentroidOracle {
    data: Arc<SyntheticDataset>,
    temperature: f64,
    validation: Vec<SampleIndex>,
    centroids: Vec<Option<Vec<f64>>>,
    fail_at_round: Option<usize>,
    trained_sizes: Vec<usize>,
}

impl NearestCentroidOracle {
    pub fn new(data: Arc<SyntheticDataset>) -> Self {
        let n_classes = data.n_classes;
        Self {
            data,
            temperature: 1.0,
            validation: Vec::new(),
            centroids: vec![None; n_classes],
            fail_at_round: None,
            trained_sizes: Vec::new(),
        }
    }

    /// Report accuracy on these samples after each retrain.
    pub fn with_validation(mut self, validation: Vec<SampleIndex>) -> Self {
        self.validation = validation;
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    /// Make `retrain` fail at the given round.
    pub fn fail_at_round(mut self, round: usize) -> Self {
        self.fail_at_round = Some(round);
        self
    }

    /// Labeled-set size seen by each retrain, in call order.
    pub fn trained_sizes(&self) -> &[usize] {
        &self.trained_sizes
    }

    fn point(&self, index: SampleIndex) -> Result<&[f32], CollaboratorError> {
        self.data
            .points
            .get(index)
            .map(Vec::as_slice)
            .ok_or(CollaboratorError::UnknownSample { index })
    }

    fn distribution(&self, point: &[f32]) -> PredictiveDistribution {
        let logits: Vec<Option<f64>> = self
            .centroids
            .iter()
            .map(|c| {
                c.as_ref().map(|c| {
                    let d2: f64 = c
                        .iter()
                        .zip(point)
                        .map(|(a, b)| (a - *b as f64).powi(2))
                        .sum();
                    -d2 / self.temperature
                })
            })
            .collect();
        let Some(max) = logits.iter().flatten().copied().reduce(f64::max) else {
            return PredictiveDistribution::uniform(self.data.n_classes);
        };
        let exp: Vec<f64> = logits
            .iter()
            .map(|l| l.map(|l| (l - max).exp()).unwrap_or(0.0))
            .collect();
        let sum: f64 = exp.iter().sum();
        PredictiveDistribution::new(exp.iter().map(|e| e / sum).collect())
            .unwrap_or_else(|_| PredictiveDistribution::uniform(self.data.n_classes))
    }
}

impl IClassifierOracle for NearestCentroidOracle {
    fn retrain(
        &mut self,
        labeled: &[SampleIndex],
        round: usize,
    ) -> Result<TrainingOutcome, CollaboratorError> {
        if self.fail_at_round == Some(round) {
            return Err(CollaboratorError::TrainingFailed {
                reason: format!("scripted failure at round {round}"),
            });
        }
        let dim = self.data.dim();
        let mut sums = vec![vec![0.0f64; dim]; self.data.n_classes];
        let mut counts = vec![0usize; self.data.n_classes];
        for &i in labeled {
            let point = self.point(i)?;
            let class = self.data.labels[i];
            for (s, x) in sums[class].iter_mut().zip(point) {
                *s += *x as f64;
            }
            counts[class] += 1;
        }
        self.centroids = sums
            .into_iter()
            .zip(counts)
            .map(|(s, n)| (n > 0).then(|| s.into_iter().map(|v| v / n as f64).collect()))
            .collect();
        self.trained_sizes.push(labeled.len());

        let validation_accuracy = if self.validation.is_empty() {
            None
        } else {
            let mut correct = 0usize;
            for &i in &self.validation {
                if self.distribution(self.point(i)?).argmax() == self.data.labels[i] {
                    correct += 1;
                }
            }
            Some(correct as f64 / self.validation.len() as f64)
        };
        Ok(TrainingOutcome {
            validation_accuracy,
            ..Default::default()
        })
    }

    fn predict(
        &self,
        indices: &[SampleIndex],
    ) -> Result<Vec<PredictiveDistribution>, CollaboratorError> {
        indices
            .iter()
            .map(|&i| Ok(self.distribution(self.point(i)?)))
            .collect()
    }

    fn num_classes(&self) -> usize {
        self.data.n_classes
    }
}

/// Classifier that replays a fixed distribution per sample.
#[derive(Debug, Clone)]
pub struct ScriptedOracle {
    distributions: Vec<PredictiveDistribution>,
    fail_at_round: Option<usize>,
}

impl ScriptedOracle {
    pub fn new(distributions: Vec<PredictiveDistribution>) -> Self {
        Self {
            distributions,
            fail_at_round: None,
        }
    }

    /// Uniform predictions for `n` samples over `n_classes` classes.
    pub fn uniform(n: usize, n_classes: usize) -> Self {
        Self::new(vec![PredictiveDistribution::uniform(n_classes); n])
    }

    pub fn fail_at_round(mut self, round: usize) -> Self {
        self.fail_at_round = Some(round);
        self
    }
}

impl IClassifierOracle for ScriptedOracle {
    fn retrain(
        &mut self,
        labeled: &[SampleIndex],
        round: usize,
    ) -> Result<TrainingOutcome, CollaboratorError> {
        if self.fail_at_round == Some(round) {
            return Err(CollaboratorError::TrainingFailed {
                reason: format!("scripted failure at round {round}"),
            });
        }
        Ok(TrainingOutcome {
            validation_loss: Some(1.0 / (1.0 + labeled.len() as f64)),
            ..Default::default()
        })
    }

    fn predict(
        &self,
        indices: &[SampleIndex],
    ) -> Result<Vec<PredictiveDistribution>, CollaboratorError> {
        indices
            .iter()
            .map(|&i| {
                self.distributions
                    .get(i)
                    .cloned()
                    .ok_or(CollaboratorError::UnknownSample { index: i })
            })
            .collect()
    }

    fn num_classes(&self) -> usize {
        self.distributions
            .first()
            .map(PredictiveDistribution::num_classes)
            .unwrap_or(0)
    }
}

/// Reporter whose writes always fail. Counts attempts.
#[derive(Debug, Default)]
pub struct FailingReporter {
    attempts: AtomicUsize,
}

impl FailingReporter {
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::Relaxed)
    }
}

impl IRunReporter for FailingReporter {
    fn record(&self, _record: &RunRecord) -> Result<(), CollaboratorError> {
        self.attempts.fetch_add(1, Ordering::Relaxed);
        Err(CollaboratorError::ReportFailed {
            reason: "sink closed".to_string(),
        })
    }
}
