//! Sampler inputs for one round.

use crate::errors::SamplingError;

use super::{Embedding, PredictiveDistribution, SampleIndex};

/// One pool (labeled or unlabeled) as seen by a sampler in one round.
///
/// Embeddings and distributions are parallel to `indices` when present.
/// They are fetched only when the sampler asks for them.
#[derive(Debug, Clone, Default)]
pub struct PoolSnapshot {
    pub indices: Vec<SampleIndex>,
    pub embeddings: Option<Vec<Embedding>>,
    pub distributions: Option<Vec<PredictiveDistribution>>,
}

impl PoolSnapshot {
    pub fn new(indices: Vec<SampleIndex>) -> Self {
        Self {
            indices,
            embeddings: None,
            distributions: None,
        }
    }

    pub fn with_embeddings(mut self, embeddings: Vec<Embedding>) -> Self {
        self.embeddings = Some(embeddings);
        self
    }

    pub fn with_distributions(mut self, distributions: Vec<PredictiveDistribution>) -> Self {
        self.distributions = Some(distributions);
        self
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Embeddings, checked to be present and parallel to `indices`.
    pub fn require_embeddings(
        &self,
        sampler: &str,
        pool: &str,
    ) -> Result<&[Embedding], SamplingError> {
        let embeddings = self.embeddings.as_deref().ok_or_else(|| SamplingError::MissingInput {
            sampler: sampler.to_string(),
            input: "embeddings".to_string(),
            pool: pool.to_string(),
        })?;
        check_len(&format!("{pool} embeddings"), self.indices.len(), embeddings.len())?;
        Ok(embeddings)
    }

    /// Distributions, checked to be present and parallel to `indices`.
    pub fn require_distributions(
        &self,
        sampler: &str,
        pool: &str,
    ) -> Result<&[PredictiveDistribution], SamplingError> {
        let distributions =
            self.distributions
                .as_deref()
                .ok_or_else(|| SamplingError::MissingInput {
                    sampler: sampler.to_string(),
                    input: "predictive distributions".to_string(),
                    pool: pool.to_string(),
                })?;
        check_len(
            &format!("{pool} distributions"),
            self.indices.len(),
            distributions.len(),
        )?;
        Ok(distributions)
    }
}

fn check_len(what: &str, expected: usize, actual: usize) -> Result<(), SamplingError> {
    if expected != actual {
        return Err(SamplingError::LengthMismatch {
            what: what.to_string(),
            expected,
            actual,
        });
    }
    Ok(())
}

/// Everything a sampler sees when asked for a batch.
#[derive(Debug, Clone, Copy)]
pub struct SelectionRequest<'a> {
    pub round: usize,
    /// Requested batch size before clamping to the unlabeled pool.
    pub batch_size: usize,
    pub labeled: &'a PoolSnapshot,
    pub unlabeled: &'a PoolSnapshot,
}

impl SelectionRequest<'_> {
    /// `min(batch_size, |U|)`.
    pub fn effective_batch_size(&self) -> usize {
        self.batch_size.min(self.unlabeled.len())
    }
}
