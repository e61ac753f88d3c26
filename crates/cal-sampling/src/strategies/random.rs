//! Uniform sampling without replacement.

use rand::seq::index;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use cal_core::constants::SAMPLER_STREAM;
use cal_core::errors::CalResult;
use cal_core::models::{SelectionBatch, SelectionRequest};
use cal_core::rng::seeded_stream;
use cal_core::traits::{ISampler, SamplerInputs};

/// Baseline strategy. Draws from the seed's sampler stream, so two runs with
/// the same seed and the same unlabeled pool pick the same batch.
#[derive(Debug, Clone)]
pub struct RandomSampler {
    rng: ChaCha8Rng,
}

impl RandomSampler {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: seeded_stream(seed, SAMPLER_STREAM),
        }
    }
}

impl ISampler for RandomSampler {
    fn name(&self) -> &str {
        "random"
    }

    fn inputs(&self) -> SamplerInputs {
        SamplerInputs::NONE
    }

    fn select(&mut self, request: &SelectionRequest<'_>) -> CalResult<SelectionBatch> {
        let take = request.effective_batch_size();
        if take == 0 {
            return Ok(SelectionBatch::empty());
        }
        // Fixed pool order regardless of how the caller built the snapshot.
        let mut pool = request.unlabeled.indices.clone();
        pool.sort_unstable();

        let picked: Vec<_> = index::sample(&mut self.rng, pool.len(), take)
            .into_iter()
            .map(|i| pool[i])
            .collect();
        debug!(round = request.round, picked = picked.len(), "random selection");
        Ok(SelectionBatch::new(picked))
    }
}
