//! Variational adversarial sampling.
//!
//! A discriminator learns to tell labeled latent codes from unlabeled ones;
//! the unlabeled samples it is most sure are unlabeled get acquired.

pub mod discriminator;
pub mod optimizer;

use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use cal_core::config::OptimizerKind;
use cal_core::constants::{DISCRIMINATOR_BATCH_SIZE, DISCRIMINATOR_STREAM};
use cal_core::errors::{CalResult, SamplingError};
use cal_core::models::{Embedding, SelectionBatch, SelectionRequest};
use cal_core::rng::seeded_stream;
use cal_core::traits::{ISampler, SamplerInputs};

pub use discriminator::Discriminator;
pub use optimizer::Optimizer;

use discriminator::{code_tensor, to_sampling};

use crate::ranking::rank_ascending;

#[derive(Debug, Clone)]
pub struct VaalSampler {
    latent_dim: Option<usize>,
    hidden_dim: usize,
    optimizer: OptimizerKind,
    lr: f64,
    n_sub_epochs: usize,
    rng: ChaCha8Rng,
}

impl VaalSampler {
    pub fn new(
        seed: u64,
        latent_dim: Option<usize>,
        hidden_dim: usize,
        optimizer: OptimizerKind,
        lr: f64,
        n_sub_epochs: usize,
    ) -> Self {
        Self {
            latent_dim,
            hidden_dim,
            optimizer,
            lr,
            n_sub_epochs,
            rng: seeded_stream(seed, DISCRIMINATOR_STREAM),
        }
    }

    /// Train a fresh discriminator on this round's codes.
    ///
    /// Each step pairs a mini-batch of labeled codes (target 1) with one of
    /// unlabeled codes (target 0) and minimizes the sum of both BCE terms;
    /// the shorter pool cycles.
    pub fn train(
        &mut self,
        labeled: &[Embedding],
        unlabeled: &[Embedding],
    ) -> Result<Discriminator, SamplingError> {
        let dim = unlabeled
            .first()
            .or_else(|| labeled.first())
            .map(Embedding::dim)
            .unwrap_or(0);
        let disc = Discriminator::new(dim, self.hidden_dim, &mut self.rng)?;
        let mut optimizer =
            Optimizer::new(self.optimizer, self.lr, disc.vars()).map_err(to_sampling)?;

        let batch = DISCRIMINATOR_BATCH_SIZE;
        let longest = labeled.len().max(unlabeled.len());
        let steps = longest.div_ceil(batch);
        let mut l_order: Vec<usize> = (0..labeled.len()).collect();
        let mut u_order: Vec<usize> = (0..unlabeled.len()).collect();

        for epoch in 0..self.n_sub_epochs {
            l_order.shuffle(&mut self.rng);
            u_order.shuffle(&mut self.rng);
            let mut epoch_loss = 0.0;
            for step in 0..steps {
                let halves = [(labeled, &l_order, 1.0), (unlabeled, &u_order, 0.0)];
                let mut terms = Vec::with_capacity(2);
                for (pool, order, target) in halves {
                    if order.is_empty() {
                        continue;
                    }
                    let members: Vec<Embedding> = (step * batch..(step + 1) * batch)
                        .map(|i| pool[order[i % order.len()]].clone())
                        .collect();
                    let codes = code_tensor(&members, dim).map_err(to_sampling)?;
                    terms.push(disc.loss(&codes, target).map_err(to_sampling)?);
                }
                let loss = match terms.as_slice() {
                    [one] => one.clone(),
                    [a, b] => a.add(b).map_err(to_sampling)?,
                    _ => continue,
                };
                optimizer.backward_step(&loss).map_err(to_sampling)?;
                epoch_loss += loss.to_scalar::<f32>().map_err(to_sampling)? as f64;
            }
            debug!(
                epoch,
                loss = epoch_loss / steps.max(1) as f64,
                "discriminator epoch"
            );
        }
        Ok(disc)
    }

    fn check_dims(&self, embeddings: &[Embedding]) -> Result<(), SamplingError> {
        let expected = self
            .latent_dim
            .or_else(|| embeddings.first().map(Embedding::dim));
        let Some(expected) = expected else {
            return Ok(());
        };
        match embeddings.iter().find(|e| e.dim() != expected) {
            Some(e) => Err(SamplingError::DimensionMismatch {
                expected,
                actual: e.dim(),
            }),
            None => Ok(()),
        }
    }
}

impl ISampler for VaalSampler {
    fn name(&self) -> &str {
        "vaal"
    }

    fn inputs(&self) -> SamplerInputs {
        SamplerInputs::EMBEDDINGS
    }

    fn select(&mut self, request: &SelectionRequest<'_>) -> CalResult<SelectionBatch> {
        let take = request.effective_batch_size();
        if take == 0 {
            return Ok(SelectionBatch::empty());
        }
        let labeled = request.labeled.require_embeddings("vaal", "labeled")?;
        let unlabeled = request.unlabeled.require_embeddings("vaal", "unlabeled")?;
        self.check_dims(unlabeled)?;
        self.check_dims(labeled)?;
        if let (Some(l), Some(u)) = (labeled.first(), unlabeled.first()) {
            if l.dim() != u.dim() {
                return Err(SamplingError::DimensionMismatch {
                    expected: u.dim(),
                    actual: l.dim(),
                }
                .into());
            }
        }

        let disc = self.train(labeled, unlabeled)?;
        let probs = disc.predict(unlabeled)?;
        let scored = request
            .unlabeled
            .indices
            .iter()
            .copied()
            .zip(probs)
            .collect();
        debug!(round = request.round, take, "vaal selection");
        Ok(rank_ascending(scored, take))
    }
}
