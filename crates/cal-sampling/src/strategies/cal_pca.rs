//! CAL over a PCA-reduced latent space.

use tracing::debug;

use cal_core::errors::CalResult;
use cal_core::models::{SelectionBatch, SelectionRequest};
use cal_core::traits::{ISampler, SamplerInputs};

use super::cal::{scoring_pool, select_top, CalScorer, ScoringPool};
use crate::projection::Pca;

/// Fits PCA on this round's labeled and unlabeled means together, projects
/// both pools, then scores exactly like `cal`.
#[derive(Debug, Clone)]
pub struct CalPcaSampler {
    scorer: CalScorer,
    n_components: usize,
}

impl CalPcaSampler {
    pub fn new(scorer: CalScorer, n_components: usize) -> Self {
        Self {
            scorer,
            n_components,
        }
    }

    pub fn n_components(&self) -> usize {
        self.n_components
    }
}

impl ISampler for CalPcaSampler {
    fn name(&self) -> &str {
        "cal_pca"
    }

    fn inputs(&self) -> SamplerInputs {
        SamplerInputs::ALL
    }

    fn select(&mut self, request: &SelectionRequest<'_>) -> CalResult<SelectionBatch> {
        let take = request.effective_batch_size();
        if take == 0 {
            return Ok(SelectionBatch::empty());
        }
        let labeled = scoring_pool(self.name(), "labeled", request.labeled)?;
        let unlabeled = scoring_pool(self.name(), "unlabeled", request.unlabeled)?;

        let joint: Vec<_> = labeled
            .embeddings
            .iter()
            .chain(unlabeled.embeddings.iter())
            .cloned()
            .collect();
        let pca = Pca::fit(&joint, self.n_components)?;
        debug!(
            round = request.round,
            components = self.n_components,
            explained = pca.explained_variance_ratio().iter().sum::<f64>(),
            "fitted projection"
        );
        let labeled_proj = pca.transform(labeled.embeddings)?;
        let unlabeled_proj = pca.transform(unlabeled.embeddings)?;

        let scores = self.scorer.score_pool(
            ScoringPool {
                embeddings: &labeled_proj,
                ..labeled
            },
            ScoringPool {
                embeddings: &unlabeled_proj,
                ..unlabeled
            },
        )?;
        Ok(select_top(scores, take, request.round))
    }
}
