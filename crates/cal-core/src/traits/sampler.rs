use crate::errors::CalResult;
use crate::models::{SelectionBatch, SelectionRequest};

/// Model outputs a sampler needs the orchestrator to fetch before `select`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SamplerInputs {
    pub embeddings: bool,
    pub distributions: bool,
}

impl SamplerInputs {
    pub const NONE: Self = Self {
        embeddings: false,
        distributions: false,
    };
    pub const EMBEDDINGS: Self = Self {
        embeddings: true,
        distributions: false,
    };
    pub const ALL: Self = Self {
        embeddings: true,
        distributions: true,
    };
}

/// Acquisition strategy.
///
/// The returned batch must have `request.effective_batch_size()` distinct
/// entries, all taken from `request.unlabeled.indices`.
pub trait ISampler: Send {
    /// Config name of the strategy (`"cal"`, `"random"`, ...).
    fn name(&self) -> &str;

    fn inputs(&self) -> SamplerInputs;

    fn select(&mut self, request: &SelectionRequest<'_>) -> CalResult<SelectionBatch>;
}
