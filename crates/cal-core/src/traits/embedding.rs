use crate::errors::CollaboratorError;
use crate::models::{Embedding, SampleIndex};

/// Maps samples to latent codes.
///
/// Shared read-only across seeds, hence `Sync`. Implementations backed by a
/// model that is trained alongside the classifier must return the current
/// snapshot on every call; callers never cache results across rounds.
pub trait IEmbeddingProvider: Send + Sync {
    /// Embed the given samples, one embedding per index, in order.
    fn embed(&self, indices: &[SampleIndex]) -> Result<Vec<Embedding>, CollaboratorError>;

    /// Dimensionality of the embeddings produced.
    fn dimensions(&self) -> usize;

    /// Human-readable provider name.
    fn name(&self) -> &str;
}
