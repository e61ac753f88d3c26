//! Exact nearest-neighbor search over embeddings.

pub mod index;
pub mod metric;

pub use index::{Neighbor, NeighborIndex};
pub use metric::{cosine_similarity, euclidean, gaussian_kl, symmetric_gaussian_kl, Metric};
