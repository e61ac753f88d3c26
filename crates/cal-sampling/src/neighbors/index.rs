//! Exact k-nearest-neighbor search over one round's labeled embeddings.

use std::cmp::Ordering;

use cal_core::config::NeighborMetricKind;
use cal_core::errors::SamplingError;
use cal_core::models::{Embedding, SampleIndex};

use super::metric::Metric;

/// One hit of a neighbor query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Position of the reference point in the slice the index was built from.
    pub position: usize,
    pub index: SampleIndex,
    pub distance: f64,
}

/// Brute-force k-NN. Rebuilt every round since embeddings move as the
/// encoder trains.
#[derive(Debug)]
pub struct NeighborIndex<'a, M: Metric = NeighborMetricKind> {
    indices: &'a [SampleIndex],
    embeddings: &'a [Embedding],
    metric: M,
    dim: usize,
}

impl<'a, M: Metric> NeighborIndex<'a, M> {
    /// Index `embeddings`, which are parallel to `indices`.
    ///
    /// All embeddings must share one dimension, and carry a log-variance when
    /// the metric reads one.
    pub fn build(
        indices: &'a [SampleIndex],
        embeddings: &'a [Embedding],
        metric: M,
    ) -> Result<Self, SamplingError> {
        if indices.len() != embeddings.len() {
            return Err(SamplingError::LengthMismatch {
                what: "reference embeddings".to_string(),
                expected: indices.len(),
                actual: embeddings.len(),
            });
        }
        let dim = embeddings.first().map(Embedding::dim).unwrap_or(0);
        for embedding in embeddings {
            check_embedding(embedding, dim, &metric)?;
        }
        Ok(Self {
            indices,
            embeddings,
            metric,
            dim,
        })
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Dimension of the indexed embeddings (0 when empty).
    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn metric(&self) -> &M {
        &self.metric
    }

    /// The `k` nearest references to `query`, nearest first.
    ///
    /// `k` is clamped to the number of references. Equal distances order by
    /// ascending sample index; NaN distances sort last.
    pub fn query(&self, query: &Embedding, k: usize) -> Result<Vec<Neighbor>, SamplingError> {
        if self.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        check_embedding(query, self.dim, &self.metric)?;

        let mut hits: Vec<Neighbor> = self
            .embeddings
            .iter()
            .zip(self.indices.iter())
            .enumerate()
            .map(|(position, (reference, &index))| Neighbor {
                position,
                index,
                distance: normalize(self.metric.distance(query, reference)),
            })
            .collect();

        let k = k.min(hits.len());
        if k < hits.len() {
            hits.select_nth_unstable_by(k - 1, compare);
            hits.truncate(k);
        }
        hits.sort_by(compare);
        Ok(hits)
    }
}

fn check_embedding<M: Metric>(
    embedding: &Embedding,
    dim: usize,
    metric: &M,
) -> Result<(), SamplingError> {
    if embedding.dim() != dim {
        return Err(SamplingError::DimensionMismatch {
            expected: dim,
            actual: embedding.dim(),
        });
    }
    if metric.needs_variance() {
        match &embedding.log_var {
            None => {
                return Err(SamplingError::MissingVariance {
                    metric: metric.name().to_string(),
                })
            }
            Some(lv) if lv.len() != dim => {
                return Err(SamplingError::DimensionMismatch {
                    expected: dim,
                    actual: lv.len(),
                })
            }
            Some(_) => {}
        }
    }
    Ok(())
}

// NaN compares greater than everything under `total_cmp` only when positive;
// fold both NaN signs and -0.0 so the ordering is stable.
fn normalize(distance: f64) -> f64 {
    if distance.is_nan() {
        f64::INFINITY
    } else if distance == 0.0 {
        0.0
    } else {
        distance
    }
}

fn compare(a: &Neighbor, b: &Neighbor) -> Ordering {
    a.distance
        .total_cmp(&b.distance)
        .then_with(|| a.index.cmp(&b.index))
}
