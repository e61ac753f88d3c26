//! Neighbor distances: Euclidean, cosine, and Gaussian KL over latent codes.

use cal_core::config::NeighborMetricKind;
use cal_core::models::Embedding;

/// Distance between a query embedding and a reference embedding.
///
/// Need not be symmetric: the Gaussian KL is measured from the query to the
/// reference.
pub trait Metric: Send + Sync {
    fn name(&self) -> &str;

    fn distance(&self, query: &Embedding, reference: &Embedding) -> f64;

    /// Whether `distance` reads `log_var`. Indexes reject embeddings without
    /// one when this is true.
    fn needs_variance(&self) -> bool {
        false
    }
}

impl Metric for NeighborMetricKind {
    fn name(&self) -> &str {
        self.as_str()
    }

    fn distance(&self, query: &Embedding, reference: &Embedding) -> f64 {
        match self {
            Self::L2 => euclidean(&query.mean, &reference.mean),
            Self::Cosine => 1.0 - cosine_similarity(&query.mean, &reference.mean),
            Self::GaussianKl => gaussian_kl(
                &query.mean,
                query.log_var.as_deref(),
                &reference.mean,
                reference.log_var.as_deref(),
            ),
            Self::SymmetricGaussianKl => symmetric_gaussian_kl(
                &query.mean,
                query.log_var.as_deref(),
                &reference.mean,
                reference.log_var.as_deref(),
            ),
        }
    }

    fn needs_variance(&self) -> bool {
        NeighborMetricKind::needs_variance(self)
    }
}

/// Per-dimension log-variance; a missing vector reads as zeros (unit
/// variance). Indexes reject such embeddings up front, so this only matters
/// for direct calls.
fn lv_at(log_var: Option<&[f32]>, i: usize) -> f64 {
    log_var
        .and_then(|lv| lv.get(i))
        .map(|v| *v as f64)
        .unwrap_or(0.0)
}

/// Euclidean distance.
pub fn euclidean(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = *x as f64 - *y as f64;
            d * d
        })
        .sum::<f64>()
        .sqrt()
}

/// Cosine similarity between two vectors.
/// Returns 0.0 for zero-length or zero-magnitude vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let (mut dot, mut mag_a, mut mag_b) = (0.0f64, 0.0f64, 0.0f64);
    for (x, y) in a.iter().zip(b.iter()) {
        let (x, y) = (*x as f64, *y as f64);
        dot += x * y;
        mag_a += x * x;
        mag_b += y * y;
    }
    let denom = mag_a.sqrt() * mag_b.sqrt();
    if denom < f64::EPSILON {
        0.0
    } else {
        (dot / denom).clamp(-1.0, 1.0)
    }
}

/// `KL(N_q || N_r)` for diagonal Gaussians given as mean and log-variance.
pub fn gaussian_kl(
    mu_q: &[f32],
    lv_q: Option<&[f32]>,
    mu_r: &[f32],
    lv_r: Option<&[f32]>,
) -> f64 {
    let mut sum = 0.0;
    for (i, (mq, mr)) in mu_q.iter().zip(mu_r.iter()).enumerate() {
        let (lq, lr) = (lv_at(lv_q, i), lv_at(lv_r, i));
        let diff = *mr as f64 - *mq as f64;
        sum += (-lr).exp() * (lq.exp() + diff * diff) - 1.0 + lr - lq;
    }
    0.5 * sum
}

/// `KL(N_q || N_r) + KL(N_r || N_q)` for diagonal Gaussians.
pub fn symmetric_gaussian_kl(
    mu_q: &[f32],
    lv_q: Option<&[f32]>,
    mu_r: &[f32],
    lv_r: Option<&[f32]>,
) -> f64 {
    let mut sum = 0.0;
    for (i, (mq, mr)) in mu_q.iter().zip(mu_r.iter()).enumerate() {
        let (lq, lr) = (lv_at(lv_q, i), lv_at(lv_r, i));
        let diff = *mr as f64 - *mq as f64;
        let d2 = diff * diff;
        sum += (-lr).exp() * (lq.exp() + d2) + (-lq).exp() * (lr.exp() + d2) - 2.0;
    }
    0.5 * sum
}
