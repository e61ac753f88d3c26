//! KL divergence between class-probability vectors.
//!
//! Distributions are smoothed before comparison so a zero in the reference
//! never produces an infinite score.

use cal_core::constants::DEFAULT_SMOOTHING_EPSILON;
use cal_core::errors::SamplingError;

/// Add `epsilon` to every entry and renormalize to sum 1.
pub fn smooth(probs: &[f64], epsilon: f64) -> Vec<f64> {
    let total: f64 = probs.iter().map(|p| p + epsilon).sum();
    if total <= 0.0 || !total.is_finite() {
        return vec![1.0 / probs.len().max(1) as f64; probs.len()];
    }
    probs.iter().map(|p| (p + epsilon) / total).collect()
}

/// `KL(p || q)` in nats. Terms with `p_i == 0` contribute nothing.
///
/// Inputs are assumed strictly positive wherever `p` is; call [`smooth`]
/// first otherwise.
pub fn kl_divergence(p: &[f64], q: &[f64]) -> f64 {
    p.iter()
        .zip(q.iter())
        .filter(|(pi, _)| **pi > 0.0)
        .map(|(pi, qi)| pi * (pi / qi).ln())
        .sum()
}

/// `KL(p || q)` after smoothing both sides with [`DEFAULT_SMOOTHING_EPSILON`].
///
/// Never negative: rounding below zero is clamped.
pub fn smoothed_kl(p: &[f64], q: &[f64]) -> Result<f64, SamplingError> {
    smoothed_kl_with(p, q, DEFAULT_SMOOTHING_EPSILON)
}

pub fn smoothed_kl_with(p: &[f64], q: &[f64], epsilon: f64) -> Result<f64, SamplingError> {
    if p.len() != q.len() {
        return Err(SamplingError::ClassCountMismatch {
            expected: p.len(),
            actual: q.len(),
        });
    }
    let kl = kl_divergence(&smooth(p, epsilon), &smooth(q, epsilon));
    Ok(if kl.is_nan() { 0.0 } else { kl.max(0.0) })
}

/// Elementwise arithmetic mean of equally sized distributions.
///
/// Returns `None` for an empty set.
pub fn mean_distribution<'a, I>(distributions: I) -> Option<Vec<f64>>
where
    I: IntoIterator<Item = &'a [f64]>,
{
    let mut iter = distributions.into_iter();
    let first = iter.next()?;
    let mut sum = first.to_vec();
    let mut count = 1usize;
    for dist in iter {
        for (acc, p) in sum.iter_mut().zip(dist) {
            *acc += p;
        }
        count += 1;
    }
    let n = count as f64;
    sum.iter_mut().for_each(|v| *v /= n);
    Some(sum)
}
