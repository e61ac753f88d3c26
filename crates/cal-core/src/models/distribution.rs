use serde::{Deserialize, Serialize};

use crate::constants::DISTRIBUTION_TOLERANCE;
use crate::errors::SamplingError;

/// Class-probability vector produced by the classifier for one sample.
///
/// Entries are non-negative and sum to 1 within [`DISTRIBUTION_TOLERANCE`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct PredictiveDistribution(Vec<f64>);

impl PredictiveDistribution {
    /// Validate and wrap a probability vector.
    pub fn new(probs: Vec<f64>) -> Result<Self, SamplingError> {
        if probs.is_empty() {
            return Err(SamplingError::InvalidDistribution {
                reason: "no classes".to_string(),
            });
        }
        if let Some(p) = probs.iter().find(|p| !p.is_finite() || **p < 0.0) {
            return Err(SamplingError::InvalidDistribution {
                reason: format!("entry {p} is not a probability"),
            });
        }
        let sum: f64 = probs.iter().sum();
        if (sum - 1.0).abs() > DISTRIBUTION_TOLERANCE {
            return Err(SamplingError::InvalidDistribution {
                reason: format!("entries sum to {sum}"),
            });
        }
        Ok(Self(probs))
    }

    /// Build from log-probabilities: exponentiate, then L1-normalize.
    pub fn from_log_probs(log_probs: &[f64]) -> Result<Self, SamplingError> {
        let exp: Vec<f64> = log_probs.iter().map(|l| l.exp()).collect();
        let sum: f64 = exp.iter().sum();
        if !sum.is_finite() || sum <= 0.0 {
            return Err(SamplingError::InvalidDistribution {
                reason: format!("log-probabilities normalize to {sum}"),
            });
        }
        Self::new(exp.into_iter().map(|p| p / sum).collect())
    }

    /// Uniform distribution over `num_classes` classes.
    pub fn uniform(num_classes: usize) -> Self {
        let n = num_classes.max(1);
        Self(vec![1.0 / n as f64; n])
    }

    /// One-hot distribution.
    pub fn one_hot(num_classes: usize, class: usize) -> Self {
        let mut probs = vec![0.0; num_classes.max(class + 1)];
        probs[class] = 1.0;
        Self(probs)
    }

    pub fn num_classes(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Index of the most probable class (lowest index on ties).
    pub fn argmax(&self) -> usize {
        self.0
            .iter()
            .enumerate()
            .fold((0, f64::NEG_INFINITY), |best, (i, &p)| {
                if p > best.1 {
                    (i, p)
                } else {
                    best
                }
            })
            .0
    }
}

impl TryFrom<Vec<f64>> for PredictiveDistribution {
    type Error = SamplingError;

    fn try_from(probs: Vec<f64>) -> Result<Self, Self::Error> {
        Self::new(probs)
    }
}

impl From<PredictiveDistribution> for Vec<f64> {
    fn from(d: PredictiveDistribution) -> Self {
        d.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unnormalized() {
        assert!(PredictiveDistribution::new(vec![0.5, 0.6]).is_err());
    }

    #[test]
    fn rejects_negative() {
        assert!(PredictiveDistribution::new(vec![1.5, -0.5]).is_err());
    }

    #[test]
    fn accepts_within_tolerance() {
        assert!(PredictiveDistribution::new(vec![0.5, 0.50001]).is_ok());
    }

    #[test]
    fn log_probs_are_normalized() {
        let d = PredictiveDistribution::from_log_probs(&[0.0, 0.0, 0.0, 0.0]).unwrap();
        for p in d.as_slice() {
            assert!((p - 0.25).abs() < 1e-12);
        }
    }

    #[test]
    fn argmax_prefers_lowest_index_on_ties() {
        let d = PredictiveDistribution::new(vec![0.4, 0.4, 0.2]).unwrap();
        assert_eq!(d.argmax(), 0);
    }
}
