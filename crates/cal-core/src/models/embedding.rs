use serde::{Deserialize, Serialize};

/// Latent code of one sample.
///
/// `mean` is the embedding proper. `log_var` is present when the encoder is
/// variational and lets Gaussian divergences be used as neighbor distances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embedding {
    pub mean: Vec<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_var: Option<Vec<f32>>,
}

impl Embedding {
    /// Point embedding without variance.
    pub fn new(mean: Vec<f32>) -> Self {
        Self {
            mean,
            log_var: None,
        }
    }

    /// Diagonal Gaussian embedding. `log_var` must match `mean` in length.
    pub fn gaussian(mean: Vec<f32>, log_var: Vec<f32>) -> Self {
        debug_assert_eq!(mean.len(), log_var.len());
        Self {
            mean,
            log_var: Some(log_var),
        }
    }

    pub fn dim(&self) -> usize {
        self.mean.len()
    }

    pub fn has_variance(&self) -> bool {
        self.log_var.is_some()
    }
}

impl From<Vec<f32>> for Embedding {
    fn from(mean: Vec<f32>) -> Self {
        Self::new(mean)
    }
}
