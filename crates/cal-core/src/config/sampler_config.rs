use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::defaults;
use crate::errors::ConfigError;

/// Raw `[smp]` table. Holds the union of every sampler's options; only the
/// ones belonging to `name` survive [`SamplerConfig::resolve`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Strategy: "random", "cal", "cal_pca", "vaal".
    pub name: String,
    /// Neighbor count for CAL.
    pub n_neighs: usize,
    /// Neighbor distance: "l2", "cosine", "kldiv", "sym_kldiv".
    pub neigh_dist: String,
    /// CAL score: "neighborhood_kl" or "mean_neighbor_kl".
    pub score: String,
    /// Reduced dimensionality for cal_pca.
    pub n_pca_comp: usize,
    /// Discriminator optimizer for vaal: "adam" or "sgd".
    pub optimizer: String,
    /// Discriminator learning rate.
    pub lr: f64,
    /// Discriminator training epochs per round.
    pub n_sub_epochs: usize,
    /// Discriminator input width. Must equal `z_dim` when both are set.
    pub latent_dim: Option<usize>,
    /// Width of both discriminator hidden layers.
    pub hidden_dim: usize,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            name: defaults::DEFAULT_SAMPLER.to_string(),
            n_neighs: defaults::DEFAULT_N_NEIGHS,
            neigh_dist: defaults::DEFAULT_NEIGH_DIST.to_string(),
            score: defaults::DEFAULT_SCORE.to_string(),
            n_pca_comp: defaults::DEFAULT_N_PCA_COMP,
            optimizer: defaults::DEFAULT_OPTIMIZER.to_string(),
            lr: defaults::DEFAULT_LR,
            n_sub_epochs: defaults::DEFAULT_N_SUB_EPOCHS,
            latent_dim: None,
            hidden_dim: defaults::DEFAULT_HIDDEN_DIM,
        }
    }
}

/// Distance used to find a sample's nearest labeled neighbors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NeighborMetricKind {
    #[default]
    #[serde(rename = "l2")]
    L2,
    #[serde(rename = "cosine")]
    Cosine,
    /// KL divergence between diagonal Gaussian latent codes.
    #[serde(rename = "kldiv")]
    GaussianKl,
    /// Symmetrized Gaussian KL divergence.
    #[serde(rename = "sym_kldiv")]
    SymmetricGaussianKl,
}

impl NeighborMetricKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::L2 => "l2",
            Self::Cosine => "cosine",
            Self::GaussianKl => "kldiv",
            Self::SymmetricGaussianKl => "sym_kldiv",
        }
    }

    /// Whether the metric reads log-variances.
    pub fn needs_variance(&self) -> bool {
        matches!(self, Self::GaussianKl | Self::SymmetricGaussianKl)
    }
}

impl FromStr for NeighborMetricKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "l2" | "euclidean" => Ok(Self::L2),
            "cosine" => Ok(Self::Cosine),
            "kldiv" => Ok(Self::GaussianKl),
            "sym_kldiv" => Ok(Self::SymmetricGaussianKl),
            _ => Err(ConfigError::UnknownOption {
                field: "smp.neigh_dist".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// How a CAL score is formed from a sample and its neighborhood.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreMode {
    /// `KL(P_u || mean_n P_n)`.
    #[default]
    NeighborhoodKl,
    /// `mean_n KL(P_n || P_u)`.
    MeanNeighborKl,
}

impl FromStr for ScoreMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "neighborhood_kl" => Ok(Self::NeighborhoodKl),
            "mean_neighbor_kl" => Ok(Self::MeanNeighborKl),
            _ => Err(ConfigError::UnknownOption {
                field: "smp.score".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptimizerKind {
    Sgd,
    Adam,
}

impl FromStr for OptimizerKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sgd" => Ok(Self::Sgd),
            "adam" => Ok(Self::Adam),
            _ => Err(ConfigError::UnknownOption {
                field: "smp.optimizer".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// A resolved sampler: the method plus only its own hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum SamplerSpec {
    Random,
    Cal {
        n_neighs: usize,
        metric: NeighborMetricKind,
        score: ScoreMode,
    },
    CalPca {
        n_neighs: usize,
        metric: NeighborMetricKind,
        score: ScoreMode,
        n_components: usize,
    },
    Vaal {
        latent_dim: Option<usize>,
        hidden_dim: usize,
        optimizer: OptimizerKind,
        lr: f64,
        n_sub_epochs: usize,
    },
}

impl SamplerSpec {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Random => "random",
            Self::Cal { .. } => "cal",
            Self::CalPca { .. } => "cal_pca",
            Self::Vaal { .. } => "vaal",
        }
    }
}

impl SamplerConfig {
    /// Resolve the raw table into a [`SamplerSpec`], validating the options
    /// the chosen method reads.
    pub fn resolve(&self) -> Result<SamplerSpec, ConfigError> {
        match self.name.to_lowercase().as_str() {
            "random" => Ok(SamplerSpec::Random),
            "cal" => Ok(SamplerSpec::Cal {
                n_neighs: self.neighbor_count()?,
                metric: self.neigh_dist.parse()?,
                score: self.score.parse()?,
            }),
            "cal_pca" => {
                let metric: NeighborMetricKind = self.neigh_dist.parse()?;
                if metric.needs_variance() {
                    return Err(ConfigError::ValidationFailed {
                        field: "smp.neigh_dist".to_string(),
                        message: format!(
                            "{} needs log-variances, which do not survive projection",
                            metric.as_str()
                        ),
                    });
                }
                if self.n_pca_comp == 0 {
                    return Err(ConfigError::ValidationFailed {
                        field: "smp.n_pca_comp".to_string(),
                        message: "must be greater than 0".to_string(),
                    });
                }
                Ok(SamplerSpec::CalPca {
                    n_neighs: self.neighbor_count()?,
                    metric,
                    score: self.score.parse()?,
                    n_components: self.n_pca_comp,
                })
            }
            "vaal" => {
                if !(self.lr.is_finite() && self.lr > 0.0) {
                    return Err(ConfigError::ValidationFailed {
                        field: "smp.lr".to_string(),
                        message: "must be a positive number".to_string(),
                    });
                }
                if self.hidden_dim == 0 {
                    return Err(ConfigError::ValidationFailed {
                        field: "smp.hidden_dim".to_string(),
                        message: "must be greater than 0".to_string(),
                    });
                }
                Ok(SamplerSpec::Vaal {
                    latent_dim: self.latent_dim,
                    hidden_dim: self.hidden_dim,
                    optimizer: self.optimizer.parse()?,
                    lr: self.lr,
                    n_sub_epochs: self.n_sub_epochs,
                })
            }
            other => Err(ConfigError::UnknownSampler {
                name: other.to_string(),
            }),
        }
    }

    fn neighbor_count(&self) -> Result<usize, ConfigError> {
        if self.n_neighs == 0 {
            return Err(ConfigError::ValidationFailed {
                field: "smp.n_neighs".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        Ok(self.n_neighs)
    }
}
