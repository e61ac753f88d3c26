//! Top-level experiment configuration with layered resolution.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{
    defaults, ComponentConfig, DatasetConfig, EmbeddingConfig, ObservabilityConfig,
    SamplerConfig, SamplerSpec,
};
use crate::errors::ConfigError;

/// One seed or a list of seeds. One orchestration runs per seed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SeedSpec {
    One(u64),
    Many(Vec<u64>),
}

impl SeedSpec {
    pub fn seeds(&self) -> Vec<u64> {
        match self {
            Self::One(seed) => vec![*seed],
            Self::Many(seeds) => seeds.clone(),
        }
    }
}

impl Default for SeedSpec {
    fn default() -> Self {
        Self::One(defaults::DEFAULT_SEED)
    }
}

/// Configuration of one active-learning experiment.
///
/// Resolution order (highest priority first):
/// 1. Environment variables (`CAL_*`)
/// 2. Config file
/// 3. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    pub experiment_name: String,
    /// Fraction of the whole dataset acquired per round.
    pub update_ratio: f64,
    /// Total rounds including round 0.
    pub n_runs: usize,
    pub seed: SeedSpec,
    /// Latent dimension shared by the embedding model and the vaal sampler.
    pub z_dim: Option<usize>,
    pub dataset: DatasetConfig,
    pub smp: SamplerConfig,
    pub enc: ComponentConfig,
    pub dec: ComponentConfig,
    pub btk: ComponentConfig,
    pub cls: ComponentConfig,
    pub embedding: EmbeddingConfig,
    pub observability: ObservabilityConfig,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            experiment_name: defaults::DEFAULT_EXPERIMENT_NAME.to_string(),
            update_ratio: defaults::DEFAULT_UPDATE_RATIO,
            n_runs: defaults::DEFAULT_N_RUNS,
            seed: SeedSpec::default(),
            z_dim: None,
            dataset: DatasetConfig::default(),
            smp: SamplerConfig::default(),
            enc: ComponentConfig::default(),
            dec: ComponentConfig::default(),
            btk: ComponentConfig::default(),
            cls: ComponentConfig::default(),
            embedding: EmbeddingConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl ExperimentConfig {
    /// Load with layered resolution: file (if given), then `CAL_*`
    /// environment overrides, then validation.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML file. Does not validate.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Parse a TOML string. Does not validate.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })
    }

    /// Apply `CAL_*` environment variables.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    ///
    /// Recognized keys: `CAL_N_RUNS`, `CAL_SEED` (comma-separated),
    /// `CAL_UPDATE_RATIO`, `CAL_SMP_NAME`, `CAL_LOG_LEVEL`.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("CAL_N_RUNS") {
            self.n_runs = parse_env("CAL_N_RUNS", &val)?;
        }
        if let Some(val) = lookup("CAL_SEED") {
            let seeds = val
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| parse_env::<u64>("CAL_SEED", s))
                .collect::<Result<Vec<_>, _>>()?;
            self.seed = match seeds.as_slice() {
                [single] => SeedSpec::One(*single),
                _ => SeedSpec::Many(seeds),
            };
        }
        if let Some(val) = lookup("CAL_UPDATE_RATIO") {
            self.update_ratio = parse_env("CAL_UPDATE_RATIO", &val)?;
        }
        if let Some(val) = lookup("CAL_SMP_NAME") {
            self.smp.name = val;
        }
        if let Some(val) = lookup("CAL_LOG_LEVEL") {
            self.observability.log_level = val;
        }
        Ok(())
    }

    /// Validate ratios, run count, seeds, sampler, and latent dimensions.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_ratio("update_ratio", self.update_ratio)?;
        check_split_ratios(self.dataset.init_lbl_ratio, self.dataset.val_ratio)?;
        if self.n_runs == 0 {
            return Err(ConfigError::ValidationFailed {
                field: "n_runs".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.seeds().is_empty() {
            return Err(ConfigError::ValidationFailed {
                field: "seed".to_string(),
                message: "at least one seed is required".to_string(),
            });
        }
        self.sampler_spec()?;
        self.check_latent_dims()
    }

    pub fn seeds(&self) -> Vec<u64> {
        self.seed.seeds()
    }

    pub fn sampler_spec(&self) -> Result<SamplerSpec, ConfigError> {
        self.smp.resolve()
    }

    /// Update rounds that follow round 0.
    pub fn updates_required(&self) -> usize {
        self.n_runs.saturating_sub(1)
    }

    /// Acquisition size per round: `round(update_ratio * dataset_size)`.
    pub fn batch_size(&self, dataset_size: usize) -> usize {
        (self.update_ratio * dataset_size as f64).round() as usize
    }

    /// Check against the width an embedding provider actually produces: the
    /// declared latent dimension must match it, and cal_pca cannot keep more
    /// components than it has.
    pub fn check_embedding_dim(&self, provider: &str, dim: usize) -> Result<(), ConfigError> {
        if let Some(expected) = self.latent_dim() {
            if expected != dim {
                return Err(ConfigError::LatentDimMismatch {
                    component: format!("embedding provider {provider}"),
                    expected,
                    actual: dim,
                });
            }
        }
        if let SamplerSpec::CalPca { n_components, .. } = self.sampler_spec()? {
            if n_components > dim {
                return Err(ConfigError::ValidationFailed {
                    field: "smp.n_pca_comp".to_string(),
                    message: format!("{n_components} components exceed embedding dimension {dim}"),
                });
            }
        }
        Ok(())
    }

    /// `z_dim`, or else the first latent dimension any section declares.
    pub fn latent_dim(&self) -> Option<usize> {
        self.z_dim
            .or_else(|| self.declared_latent_dims().iter().find_map(|(_, dim)| *dim))
    }

    fn declared_latent_dims(&self) -> [(&'static str, Option<usize>); 5] {
        [
            ("enc.z_dim", self.enc.z_dim),
            ("dec.z_dim", self.dec.z_dim),
            ("btk.z_dim", self.btk.z_dim),
            ("cls.z_dim", self.cls.z_dim),
            ("smp.latent_dim", self.smp.latent_dim),
        ]
    }

    /// Every declared latent dimension must agree with `z_dim` (or, without
    /// `z_dim`, with the first declared one).
    fn check_latent_dims(&self) -> Result<(), ConfigError> {
        let Some(expected) = self.latent_dim() else {
            return Ok(());
        };
        for (component, dim) in self.declared_latent_dims() {
            if let Some(actual) = dim {
                if actual != expected {
                    return Err(ConfigError::LatentDimMismatch {
                        component: component.to_string(),
                        expected,
                        actual,
                    });
                }
            }
        }
        Ok(())
    }
}

/// A ratio must be finite and within `[0, 1]`.
pub fn check_ratio(field: &str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::InvalidRatio {
            field: field.to_string(),
            value,
        });
    }
    Ok(())
}

/// Both split ratios valid and together at most 1.
pub fn check_split_ratios(init_lbl_ratio: f64, val_ratio: f64) -> Result<(), ConfigError> {
    check_ratio("dataset.init_lbl_ratio", init_lbl_ratio)?;
    check_ratio("dataset.val_ratio", val_ratio)?;
    if init_lbl_ratio + val_ratio > 1.0 {
        return Err(ConfigError::RatioOverflow {
            init_lbl_ratio,
            val_ratio,
        });
    }
    Ok(())
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::ValidationFailed {
        field: key.to_string(),
        message: e.to_string(),
    })
}
