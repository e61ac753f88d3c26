use super::error_code::{self, CalErrorCode};

/// Configuration errors. Detected before any round runs.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    #[error("failed to parse {path}: {message}")]
    ParseError { path: String, message: String },

    #[error("invalid ratio {field} = {value}: must be finite and within [0, 1]")]
    InvalidRatio { field: String, value: f64 },

    #[error("init_lbl_ratio {init_lbl_ratio} + val_ratio {val_ratio} exceeds 1")]
    RatioOverflow { init_lbl_ratio: f64, val_ratio: f64 },

    #[error("unlabeled pool is empty ({total} samples) but {updates} update rounds are required")]
    EmptyUnlabeled { total: usize, updates: usize },

    #[error("duplicate sample index {index} in dataset")]
    DuplicateIndex { index: usize },

    #[error("unknown sampler: {name}")]
    UnknownSampler { name: String },

    #[error("unknown {field}: {value}")]
    UnknownOption { field: String, value: String },

    #[error("latent dimension mismatch: {component} declares {actual}, z_dim is {expected}")]
    LatentDimMismatch {
        component: String,
        expected: usize,
        actual: usize,
    },

    #[error("validation failed for {field}: {message}")]
    ValidationFailed { field: String, message: String },
}

impl CalErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownSampler { .. } => error_code::UNKNOWN_SAMPLER,
            _ => error_code::CONFIG_ERROR,
        }
    }
}
