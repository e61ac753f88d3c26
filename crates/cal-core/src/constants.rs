/// Workspace version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Additive smoothing applied to both distributions before a KL divergence.
pub const DEFAULT_SMOOTHING_EPSILON: f64 = 1e-10;

/// Maximum deviation of a predictive distribution's sum from 1.0.
pub const DISTRIBUTION_TOLERANCE: f64 = 1e-4;

/// Unlabeled pool size from which CAL scoring fans out over rayon.
pub const PARALLEL_SCORING_THRESHOLD: usize = 256;

/// Mini-batch size for discriminator training.
pub const DISCRIMINATOR_BATCH_SIZE: usize = 20;

/// RNG stream ids. Each consumer of a seed draws from its own stream so
/// adding draws in one place never shifts another.
pub const PARTITION_STREAM: u64 = 0;
pub const SAMPLER_STREAM: u64 = 1;
pub const DISCRIMINATOR_STREAM: u64 = 2;
