//! Span definitions per operation: experiment, round, training, sampling.

/// Create an experiment span covering every seed.
#[macro_export]
macro_rules! experiment_span {
    ($name:expr, $n_seeds:expr) => {
        tracing::info_span!("cal.experiment", name = %$name, n_seeds = $n_seeds)
    };
}

/// Create a span for one round of one seed.
#[macro_export]
macro_rules! round_span {
    ($seed:expr, $round:expr) => {
        tracing::info_span!("cal.round", seed = $seed, round = $round)
    };
}

/// Create a classifier training span.
#[macro_export]
macro_rules! training_span {
    ($round:expr, $labeled:expr) => {
        tracing::info_span!("cal.training", round = $round, labeled = $labeled)
    };
}

/// Create a sampling span.
#[macro_export]
macro_rules! sampling_span {
    ($sampler:expr, $batch_size:expr) => {
        tracing::info_span!("cal.sampling", sampler = %$sampler, batch_size = $batch_size)
    };
}

/// Span names as constants for programmatic use.
pub mod names {
    pub const EXPERIMENT: &str = "cal.experiment";
    pub const ROUND: &str = "cal.round";
    pub const TRAINING: &str = "cal.training";
    pub const SAMPLING: &str = "cal.sampling";
}
