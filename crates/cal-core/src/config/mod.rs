pub mod dataset_config;
pub mod defaults;
pub mod experiment_config;
pub mod model_config;
pub mod observability_config;
pub mod sampler_config;

pub use dataset_config::DatasetConfig;
pub use experiment_config::{check_ratio, check_split_ratios, ExperimentConfig, SeedSpec};
pub use model_config::{ComponentConfig, EmbeddingConfig};
pub use observability_config::ObservabilityConfig;
pub use sampler_config::{
    NeighborMetricKind, OptimizerKind, SamplerConfig, SamplerSpec, ScoreMode,
};
