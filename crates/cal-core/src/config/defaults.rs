// Single source of truth for all default values.

// --- Experiment ---
pub const DEFAULT_EXPERIMENT_NAME: &str = "cal";
pub const DEFAULT_UPDATE_RATIO: f64 = 0.05;
pub const DEFAULT_N_RUNS: usize = 5;
pub const DEFAULT_SEED: u64 = 0;

// --- Dataset ---
pub const DEFAULT_DATASET_NAME: &str = "mnist";
pub const DEFAULT_INIT_LBL_RATIO: f64 = 0.1;
pub const DEFAULT_VAL_RATIO: f64 = 0.1;

// --- Sampler ---
pub const DEFAULT_SAMPLER: &str = "cal";
pub const DEFAULT_N_NEIGHS: usize = 10;
pub const DEFAULT_NEIGH_DIST: &str = "l2";
pub const DEFAULT_SCORE: &str = "neighborhood_kl";
pub const DEFAULT_N_PCA_COMP: usize = 8;
pub const DEFAULT_OPTIMIZER: &str = "adam";
pub const DEFAULT_LR: f64 = 5e-4;
pub const DEFAULT_N_SUB_EPOCHS: usize = 10;
pub const DEFAULT_HIDDEN_DIM: usize = 512;

// --- Embedding ---
pub const DEFAULT_TRAIN_VAE: bool = true;

// --- Observability ---
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_JSON_LOGS: bool = false;
