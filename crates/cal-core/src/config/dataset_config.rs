use serde::{Deserialize, Serialize};

use super::defaults;

/// Dataset partition sizing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// Dataset name, passed through to the external loader.
    pub name: String,
    /// Fraction of the dataset labeled before round 0.
    pub init_lbl_ratio: f64,
    /// Fraction of the dataset held out for validation.
    pub val_ratio: f64,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            name: defaults::DEFAULT_DATASET_NAME.to_string(),
            init_lbl_ratio: defaults::DEFAULT_INIT_LBL_RATIO,
            val_ratio: defaults::DEFAULT_VAL_RATIO,
        }
    }
}
