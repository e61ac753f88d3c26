use serde::{Deserialize, Serialize};

use super::defaults;

/// Architecture selector for one external model component (encoder,
/// decoder, bottleneck, classifier). Only `z_dim` is checked here; the rest
/// is consumed by the collaborators.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ComponentConfig {
    pub name: Option<String>,
    pub z_dim: Option<usize>,
}

/// Embedding model settings, consumed by the external provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Whether the embedding model is trained alongside the classifier.
    pub train_vae: bool,
    /// Pretrained checkpoint to load before round 0.
    pub pretrained_path: Option<String>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            train_vae: defaults::DEFAULT_TRAIN_VAE,
            pretrained_path: None,
        }
    }
}
