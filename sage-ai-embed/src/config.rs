//! Configuration for embedding models

use serde::{Deserialize, Serialize};

/// Configuration for the fastembed-backed embedding provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedConfig {
    /// Name of the embedding model to use
    pub model_name: String,
    /// Maximum batch size for embedding generation
    pub batch_size: usize,
    /// Whether to L2-normalize embeddings after generation
    pub normalize: bool,
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self {
            model_name: "all-MiniLM-L6-v2".to_string(),
            batch_size: 32,
            normalize: true,
        }
    }
}

impl EmbedConfig {
    /// Create a configuration for a named built-in model.
    pub fn new<S: Into<String>>(model_name: S) -> Self {
        Self {
            model_name: model_name.into(),
            ..Self::default()
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EmbedConfig::default();
        assert_eq!(config.model_name, "all-MiniLM-L6-v2");
        assert_eq!(config.batch_size, 32);
        assert!(config.normalize);
    }

    #[test]
    fn test_builder_methods() {
        let config = EmbedConfig::new("bge-small-en-v1.5")
            .with_batch_size(8)
            .with_normalize(false);
        assert_eq!(config.model_name, "bge-small-en-v1.5");
        assert_eq!(config.batch_size, 8);
        assert!(!config.normalize);
    }
}
