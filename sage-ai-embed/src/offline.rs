//! Deterministic offline embedding provider.
//!
//! [`HashEmbedder`] maps each text to a fixed-dimension bag-of-words vector
//! by hashing tokens into buckets, then L2-normalizes the result. It has no
//! semantic understanding, but it is fully deterministic and needs no model
//! files, which makes the whole retrieval path testable and usable offline:
//! texts sharing more tokens land closer together under Euclidean distance.

use crate::error::Result;
use crate::provider::{EmbeddingProvider, EmbeddingResult};
use async_trait::async_trait;
use fnv::FnvHasher;
use std::hash::Hasher;

/// Token-hashing embedding provider for tests and offline runs.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    /// Create a hashing embedder producing vectors of the given dimension.
    pub fn new(dimension: usize) -> Self {
        assert!(dimension > 0, "embedding dimension must be > 0");
        Self { dimension }
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];

        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let token = token.to_lowercase();
            let mut hasher = FnvHasher::default();
            hasher.write(token.as_bytes());
            let bucket = (hasher.finish() % self.dimension as u64) as usize;
            vector[bucket] += 1.0;
        }

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in &mut vector {
                *value /= norm;
            }
        }

        vector
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbedder {
    async fn embed_text(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.embed_one(text))
    }

    async fn embed_texts(&self, texts: &[String]) -> Result<EmbeddingResult> {
        let embeddings = texts.iter().map(|t| self.embed_one(t)).collect();
        Ok(EmbeddingResult::new(embeddings))
    }

    fn embedding_dimension(&self) -> usize {
        self.dimension
    }

    fn provider_name(&self) -> &str {
        "hash"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_deterministic() -> Result<()> {
        let embedder = HashEmbedder::new(64);
        let a = embedder.embed_text("The sky is blue.").await?;
        let b = embedder.embed_text("The sky is blue.").await?;
        assert_eq!(a, b);
        Ok(())
    }

    #[tokio::test]
    async fn test_dimension_and_norm() -> Result<()> {
        let embedder = HashEmbedder::new(128);
        let v = embedder.embed_text("some words to hash").await?;
        assert_eq!(v.len(), 128);

        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
        Ok(())
    }

    #[tokio::test]
    async fn test_batch_preserves_order() -> Result<()> {
        let embedder = HashEmbedder::new(32);
        let texts = vec!["alpha".to_string(), "bravo".to_string()];
        let result = embedder.embed_texts(&texts).await?;

        assert_eq!(result.len(), 2);
        assert_eq!(result.dimension, 32);
        assert_eq!(result.embeddings[0], embedder.embed_text("alpha").await?);
        assert_eq!(result.embeddings[1], embedder.embed_text("bravo").await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_shared_tokens_are_closer() -> Result<()> {
        let embedder = HashEmbedder::new(256);
        let query = embedder.embed_text("What color is the sky?").await?;
        let sky = embedder.embed_text("The sky is blue.").await?;
        let grass = embedder.embed_text("The grass is green.").await?;

        let dist = |a: &[f32], b: &[f32]| -> f32 {
            a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
        };
        assert!(dist(&query, &sky) < dist(&query, &grass));
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_text_is_zero_vector() -> Result<()> {
        let embedder = HashEmbedder::new(16);
        let v = embedder.embed_text("").await?;
        assert!(v.iter().all(|x| *x == 0.0));
        Ok(())
    }
}
