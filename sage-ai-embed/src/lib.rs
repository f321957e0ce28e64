//! # sage-ai-embed
//!
//! The embedding gateway: a thin async adapter over external embedding
//! models, normalizing their output into fixed-dimension `f32` vectors.
//!
//! The rest of the system talks only to the [`EmbeddingProvider`] trait:
//! `embed_texts` maps an ordered batch of strings to an equally long,
//! equally ordered batch of vectors, all of one dimensionality. Two
//! implementations ship here:
//!
//! - [`FastEmbedProvider`]: local ONNX models via fastembed, loaded in a
//!   blocking task and shared behind a mutex.
//! - [`HashEmbedder`]: a deterministic token-hashing provider with no model
//!   files, for tests and offline runs.
//!
//! ## Quick Start
//!
//! ```no_run
//! use sage_ai_embed::{EmbedConfig, EmbeddingProvider, FastEmbedProvider};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let provider = FastEmbedProvider::create(EmbedConfig::default()).await?;
//!
//! let texts = vec!["Hello world".to_string(), "How are you?".to_string()];
//! let result = provider.embed_texts(&texts).await?;
//!
//! println!("Generated {} embeddings of dimension {}", result.len(), result.dimension);
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! All operations return [`Result<T>`] using the crate's [`EmbedError`]
//! type, covering configuration errors, model loading issues, and runtime
//! failures.

pub mod config;
pub mod error;
pub mod offline;
pub mod provider;

// Re-export main types for easy access
pub use config::EmbedConfig;
pub use error::{EmbedError, Result};
pub use offline::HashEmbedder;
pub use provider::{EmbeddingProvider, EmbeddingResult, FastEmbedProvider};
