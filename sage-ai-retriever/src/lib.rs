//! sage-ai-retriever: the retrieval engine for a RAG pipeline
//!
//! This crate implements the core of the system: document ingestion,
//! vector index construction, persistence, and similarity search. The
//! embedding model itself lives behind the `sage-ai-embed` gateway; this
//! crate owns everything with real design decisions in it.
//!
//! ## Key Modules
//!
//! - **[`extract`]**: directory scanning and raw-text extraction for the
//!   supported document formats
//! - **[`index`]**: exact k-nearest-neighbor search over squared Euclidean
//!   distance, with checksummed binary persistence
//! - **[`corpus`]**: chunk texts positionally aligned with index entries
//! - **[`session`]**: the orchestrator - ingest, query, persist, restore
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sage_ai_retriever::session::{RetrievalSession, SessionConfig};
//! use sage_ai_embed::HashEmbedder;
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let session = RetrievalSession::new(
//!     Arc::new(HashEmbedder::new(384)),
//!     SessionConfig::default(),
//! );
//! session.ingest_directory(Path::new("corpus/")).await?;
//!
//! for (chunk, distance) in session.query("What color is the sky?", 3).await? {
//!     println!("{distance:.3}  {chunk}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Data Flow
//!
//! ```text
//! files → extracted text → chunks → embeddings → index + corpus   (ingestion)
//! query text → query embedding → nearest positions → chunk texts  (per request)
//! ```

pub mod corpus;
pub mod error;
pub mod extract;
pub mod index;
pub mod session;

pub use corpus::CorpusStore;
pub use error::{Result, RetrieverError};
pub use extract::DocumentFormat;
pub use index::{SearchHit, VectorIndex};
pub use session::{RetrievalSession, SessionConfig};
