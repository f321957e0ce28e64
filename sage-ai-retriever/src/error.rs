//! Error types for the retrieval engine

use std::path::PathBuf;

/// Result type for retrieval operations.
pub type Result<T> = std::result::Result<T, RetrieverError>;

/// Error type for all retrieval operations.
///
/// Variants name the operation and the precondition that was violated, so
/// user-visible failures never surface a raw internal fault. Per-file
/// extraction problems during ingestion are recovered locally (logged and
/// skipped) rather than surfaced through this type; index and search errors
/// abort the operation they are part of.
#[derive(Debug, thiserror::Error)]
pub enum RetrieverError {
    /// Vector dimensionality disagrees with the index
    #[error("{operation}: vector dimension mismatch, expected {expected} but got {actual}")]
    DimensionMismatch {
        operation: &'static str,
        expected: usize,
        actual: usize,
    },

    /// An operation was handed nothing to work on
    #[error("{operation}: {message}")]
    EmptyInput {
        operation: &'static str,
        message: String,
    },

    /// Search against an index holding zero vectors
    #[error("search: the index holds zero vectors")]
    EmptyIndex,

    /// Query issued before any ingest or restore
    #[error("query: session is not ready, ingest or restore a corpus first")]
    SessionNotReady,

    /// A document format the extractor cannot decode
    #[error("extract: unsupported format for {path}: {message}")]
    UnsupportedFormat { path: PathBuf, message: String },

    /// Persisted artifacts are missing, corrupt, or mutually inconsistent
    #[error("restore: persisted artifacts are corrupt: {message}")]
    PersistenceCorruption { message: String },

    /// IO errors reading or writing artifacts and documents
    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// Errors from the embedding gateway
    #[error("embedding error: {source}")]
    Embedding {
        #[from]
        source: sage_ai_embed::EmbedError,
    },

    /// JSON (de)serialization errors for the corpus artifact
    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
}

impl RetrieverError {
    /// Create an empty-input error naming the violated operation.
    pub fn empty_input<S: Into<String>>(operation: &'static str, message: S) -> Self {
        Self::EmptyInput {
            operation,
            message: message.into(),
        }
    }

    /// Create a persistence corruption error with a custom message.
    pub fn corruption<S: Into<String>>(message: S) -> Self {
        Self::PersistenceCorruption {
            message: message.into(),
        }
    }
}
