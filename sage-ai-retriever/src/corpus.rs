//! Corpus store: chunk texts positionally aligned with the vector index.
//!
//! Position `i` in the store corresponds to position `i` in the index. That
//! alignment is the central invariant of the whole system; the store itself
//! never reorders, and the session enforces equal lengths whenever the pair
//! is built or restored.

use crate::error::{Result, RetrieverError};

/// Ordered sequence of chunk texts, aligned 1:1 with index positions.
#[derive(Debug, Clone, Default)]
pub struct CorpusStore {
    texts: Vec<String>,
}

impl CorpusStore {
    /// Create a store from chunk texts in insertion order.
    pub fn new(texts: Vec<String>) -> Self {
        Self { texts }
    }

    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    /// Chunk text at the given index position.
    pub fn get(&self, position: usize) -> Option<&str> {
        self.texts.get(position).map(|s| s.as_str())
    }

    /// Serialize the store as a JSON array of strings.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.texts)?)
    }

    /// Reconstruct a store from its JSON artifact.
    pub fn from_json(json: &str) -> Result<Self> {
        let texts: Vec<String> = serde_json::from_str(json).map_err(|e| {
            RetrieverError::corruption(format!("corpus artifact is not a JSON string array: {e}"))
        })?;
        Ok(Self { texts })
    }
}
