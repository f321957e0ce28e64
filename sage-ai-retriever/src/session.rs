//! Retrieval session: the orchestrator tying extraction, chunking,
//! embedding, and search together.
//!
//! A session holds at most one (vector index, corpus store) pair behind a
//! single read-write lock, so readers always see both halves from the same
//! generation. Ingestion builds the complete new state outside the lock and
//! swaps it in atomically; a failed ingest leaves the previous state
//! untouched. Queries and persistence share read access and can run
//! concurrently with each other, never with the swap.

use crate::corpus::CorpusStore;
use crate::error::{Result, RetrieverError};
use crate::extract::{extract_text, scan_documents};
use crate::index::VectorIndex;
use sage_ai_chunk::{ChunkConfig, SentenceChunker};
use sage_ai_embed::EmbeddingProvider;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

/// File suffixes for the paired persistence artifacts.
const INDEX_SUFFIX: &str = ".index";
const CORPUS_SUFFIX: &str = ".corpus.json";

/// Configuration for a retrieval session.
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    /// Chunking configuration applied to every ingested document
    pub chunk_config: ChunkConfig,
}

impl SessionConfig {
    pub fn with_chunk_config(mut self, chunk_config: ChunkConfig) -> Self {
        self.chunk_config = chunk_config;
        self
    }
}

/// One complete generation of session state.
///
/// Index and corpus are always the same length; the pair is built together
/// and swapped together.
struct SessionState {
    index: VectorIndex,
    corpus: CorpusStore,
}

/// Process-scoped retrieval state: one index/corpus pair, one embedding
/// provider, queried any number of times.
pub struct RetrievalSession {
    provider: Arc<dyn EmbeddingProvider>,
    chunker: SentenceChunker,
    state: RwLock<Option<SessionState>>,
}

impl RetrievalSession {
    /// Create an empty session. A query before [`ingest`](Self::ingest) or
    /// [`restore`](Self::restore) fails with `SessionNotReady`.
    ///
    /// # Panics
    ///
    /// Panics if the chunk configuration is invalid (`max_tokens == 0` or
    /// `overlap >= max_tokens`).
    pub fn new(provider: Arc<dyn EmbeddingProvider>, config: SessionConfig) -> Self {
        Self {
            provider,
            chunker: SentenceChunker::new(config.chunk_config),
            state: RwLock::new(None),
        }
    }

    /// Whether the session currently holds a queryable index/corpus pair.
    pub async fn is_ready(&self) -> bool {
        self.state.read().await.is_some()
    }

    /// Number of chunks in the current generation, or 0 when empty.
    pub async fn len(&self) -> usize {
        self.state
            .read()
            .await
            .as_ref()
            .map(|s| s.corpus.len())
            .unwrap_or(0)
    }

    /// Ingest an ordered sequence of `(identifier, raw text)` documents.
    ///
    /// Every document is chunked, the chunks are flattened in document
    /// order, embedded in one batched call, and the resulting index/corpus
    /// pair replaces any previous state atomically. On failure the previous
    /// state is left untouched.
    pub async fn ingest(&self, documents: &[(String, String)]) -> Result<usize> {
        let mut texts: Vec<String> = Vec::new();
        for (identifier, raw_text) in documents {
            let chunks = self.chunker.chunk_document(identifier, raw_text);
            tracing::debug!("Chunked {} into {} chunks", identifier, chunks.len());
            texts.extend(chunks.into_iter().map(|c| c.text));
        }

        if texts.is_empty() {
            return Err(RetrieverError::empty_input(
                "ingest",
                "no chunks were produced from the given documents",
            ));
        }

        let result = self.provider.embed_texts(&texts).await?;
        tracing::debug!(
            "Embedded {} chunks at dimension {}",
            result.len(),
            result.dimension
        );

        let index = VectorIndex::build(result.embeddings)?;
        let corpus = CorpusStore::new(texts);
        debug_assert_eq!(index.len(), corpus.len());

        let count = corpus.len();
        *self.state.write().await = Some(SessionState { index, corpus });
        tracing::info!("Ingested {} documents into {} chunks", documents.len(), count);
        Ok(count)
    }

    /// Ingest every supported document under a directory tree.
    ///
    /// Files with unsupported extensions are skipped silently; extraction
    /// failures on individual files are logged and skipped so one bad file
    /// never aborts the whole corpus.
    pub async fn ingest_directory(&self, root: &Path) -> Result<usize> {
        let mut documents = Vec::new();

        for (path, format) in scan_documents(root) {
            match extract_text(&path, format).await {
                Ok(text) => {
                    let identifier = path
                        .strip_prefix(root)
                        .unwrap_or(&path)
                        .to_string_lossy()
                        .to_string();
                    documents.push((identifier, text));
                }
                Err(e) => {
                    tracing::warn!("Skipping {}: {e}", path.display());
                }
            }
        }

        if documents.is_empty() {
            return Err(RetrieverError::empty_input(
                "ingest",
                format!("no readable documents found under {}", root.display()),
            ));
        }

        self.ingest(&documents).await
    }

    /// Retrieve the `k` chunks nearest to the query text.
    ///
    /// Returns `(chunk text, squared Euclidean distance)` pairs, ascending
    /// by distance. Fails with `SessionNotReady` if nothing has been
    /// ingested or restored.
    pub async fn query(&self, text: &str, k: usize) -> Result<Vec<(String, f32)>> {
        let guard = self.state.read().await;
        let state = guard.as_ref().ok_or(RetrieverError::SessionNotReady)?;

        let query_embedding = self.provider.embed_text(text).await?;
        let hits = state.index.search(&query_embedding, k)?;

        hits.into_iter()
            .map(|hit| {
                let text = state.corpus.get(hit.position).ok_or_else(|| {
                    RetrieverError::corruption(format!(
                        "index position {} has no corpus entry",
                        hit.position
                    ))
                })?;
                Ok((text.to_string(), hit.distance))
            })
            .collect()
    }

    /// Persist the current state as a pair of artifacts:
    /// `<base>.index` and `<base>.corpus.json`.
    pub async fn persist(&self, base: &Path) -> Result<()> {
        let guard = self.state.read().await;
        let state = guard.as_ref().ok_or(RetrieverError::SessionNotReady)?;

        if let Some(parent) = base.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        tokio::fs::write(artifact_path(base, INDEX_SUFFIX), state.index.serialize()).await?;
        tokio::fs::write(artifact_path(base, CORPUS_SUFFIX), state.corpus.to_json()?).await?;

        tracing::info!(
            "Persisted {} chunks to {}{{{},{}}}",
            state.corpus.len(),
            base.display(),
            INDEX_SUFFIX,
            CORPUS_SUFFIX
        );
        Ok(())
    }

    /// Restore a persisted index/corpus pair, replacing any current state.
    ///
    /// Both artifacts must be present and mutually consistent: a missing
    /// half or a length mismatch aborts the load with
    /// `PersistenceCorruption` rather than installing a misaligned session.
    pub async fn restore(&self, base: &Path) -> Result<usize> {
        let index_path = artifact_path(base, INDEX_SUFFIX);
        let corpus_path = artifact_path(base, CORPUS_SUFFIX);

        match (index_path.exists(), corpus_path.exists()) {
            (true, true) => {}
            (false, false) => {
                return Err(RetrieverError::corruption(format!(
                    "no artifacts found at base {}",
                    base.display()
                )));
            }
            (true, false) | (false, true) => {
                return Err(RetrieverError::corruption(format!(
                    "paired artifact missing: {} and {} must be loaded together",
                    index_path.display(),
                    corpus_path.display()
                )));
            }
        }

        let index = VectorIndex::deserialize(&tokio::fs::read(&index_path).await?)?;
        let corpus = CorpusStore::from_json(&tokio::fs::read_to_string(&corpus_path).await?)?;

        if index.len() != corpus.len() {
            return Err(RetrieverError::corruption(format!(
                "index holds {} vectors but corpus holds {} texts",
                index.len(),
                corpus.len()
            )));
        }

        let count = corpus.len();
        *self.state.write().await = Some(SessionState { index, corpus });
        tracing::info!("Restored {} chunks from {}", count, base.display());
        Ok(count)
    }
}

fn artifact_path(base: &Path, suffix: &str) -> PathBuf {
    let mut os_string = base.as_os_str().to_os_string();
    os_string.push(suffix);
    PathBuf::from(os_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sage_ai_embed::HashEmbedder;

    fn session() -> RetrievalSession {
        RetrievalSession::new(
            Arc::new(HashEmbedder::new(256)),
            SessionConfig::default()
                .with_chunk_config(ChunkConfig::default().with_max_tokens(50).with_overlap(0)),
        )
    }

    #[tokio::test]
    async fn test_query_before_ingest_fails() {
        let session = session();
        let err = session.query("anything", 1).await.unwrap_err();
        assert!(matches!(err, RetrieverError::SessionNotReady));
    }

    #[tokio::test]
    async fn test_ingest_of_empty_documents_fails_and_keeps_state() -> anyhow::Result<()> {
        let session = session();
        session
            .ingest(&[("doc".to_string(), "The sky is blue.".to_string())])
            .await?;

        let err = session.ingest(&[]).await.unwrap_err();
        assert!(matches!(err, RetrieverError::EmptyInput { .. }));

        // The earlier generation is still queryable.
        assert!(session.is_ready().await);
        assert_eq!(session.query("sky", 1).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_artifact_path_appends_suffix() {
        let path = artifact_path(Path::new("store/run1"), INDEX_SUFFIX);
        assert_eq!(path, PathBuf::from("store/run1.index"));
    }
}
