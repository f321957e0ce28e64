//! Sentence-aligned text chunking for retrieval models.
//!
//! This module turns raw document text into the retrieval units used by the
//! rest of the system: ordered, contiguous spans of sentences bounded by a
//! token budget, with a configurable number of sentences shared between
//! consecutive chunks so that context is not lost at chunk boundaries.
//!
//! The pipeline is:
//!
//! 1. [`split_sentences`] segments the text at sentence boundaries. The
//!    segmenter is rule-based and deterministic: identical input always
//!    produces identical sentences.
//! 2. A [`TokenCounter`] estimates the token cost of each sentence. The
//!    shipped [`WordTokenizer`] counts whitespace-separated words, which is a
//!    coarse but consistent approximation when the embedding model's own
//!    tokenizer is not available.
//! 3. [`SentenceChunker::chunk`] greedily packs sentences into chunks of at
//!    most `max_tokens` tokens, seeding each new chunk with the trailing
//!    `overlap` sentences of the previous one.
//!
//! Sentences are never split: a single sentence whose own token count exceeds
//! the budget becomes a chunk by itself rather than being truncated or
//! dropped.
//!
//! # Usage
//!
//! ```
//! use sage_ai_chunk::{ChunkConfig, SentenceChunker};
//!
//! let chunker = SentenceChunker::new(ChunkConfig::default().with_max_tokens(12).with_overlap(1));
//! let chunks = chunker.chunk("The sky is blue. The grass is green. Water is wet.");
//!
//! assert!(!chunks.is_empty());
//! for chunk in &chunks {
//!     assert!(chunk.split_whitespace().count() <= 12);
//! }
//! ```

use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

/// Sentence boundary pattern: everything up to and including a run of
/// terminators (plus any closing quotes/brackets) and trailing whitespace,
/// or a trailing fragment with no terminator at all.
static SENTENCE_BOUNDARY: OnceLock<Regex> = OnceLock::new();

fn sentence_boundary() -> &'static Regex {
    SENTENCE_BOUNDARY.get_or_init(|| {
        Regex::new(r#"(?s)[^.!?]*[.!?]+["')\]]*(?:\s+|\z)|[^.!?]+\z"#)
            .expect("sentence boundary pattern is valid")
    })
}

/// Split text into an ordered sequence of sentences.
///
/// Boundaries are runs of `.`, `!` or `?` (optionally followed by closing
/// quotes or brackets) at the end of a whitespace-delimited stretch of text.
/// Whitespace around each sentence is trimmed and empty sentences are
/// discarded, so blank lines between paragraphs do not produce phantom
/// sentences. Empty input yields an empty sequence.
///
/// The segmenter does not try to understand abbreviations ("Dr.") or
/// decimal numbers; it only guarantees determinism and that no input text
/// outside whitespace is lost.
pub fn split_sentences(text: &str) -> Vec<&str> {
    sentence_boundary()
        .find_iter(text)
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Token counting capability used to budget chunks.
///
/// Implementations must be consistent within one run: the same sentence must
/// always cost the same number of tokens, otherwise the chunker's budget
/// invariant is meaningless.
pub trait TokenCounter: Send + Sync {
    fn count(&self, text: &str) -> usize;
}

/// Word-level token approximation: one token per whitespace-separated word.
///
/// This undercounts subword tokenizers on long words and overcounts on
/// punctuation-heavy text, but it is deterministic and dependency-free,
/// which is what the chunk budget actually needs.
#[derive(Debug, Clone, Copy, Default)]
pub struct WordTokenizer;

impl TokenCounter for WordTokenizer {
    fn count(&self, text: &str) -> usize {
        text.split_whitespace().count()
    }
}

/// Configuration for sentence chunking.
#[derive(Debug, Clone)]
pub struct ChunkConfig {
    /// Maximum token budget per chunk
    pub max_tokens: usize,
    /// Number of trailing sentences shared with the following chunk
    pub overlap: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            max_tokens: 200,
            overlap: 1,
        }
    }
}

impl ChunkConfig {
    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_overlap(mut self, overlap: usize) -> Self {
        self.overlap = overlap;
        self
    }

    /// A configuration is valid when `max_tokens > 0` and `overlap < max_tokens`.
    pub fn is_valid(&self) -> bool {
        self.max_tokens > 0 && self.overlap < self.max_tokens
    }
}

/// A single chunk produced from one source document.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentChunk {
    /// The chunk text: sentences joined with single spaces
    pub text: String,
    /// Identifier of the source document the sentences came from
    pub source: String,
    /// Position of this chunk within its document (0-indexed)
    pub ordinal: usize,
}

/// Greedy sentence-aligned chunker with overlap.
pub struct SentenceChunker {
    config: ChunkConfig,
    tokenizer: Box<dyn TokenCounter>,
}

impl SentenceChunker {
    /// Create a chunker with the default [`WordTokenizer`].
    ///
    /// # Panics
    ///
    /// Panics if the configuration is invalid (`max_tokens == 0` or
    /// `overlap >= max_tokens`).
    pub fn new(config: ChunkConfig) -> Self {
        Self::with_tokenizer(config, Box::new(WordTokenizer))
    }

    /// Create a chunker with a custom token counting capability.
    ///
    /// # Panics
    ///
    /// Panics if the configuration is invalid (`max_tokens == 0` or
    /// `overlap >= max_tokens`).
    pub fn with_tokenizer(config: ChunkConfig, tokenizer: Box<dyn TokenCounter>) -> Self {
        assert!(
            config.is_valid(),
            "invalid chunk config: max_tokens must be > 0 and overlap < max_tokens"
        );
        Self { config, tokenizer }
    }

    pub fn config(&self) -> &ChunkConfig {
        &self.config
    }

    /// Split `text` into an ordered sequence of chunk strings.
    ///
    /// Sentences are accumulated greedily: while appending the next sentence
    /// keeps the buffer within `max_tokens`, it is appended. When it would
    /// not, the buffer is emitted (sentences joined with single spaces) and
    /// the next buffer is seeded with the last `overlap` sentences of the
    /// emitted chunk plus the sentence that triggered the overflow. Overlap
    /// sentences are dropped from the front of the seed if carrying them all
    /// would push the new buffer past the budget on arrival.
    ///
    /// A sentence whose own token count exceeds `max_tokens` is emitted as a
    /// chunk by itself; content is never dropped. Empty input yields an
    /// empty sequence.
    pub fn chunk(&self, text: &str) -> Vec<String> {
        let sentences = split_sentences(text);
        if sentences.is_empty() {
            return Vec::new();
        }

        let mut chunks: Vec<String> = Vec::new();
        let mut buffer: Vec<&str> = Vec::new();
        let mut buffer_tokens = 0usize;

        for sentence in sentences {
            let tokens = self.tokenizer.count(sentence);

            if !buffer.is_empty() && buffer_tokens + tokens > self.config.max_tokens {
                chunks.push(buffer.join(" "));

                // Seed the next buffer with the trailing overlap sentences
                // (or fewer, if the chunk had fewer sentences than that).
                let keep_from = buffer.len().saturating_sub(self.config.overlap);
                buffer = buffer.split_off(keep_from);
                buffer_tokens = buffer.iter().map(|s| self.tokenizer.count(s)).sum();

                // Trim the seed from the front so the triggering sentence
                // still fits the budget; an oversized single sentence gets
                // an empty buffer and stands alone.
                while !buffer.is_empty() && buffer_tokens + tokens > self.config.max_tokens {
                    let dropped = buffer.remove(0);
                    buffer_tokens -= self.tokenizer.count(dropped);
                }
            }

            buffer.push(sentence);
            buffer_tokens += tokens;
        }

        if !buffer.is_empty() {
            chunks.push(buffer.join(" "));
        }

        chunks
    }

    /// Chunk one document, tagging each chunk with its source id and ordinal.
    pub fn chunk_document(&self, source: &str, text: &str) -> Vec<DocumentChunk> {
        self.chunk(text)
            .into_iter()
            .enumerate()
            .map(|(ordinal, text)| DocumentChunk {
                text,
                source: source.to_string(),
                ordinal,
            })
            .collect()
    }
}
