//! The text generation capability.
//!
//! Generation is an external collaborator: something that maps a prompt to
//! an answer under an output-length budget. The pipeline only depends on
//! the [`Generator`] trait; wire in whatever backend you have.

use anyhow::Result;
use async_trait::async_trait;

/// Capability that maps a prompt string to an answer string.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generate an answer for `prompt`, at most `max_output_tokens` tokens.
    async fn generate(&self, prompt: &str, max_output_tokens: usize) -> Result<String>;
}

/// Extractive fallback generator: answers with the retrieved context.
///
/// Finds the last context block in the prompt (the text after the final
/// `Context:`/`Content:`/`Rules:` heading, up to the next heading) and
/// returns its first `max_output_tokens` words. No model involved, fully
/// deterministic; good enough to exercise the pipeline end to end and for
/// evaluation harness tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoGenerator;

const CONTEXT_HEADINGS: &[&str] = &["Context:\n", "Content:\n", "Rules:\n"];
const SECTION_HEADINGS: &[&str] = &["\nQuestion:", "\nOptions:", "\nInput:", "\nAnswer:"];

impl EchoGenerator {
    fn extract_context(prompt: &str) -> &str {
        let start = CONTEXT_HEADINGS
            .iter()
            .filter_map(|h| prompt.rfind(h).map(|pos| pos + h.len()))
            .max();
        let Some(start) = start else {
            return prompt;
        };

        let rest = &prompt[start..];
        let end = SECTION_HEADINGS
            .iter()
            .filter_map(|h| rest.find(h))
            .min()
            .unwrap_or(rest.len());
        rest[..end].trim()
    }
}

#[async_trait]
impl Generator for EchoGenerator {
    async fn generate(&self, prompt: &str, max_output_tokens: usize) -> Result<String> {
        let context = Self::extract_context(prompt);
        let answer = context
            .split_whitespace()
            .take(max_output_tokens)
            .collect::<Vec<_>>()
            .join(" ");
        Ok(answer)
    }
}
