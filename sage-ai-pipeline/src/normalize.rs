//! Deterministic normalization of raw generator output.
//!
//! Closed-label tasks (multiple choice, classification) need the generator's
//! free text mapped onto their label set before scoring. Unrecognized output
//! maps to the explicit [`NormalizedAnswer::Unclear`] sentinel rather than
//! being silently discarded, so scoring always sees every answer.

use crate::prompt::{TaskMode, letter_for};
use serde::{Deserialize, Serialize};

/// Labels for the classification task.
const CLASSIFICATION_LABELS: &[&str] = &["Offensive", "Non-offensive"];

/// A generator answer after normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NormalizedAnswer {
    /// Free text (qa, summarization) or a recognized closed label
    Answer(String),
    /// Output that could not be mapped onto the task's label set
    Unclear,
}

impl std::fmt::Display for NormalizedAnswer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NormalizedAnswer::Answer(text) => f.write_str(text),
            NormalizedAnswer::Unclear => f.write_str("unclear"),
        }
    }
}

/// Map raw generator output onto the task's answer space.
///
/// - `Qa`/`Summarization`: free text, trimmed; empty output is `Unclear`.
/// - `Mcq`: a single option letter within `option_count`; anything else is
///   `Unclear`. Leading punctuation and casing are forgiven (`"C)"` -> `c`).
/// - `Classification`: one of the known labels, matched case-insensitively
///   anywhere in the output; ambiguous or unknown output is `Unclear`.
pub fn normalize_answer(mode: TaskMode, raw: &str, option_count: usize) -> NormalizedAnswer {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return NormalizedAnswer::Unclear;
    }

    match mode {
        TaskMode::Qa | TaskMode::Summarization => NormalizedAnswer::Answer(trimmed.to_string()),
        TaskMode::Mcq => {
            let mut letters = trimmed
                .chars()
                .filter(|c| c.is_ascii_alphanumeric())
                .map(|c| c.to_ascii_lowercase());
            let (first, second) = (letters.next(), letters.next());
            match (first, second) {
                (Some(letter), None)
                    if (0..option_count).any(|i| letter_for(i) == letter) =>
                {
                    NormalizedAnswer::Answer(letter.to_string())
                }
                _ => NormalizedAnswer::Unclear,
            }
        }
        TaskMode::Classification => {
            let lowered = trimmed.to_lowercase();
            let matched: Vec<&str> = CLASSIFICATION_LABELS
                .iter()
                .filter(|label| lowered.contains(&label.to_lowercase()))
                .copied()
                .collect();
            match matched.as_slice() {
                // "Non-offensive" contains "offensive", so a lone
                // non-offensive answer matches both labels.
                [label] => NormalizedAnswer::Answer(label.to_string()),
                [_, _] if lowered.contains("non-offensive") => {
                    NormalizedAnswer::Answer("Non-offensive".to_string())
                }
                _ => NormalizedAnswer::Unclear,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qa_passes_text_through() {
        assert_eq!(
            normalize_answer(TaskMode::Qa, "  The sky is blue.  ", 0),
            NormalizedAnswer::Answer("The sky is blue.".to_string())
        );
    }

    #[test]
    fn test_empty_output_is_unclear() {
        assert_eq!(normalize_answer(TaskMode::Qa, "   ", 0), NormalizedAnswer::Unclear);
    }

    #[test]
    fn test_mcq_single_letter() {
        assert_eq!(
            normalize_answer(TaskMode::Mcq, "c", 3),
            NormalizedAnswer::Answer("c".to_string())
        );
        assert_eq!(
            normalize_answer(TaskMode::Mcq, " C) ", 3),
            NormalizedAnswer::Answer("c".to_string())
        );
    }

    #[test]
    fn test_mcq_out_of_range_letter_is_unclear() {
        assert_eq!(normalize_answer(TaskMode::Mcq, "d", 3), NormalizedAnswer::Unclear);
    }

    #[test]
    fn test_mcq_rambling_output_is_unclear() {
        assert_eq!(
            normalize_answer(TaskMode::Mcq, "the answer is c", 3),
            NormalizedAnswer::Unclear
        );
    }

    #[test]
    fn test_classification_labels() {
        assert_eq!(
            normalize_answer(TaskMode::Classification, "Offensive", 0),
            NormalizedAnswer::Answer("Offensive".to_string())
        );
        assert_eq!(
            normalize_answer(TaskMode::Classification, "non-offensive", 0),
            NormalizedAnswer::Answer("Non-offensive".to_string())
        );
        assert_eq!(
            normalize_answer(TaskMode::Classification, "it depends", 0),
            NormalizedAnswer::Unclear
        );
    }
}
