//! Prompt templates for the generation capability.
//!
//! Each task mode carries a one-shot example so instruction-tuned models see
//! the expected answer shape before the real input. Prompt construction is a
//! thin formatting concern; retrieval decides what goes into `context`.

use anyhow::{Result, bail};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Closed set of task modes the pipeline supports.
///
/// Matched exhaustively everywhere, so adding a mode is a compile-time
/// checked extension point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TaskMode {
    #[default]
    Qa,
    Summarization,
    Mcq,
    Classification,
}

impl TaskMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskMode::Qa => "qa",
            TaskMode::Summarization => "summarization",
            TaskMode::Mcq => "mcq",
            TaskMode::Classification => "classification",
        }
    }
}

/// Build the full prompt for one task.
///
/// `options` is required for [`TaskMode::Mcq`] (the candidate answers,
/// lettered `a)`, `b)`, ...) and rejected for every other mode.
pub fn build_prompt(
    mode: TaskMode,
    context: &str,
    task_input: &str,
    options: Option<&[String]>,
) -> Result<String> {
    match (mode, options) {
        (TaskMode::Mcq, None) => bail!("mcq mode requires answer options"),
        (TaskMode::Mcq, Some(options)) if options.is_empty() => {
            bail!("mcq mode requires at least one answer option")
        }
        (mode, Some(_)) if mode != TaskMode::Mcq => {
            bail!("{} mode does not take answer options", mode.as_str())
        }
        _ => {}
    }

    Ok(match mode {
        TaskMode::Qa => format!(
            "You are an assistant for a university-level course.\n\
             Use only the provided context to answer the question.\n\
             If the answer is not in the context, respond with: I don't know.\n\n\
             Example:\n\
             Context:\n\
             Java EE stands for Java Platform, Enterprise Edition, which is used to develop enterprise level applications.\n\
             Question:\n\
             What is the full form of Java EE?\n\
             Answer:\n\
             Java EE full form is Java Enterprise Edition.\n\n\
             Now use the following context to answer the question.\n\
             Context:\n{context}\n\
             Question:\n{task_input}\n\
             Answer:"
        ),
        TaskMode::Summarization => format!(
            "You are an academic assistant.\n\
             Summarize the following content clearly and concisely.\n\n\
             Example:\n\
             Content:\n\
             Machine learning is a field of artificial intelligence that uses statistical techniques to give computer systems the ability to learn from data.\n\
             Summary:\n\
             Machine learning enables computers to learn from data using statistical methods.\n\n\
             Now summarize the following content:\n\
             Content:\n{context}"
        ),
        TaskMode::Mcq => {
            let option_text = options
                .unwrap_or_default()
                .iter()
                .enumerate()
                .map(|(i, opt)| format!("{}) {opt}", letter_for(i)))
                .collect::<Vec<_>>()
                .join("\n");
            format!(
                "You are a quiz assistant. Use the provided context to answer the question. \
                 Choose one letter only from the given options. \
                 Always respond with a single letter (a, b, c, ...).\n\n\
                 Example:\n\
                 Context:\n\
                 Paris is the capital of France.\n\
                 Question:\n\
                 What is the capital of France?\n\
                 Options:\n\
                 a) Rome\n\
                 b) Berlin\n\
                 c) Paris\n\
                 Answer:\n\
                 c\n\n\
                 Now answer the following question:\n\
                 Context:\n{context}\n\
                 Question:\n{task_input}\n\
                 Options:\n{option_text}\n\
                 Answer:"
            )
        }
        TaskMode::Classification => format!(
            "You are a content moderation system. Use the following reference rules to decide \
             whether the input is Offensive or Non-offensive. \
             Only respond with one of the two categories: Offensive or Non-offensive.\n\n\
             Example:\n\
             Rules:\n\
             Profanity, hate speech, and personal attacks are considered offensive.\n\
             Input:\n\
             You are a terrible person!\n\
             Classification:\n\
             Offensive\n\n\
             Now classify the following input:\n\
             Rules:\n{context}\n\
             Input:\n{task_input}\n\
             Classification:"
        ),
    })
}

/// Option letter for a zero-based index: 0 -> 'a', 1 -> 'b', ...
pub(crate) fn letter_for(index: usize) -> char {
    (b'a' + (index as u8 % 26)) as char
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qa_prompt_contains_context_and_question() {
        let prompt = build_prompt(TaskMode::Qa, "The sky is blue.", "What color is the sky?", None)
            .unwrap();
        assert!(prompt.contains("Context:\nThe sky is blue."));
        assert!(prompt.contains("Question:\nWhat color is the sky?"));
        assert!(prompt.ends_with("Answer:"));
    }

    #[test]
    fn test_mcq_prompt_letters_options() {
        let options = vec!["Rome".to_string(), "Paris".to_string(), "Berlin".to_string()];
        let prompt = build_prompt(
            TaskMode::Mcq,
            "Paris is the capital of France.",
            "What is the capital of France?",
            Some(&options),
        )
        .unwrap();
        assert!(prompt.contains("a) Rome"));
        assert!(prompt.contains("b) Paris"));
        assert!(prompt.contains("c) Berlin"));
    }

    #[test]
    fn test_mcq_without_options_fails() {
        assert!(build_prompt(TaskMode::Mcq, "ctx", "q", None).is_err());
        assert!(build_prompt(TaskMode::Mcq, "ctx", "q", Some(&[])).is_err());
    }

    #[test]
    fn test_options_rejected_outside_mcq() {
        let options = vec!["yes".to_string()];
        assert!(build_prompt(TaskMode::Qa, "ctx", "q", Some(&options)).is_err());
    }

    #[test]
    fn test_summarization_prompt_ignores_task_input() {
        let prompt = build_prompt(TaskMode::Summarization, "Long content here.", "", None).unwrap();
        assert!(prompt.contains("Content:\nLong content here."));
    }
}
