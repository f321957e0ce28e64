//! Evaluation harness: run test questions through retrieval + generation,
//! log every exchange, and score answers against expectations.
//!
//! Each run appends one record per question to a date-named JSON log file
//! (`logs/<DD-MM-YYYY>.json`), extending whatever the file already holds so
//! a day's runs accumulate in one place. Scoring compares generated answers
//! to expected ones by embedding both and thresholding cosine similarity,
//! which tolerates rephrasing that exact string matching would punish.

use crate::generator::Generator;
use crate::normalize::normalize_answer;
use crate::prompt::{TaskMode, build_prompt};
use anyhow::{Context, Result};
use sage_ai_embed::EmbeddingProvider;
use sage_ai_retriever::RetrievalSession;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One test question as loaded from the questions file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalQuestion {
    pub question: String,
    #[serde(default)]
    pub task: TaskMode,
    /// Candidate answers, required for mcq questions
    #[serde(default)]
    pub options: Option<Vec<String>>,
    /// Reference answer used by scoring, if known
    #[serde(default)]
    pub expected_answer: Option<String>,
}

/// One logged exchange: everything needed to audit a single query later.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalRecord {
    pub question: String,
    pub task: TaskMode,
    pub retrieved_chunks: Vec<String>,
    pub prompt: String,
    pub generated_answer: String,
    pub timestamp: String,
    pub group_id: String,
}

/// Scored comparison of one generated answer against its expectation.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredAnswer {
    pub question: String,
    pub expected: String,
    pub actual: String,
    pub score: f32,
    pub matched: bool,
}

/// Matched/unmatched summary over a whole evaluation run.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreSummary {
    pub matched: usize,
    pub unmatched: usize,
    pub results: Vec<ScoredAnswer>,
}

/// Configuration for the evaluation harness.
#[derive(Debug, Clone)]
pub struct EvalConfig {
    /// Directory receiving the date-named log files
    pub log_dir: PathBuf,
    /// Group identifier stamped into every record
    pub group_id: String,
    /// How many chunks to retrieve per question
    pub top_k: usize,
    /// Output budget handed to the generator
    pub max_output_tokens: usize,
    /// Cosine similarity at or above which an answer counts as matched
    pub similarity_threshold: f32,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("logs"),
            group_id: "sage".to_string(),
            top_k: 1,
            max_output_tokens: 100,
            similarity_threshold: 0.7,
        }
    }
}

impl EvalConfig {
    pub fn with_log_dir<P: Into<PathBuf>>(mut self, log_dir: P) -> Self {
        self.log_dir = log_dir.into();
        self
    }

    pub fn with_group_id<S: Into<String>>(mut self, group_id: S) -> Self {
        self.group_id = group_id.into();
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_similarity_threshold(mut self, threshold: f32) -> Self {
        self.similarity_threshold = threshold;
        self
    }
}

/// The evaluation harness.
pub struct Evaluation {
    config: EvalConfig,
}

impl Evaluation {
    pub fn new(config: EvalConfig) -> Self {
        Self { config }
    }

    /// Today's log file path, named by date so runs accumulate per day.
    pub fn log_file_path(&self) -> PathBuf {
        let day = chrono::Local::now().format("%d-%m-%Y");
        self.config.log_dir.join(format!("{day}.json"))
    }

    /// Run every question through retrieve -> prompt -> generate, append the
    /// records to today's log file, and return them.
    pub async fn run(
        &self,
        questions: &[EvalQuestion],
        session: &RetrievalSession,
        generator: &dyn Generator,
    ) -> Result<Vec<EvalRecord>> {
        let mut records = Vec::with_capacity(questions.len());

        for item in questions {
            let retrieved = session
                .query(&item.question, self.config.top_k)
                .await
                .with_context(|| format!("retrieval failed for question: {}", item.question))?;
            let retrieved_chunks: Vec<String> =
                retrieved.into_iter().map(|(text, _)| text).collect();
            let context = retrieved_chunks.join("\n\n");

            let prompt =
                build_prompt(item.task, &context, &item.question, item.options.as_deref())?;
            let raw_answer = generator
                .generate(&prompt, self.config.max_output_tokens)
                .await
                .with_context(|| format!("generation failed for question: {}", item.question))?;

            let option_count = item.options.as_ref().map(|o| o.len()).unwrap_or(0);
            let generated_answer =
                normalize_answer(item.task, &raw_answer, option_count).to_string();

            records.push(EvalRecord {
                question: item.question.clone(),
                task: item.task,
                retrieved_chunks,
                prompt,
                generated_answer,
                timestamp: chrono::Local::now().format("%Y-%m-%dT%H:%M:%S").to_string(),
                group_id: self.config.group_id.clone(),
            });
        }

        self.append_to_log(&records).await?;
        Ok(records)
    }

    /// Append records to today's log file, preserving existing entries.
    async fn append_to_log(&self, records: &[EvalRecord]) -> Result<()> {
        tokio::fs::create_dir_all(&self.config.log_dir).await?;
        let log_file = self.log_file_path();

        let mut entries: Vec<EvalRecord> = if log_file.exists() {
            let existing = tokio::fs::read_to_string(&log_file).await?;
            serde_json::from_str(&existing)
                .with_context(|| format!("existing log file {} is not valid", log_file.display()))?
        } else {
            Vec::new()
        };

        entries.extend(records.iter().cloned());
        tokio::fs::write(&log_file, serde_json::to_string_pretty(&entries)?).await?;

        tracing::info!(
            "Appended {} records to {}",
            records.len(),
            log_file.display()
        );
        Ok(())
    }

    /// Score generated answers against expected ones by embedding both and
    /// thresholding cosine similarity. Questions without an expected answer
    /// are skipped.
    pub async fn score(
        &self,
        questions: &[EvalQuestion],
        records: &[EvalRecord],
        provider: &dyn EmbeddingProvider,
    ) -> Result<ScoreSummary> {
        let mut results = Vec::new();

        for (question, record) in questions.iter().zip(records) {
            let Some(expected) = &question.expected_answer else {
                continue;
            };

            let pair = vec![expected.clone(), record.generated_answer.clone()];
            let embedded = provider.embed_texts(&pair).await?;
            let score = cosine_similarity(&embedded.embeddings[0], &embedded.embeddings[1]);

            results.push(ScoredAnswer {
                question: question.question.clone(),
                expected: expected.clone(),
                actual: record.generated_answer.clone(),
                score,
                matched: score >= self.config.similarity_threshold,
            });
        }

        let matched = results.iter().filter(|r| r.matched).count();
        let unmatched = results.len() - matched;
        Ok(ScoreSummary {
            matched,
            unmatched,
            results,
        })
    }
}

/// Load test questions from a JSON file (an array of [`EvalQuestion`]).
pub async fn load_questions(path: &Path) -> Result<Vec<EvalQuestion>> {
    let json = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("cannot read questions file {}", path.display()))?;
    serde_json::from_str(&json)
        .with_context(|| format!("questions file {} is not valid", path.display()))
}

/// Cosine similarity between two equal-length f32 vectors.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_question_defaults() {
        let question: EvalQuestion =
            serde_json::from_str(r#"{"question": "What color is the sky?"}"#).unwrap();
        assert_eq!(question.task, TaskMode::Qa);
        assert!(question.options.is_none());
        assert!(question.expected_answer.is_none());
    }
}
