//! Integration tests for the evaluation harness: retrieval + generation +
//! logging + scoring against the deterministic offline providers.

use anyhow::Result;
use sage_ai_chunk::ChunkConfig;
use sage_ai_embed::HashEmbedder;
use sage_ai_pipeline::{EchoGenerator, EvalConfig, EvalQuestion, Evaluation, TaskMode};
use sage_ai_retriever::{RetrievalSession, SessionConfig};
use std::sync::Arc;
use tempfile::tempdir;

async fn ready_session() -> Result<RetrievalSession> {
    let session = RetrievalSession::new(
        Arc::new(HashEmbedder::new(256)),
        SessionConfig::default()
            .with_chunk_config(ChunkConfig::default().with_max_tokens(50).with_overlap(0)),
    );
    session
        .ingest(&[
            ("sky.txt".to_string(), "The sky is blue.".to_string()),
            ("grass.txt".to_string(), "The grass is green.".to_string()),
        ])
        .await?;
    Ok(session)
}

fn question(text: &str, expected: Option<&str>) -> EvalQuestion {
    EvalQuestion {
        question: text.to_string(),
        task: TaskMode::Qa,
        options: None,
        expected_answer: expected.map(|s| s.to_string()),
    }
}

#[tokio::test]
async fn test_run_writes_date_named_log() -> Result<()> {
    let log_dir = tempdir()?;
    let session = ready_session().await?;

    let harness = Evaluation::new(EvalConfig::default().with_log_dir(log_dir.path()));
    let questions = vec![question("What color is the sky?", None)];

    let records = harness.run(&questions, &session, &EchoGenerator).await?;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].question, "What color is the sky?");
    assert_eq!(records[0].retrieved_chunks, vec!["The sky is blue.".to_string()]);
    assert_eq!(records[0].generated_answer, "The sky is blue.");
    assert!(!records[0].timestamp.is_empty());

    let log_file = harness.log_file_path();
    assert!(log_file.exists());
    let day = chrono::Local::now().format("%d-%m-%Y").to_string();
    assert_eq!(log_file.file_name().unwrap().to_string_lossy(), format!("{day}.json"));
    Ok(())
}

#[tokio::test]
async fn test_repeated_runs_append_to_same_log() -> Result<()> {
    let log_dir = tempdir()?;
    let session = ready_session().await?;

    let harness = Evaluation::new(EvalConfig::default().with_log_dir(log_dir.path()));
    let questions = vec![question("What color is the grass?", None)];

    harness.run(&questions, &session, &EchoGenerator).await?;
    harness.run(&questions, &session, &EchoGenerator).await?;

    let logged: Vec<serde_json::Value> =
        serde_json::from_str(&std::fs::read_to_string(harness.log_file_path())?)?;
    assert_eq!(logged.len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_score_matches_echoed_answer() -> Result<()> {
    let log_dir = tempdir()?;
    let session = ready_session().await?;
    let provider = HashEmbedder::new(256);

    let harness = Evaluation::new(
        EvalConfig::default()
            .with_log_dir(log_dir.path())
            .with_similarity_threshold(0.7),
    );

    // The echo generator answers with the retrieved chunk, so the first
    // question's answer matches its expectation exactly and the second
    // (expectation unrelated to any chunk) falls below the threshold.
    let questions = vec![
        question("What color is the sky?", Some("The sky is blue.")),
        question("What color is the grass?", Some("Quantum chromodynamics binds quarks.")),
    ];

    let records = harness.run(&questions, &session, &EchoGenerator).await?;
    let summary = harness.score(&questions, &records, &provider).await?;

    assert_eq!(summary.results.len(), 2);
    assert_eq!(summary.matched, 1);
    assert_eq!(summary.unmatched, 1);
    assert!(summary.results[0].matched);
    assert!(summary.results[0].score > 0.99);
    assert!(!summary.results[1].matched);
    Ok(())
}

#[tokio::test]
async fn test_questions_without_expectations_are_not_scored() -> Result<()> {
    let log_dir = tempdir()?;
    let session = ready_session().await?;
    let provider = HashEmbedder::new(256);

    let harness = Evaluation::new(EvalConfig::default().with_log_dir(log_dir.path()));
    let questions = vec![question("What color is the sky?", None)];

    let records = harness.run(&questions, &session, &EchoGenerator).await?;
    let summary = harness.score(&questions, &records, &provider).await?;

    assert!(summary.results.is_empty());
    assert_eq!(summary.matched, 0);
    assert_eq!(summary.unmatched, 0);
    Ok(())
}
