use anyhow::Result;
use clap::{Parser, Subcommand};
use sage_ai_chunk::ChunkConfig;
use sage_ai_embed::{EmbedConfig, EmbeddingProvider, FastEmbedProvider, HashEmbedder};
use sage_ai_pipeline::evaluation::load_questions;
use sage_ai_pipeline::{EchoGenerator, EvalConfig, Evaluation};
use sage_ai_retriever::{RetrievalSession, SessionConfig};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

/// Retrieval-augmented generation pipeline over a document corpus.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Use the deterministic offline embedder instead of a real model.
    #[arg(long, global = true)]
    offline: bool,

    /// Embedding model name (ignored with --offline).
    #[arg(long, global = true, default_value = "all-MiniLM-L6-v2")]
    model: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ingest a directory of documents and persist the index.
    Ingest {
        /// Directory tree containing .txt/.pdf/.docx documents
        #[arg(short, long)]
        corpus: PathBuf,
        /// Base path for the persisted index/corpus artifact pair
        #[arg(short, long, default_value = "retriever_index")]
        index_base: PathBuf,
        /// Maximum token budget per chunk
        #[arg(long, default_value_t = 200)]
        max_tokens: usize,
        /// Sentences shared between consecutive chunks
        #[arg(long, default_value_t = 1)]
        overlap: usize,
    },
    /// Query a persisted index for the most relevant chunks.
    Query {
        /// The query text
        query: String,
        /// Base path of the persisted artifact pair
        #[arg(short, long, default_value = "retriever_index")]
        index_base: PathBuf,
        /// Number of chunks to retrieve
        #[arg(short, long, default_value_t = 3)]
        k: usize,
    },
    /// Run the evaluation harness over a questions file.
    Evaluate {
        /// JSON file holding an array of test questions
        #[arg(short, long)]
        questions: PathBuf,
        /// Base path of the persisted artifact pair
        #[arg(short, long, default_value = "retriever_index")]
        index_base: PathBuf,
        /// Directory receiving date-named log files
        #[arg(long, default_value = "logs")]
        log_dir: PathBuf,
        /// Group identifier stamped into every record
        #[arg(long, default_value = "sage")]
        group_id: String,
        /// Number of chunks to retrieve per question
        #[arg(short, long, default_value_t = 1)]
        k: usize,
        /// Cosine similarity threshold for a matched answer
        #[arg(long, default_value_t = 0.7)]
        threshold: f32,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

async fn make_provider(offline: bool, model: &str) -> Result<Arc<dyn EmbeddingProvider>> {
    if offline {
        Ok(Arc::new(HashEmbedder::new(384)))
    } else {
        let provider = FastEmbedProvider::create(EmbedConfig::new(model)).await?;
        Ok(Arc::new(provider))
    }
}

async fn run() -> Result<()> {
    let args = Args::parse();
    let provider = make_provider(args.offline, &args.model).await?;

    match args.command {
        Commands::Ingest {
            corpus,
            index_base,
            max_tokens,
            overlap,
        } => {
            let config = SessionConfig::default().with_chunk_config(
                ChunkConfig::default()
                    .with_max_tokens(max_tokens)
                    .with_overlap(overlap),
            );
            let session = RetrievalSession::new(provider, config);

            let count = session.ingest_directory(&corpus).await?;
            session.persist(&index_base).await?;
            println!(
                "Ingested {count} chunks from {} into {}",
                corpus.display(),
                index_base.display()
            );
            Ok(())
        }
        Commands::Query {
            query,
            index_base,
            k,
        } => {
            let session = RetrievalSession::new(provider, SessionConfig::default());
            session.restore(&index_base).await?;

            for (rank, (chunk, distance)) in session.query(&query, k).await?.iter().enumerate() {
                println!("{}. (distance {distance:.4})", rank + 1);
                println!("{chunk}");
                println!("---");
            }
            Ok(())
        }
        Commands::Evaluate {
            questions,
            index_base,
            log_dir,
            group_id,
            k,
            threshold,
        } => {
            let session = RetrievalSession::new(Arc::clone(&provider), SessionConfig::default());
            session.restore(&index_base).await?;

            let questions = load_questions(&questions).await?;
            let harness = Evaluation::new(
                EvalConfig::default()
                    .with_log_dir(log_dir)
                    .with_group_id(group_id)
                    .with_top_k(k)
                    .with_similarity_threshold(threshold),
            );

            let records = harness.run(&questions, &session, &EchoGenerator).await?;
            println!(
                "Evaluation complete. {} records written to {}",
                records.len(),
                harness.log_file_path().display()
            );

            let summary = harness.score(&questions, &records, provider.as_ref()).await?;
            if !summary.results.is_empty() {
                println!(
                    "\nSummary: {} matched / {} total\n",
                    summary.matched,
                    summary.matched + summary.unmatched
                );
                for result in &summary.results {
                    println!("Q: {}", result.question);
                    println!("Expected: {}", result.expected);
                    println!("Actual: {}", result.actual);
                    println!("Score: {:.2}\n", result.score);
                }
            }
            Ok(())
        }
    }
}
