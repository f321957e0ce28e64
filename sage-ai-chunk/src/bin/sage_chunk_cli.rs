use clap::Parser;
use sage_ai_chunk::{ChunkConfig, SentenceChunker};
use std::fs;
use std::io::{self, Read};

/// A CLI tool to chunk text into JSON output using sage-ai-chunk.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the input text file. If not provided, reads from stdin.
    #[arg(short, long)]
    input: Option<String>,

    /// Source document identifier attached to each chunk.
    #[arg(short, long, default_value = "stdin")]
    source: String,

    /// Maximum token budget per chunk.
    #[arg(short, long, default_value_t = 200)]
    max_tokens: usize,

    /// Number of trailing sentences shared between consecutive chunks.
    #[arg(short, long, default_value_t = 1)]
    overlap: usize,
}

fn main() -> io::Result<()> {
    let args = Args::parse();

    let text = if let Some(input_path) = args.input {
        fs::read_to_string(input_path)?
    } else {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    };

    let config = ChunkConfig::default()
        .with_max_tokens(args.max_tokens)
        .with_overlap(args.overlap);
    if !config.is_valid() {
        eprintln!("invalid configuration: max-tokens must be > 0 and overlap < max-tokens");
        std::process::exit(2);
    }

    let chunker = SentenceChunker::new(config);
    let chunks = chunker.chunk_document(&args.source, &text);

    let json_output = serde_json::to_string_pretty(&chunks)?;
    println!("{}", json_output);

    Ok(())
}
