//! Decode command implementation.

use clap::Parser;
use std::path::PathBuf;

/// Decode command arguments.
#[derive(Parser)]
pub struct DecodeCommand {
    /// Path to the trained tokenizer model
    #[arg(short, long)]
    pub tokenizer: PathBuf,

    /// Token IDs to decode (comma-separated)
    #[arg(short = 'k', long)]
    pub tokens: String,
}

use anyhow::{Context, Result as AnyhowResult};
use bytepair_tokenizer::BpeTokenizer;

pub fn run(cmd: DecodeCommand) -> AnyhowResult<()> {
    let tokenizer = BpeTokenizer::from_file(&cmd.tokenizer)
        .with_context(|| format!("unable to load tokenizer from {}", cmd.tokenizer.display()))?;

    let ids = parse_ids(&cmd.tokens)?;
    let text = tokenizer.decode(&ids).context("decoding failed")?;

    println!("{}", text);

    Ok(())
}

fn parse_ids(tokens: &str) -> AnyhowResult<Vec<u32>> {
    tokens
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u32>()
                .with_context(|| format!("invalid token ID {:?}", s))
        })
        .collect()
}
