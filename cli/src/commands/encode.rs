//! Encode command implementation.

use clap::Parser;
use std::path::PathBuf;

/// Encode command arguments.
#[derive(Parser)]
pub struct EncodeCommand {
    /// Path to the trained tokenizer model
    #[arg(short, long)]
    pub tokenizer: PathBuf,

    /// Text to encode ("-" reads stdin)
    #[arg(short, long)]
    pub input: String,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

use anyhow::{Context, Result as AnyhowResult};
use bytepair_tokenizer::BpeTokenizer;
use log::info;
use std::io::Read;

pub fn run(cmd: EncodeCommand) -> AnyhowResult<()> {
    let tokenizer = BpeTokenizer::from_file(&cmd.tokenizer)
        .with_context(|| format!("unable to load tokenizer from {}", cmd.tokenizer.display()))?;

    let input_text = if cmd.input == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("unable to read stdin")?;
        buffer
    } else {
        cmd.input
    };

    let ids = tokenizer.encode(&input_text);
    let output = format_ids(&ids);

    match &cmd.output {
        Some(path) => {
            std::fs::write(path, &output)
                .with_context(|| format!("unable to write {}", path.display()))?;
            info!("Encoded {} tokens to {}", ids.len(), path.display());
        }
        None => {
            println!("{}", output);
        }
    }

    Ok(())
}

/// Comma-separated, so the output feeds straight into `decode --tokens`.
fn format_ids(ids: &[u32]) -> String {
    ids.iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(",")
}
