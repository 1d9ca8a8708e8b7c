//! Train command implementation.

use clap::Parser;
use std::path::PathBuf;

/// Train command arguments.
#[derive(Parser)]
pub struct TrainCommand {
    /// Training data files
    #[arg(short, long, required = true, num_args = 1..)]
    pub input: Vec<PathBuf>,

    /// Output file (or directory) for the trained model
    #[arg(short, long)]
    pub output: PathBuf,

    /// Target vocabulary size, including the 256 byte tokens
    #[arg(long, default_value_t = 30_000)]
    pub vocab_size: usize,

    /// Minimum pair count for a merge to be learned
    #[arg(long, default_value_t = 1)]
    pub min_frequency: u64,

    /// Treat every line as a separate text instead of every file
    #[arg(long, default_value_t = false)]
    pub per_line: bool,
}

use anyhow::{Context, Result as AnyhowResult};
use bytepair_tokenizer::BpeTokenizer;
use log::info;
use std::fs;
use std::time::Instant;

pub fn run(cmd: TrainCommand) -> AnyhowResult<()> {
    info!(
        "Training tokenizer: vocab_size={}, min_frequency={}, {} input file(s)",
        cmd.vocab_size,
        cmd.min_frequency,
        cmd.input.len()
    );

    let start = Instant::now();
    let texts = read_texts(&cmd.input, cmd.per_line)?;
    let bytes: usize = texts.iter().map(String::len).sum();
    info!(
        "Read {} texts ({} bytes) in {:.2}s",
        texts.len(),
        bytes,
        start.elapsed().as_secs_f64()
    );

    let mut tokenizer = BpeTokenizer::builder()
        .min_frequency(cmd.min_frequency)
        .build();

    let start = Instant::now();
    tokenizer
        .train(&texts, cmd.vocab_size)
        .context("training failed")?;
    info!(
        "Training completed in {:.2}s, final vocab size {}",
        start.elapsed().as_secs_f64(),
        tokenizer.vocab_size()
    );

    tokenizer
        .save(&cmd.output)
        .with_context(|| format!("unable to save tokenizer to {}", cmd.output.display()))?;

    Ok(())
}

fn read_texts(paths: &[PathBuf], per_line: bool) -> AnyhowResult<Vec<String>> {
    let mut texts = Vec::new();
    for path in paths {
        let data = fs::read_to_string(path)
            .with_context(|| format!("unable to read {}", path.display()))?;
        if per_line {
            texts.extend(
                data.lines()
                    .filter(|line| !line.is_empty())
                    .map(str::to_owned),
            );
        } else {
            texts.push(data);
        }
    }
    Ok(texts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_texts_per_file_and_per_line() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("a.txt");
        let second = dir.path().join("b.txt");
        fs::write(&first, "hello world\n\nhello there\n").unwrap();
        fs::write(&second, "world peace").unwrap();
        let paths = vec![first, second];

        let per_file = read_texts(&paths, false).unwrap();
        assert_eq!(per_file.len(), 2);
        assert_eq!(per_file[1], "world peace");

        let per_line = read_texts(&paths, true).unwrap();
        assert_eq!(per_line, vec!["hello world", "hello there", "world peace"]);
    }

    #[test]
    fn test_train_writes_model() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("corpus.txt");
        fs::write(&input, "hello world\nhello there\nworld peace\n").unwrap();

        let cmd = TrainCommand {
            input: vec![input],
            output: dir.path().join("model.json"),
            vocab_size: 280,
            min_frequency: 1,
            per_line: true,
        };
        run(cmd).unwrap();

        let tokenizer = BpeTokenizer::from_file(&dir.path().join("model.json")).unwrap();
        assert!(tokenizer.vocab_size() > 256);
        assert!(tokenizer.vocab_size() <= 280);
    }

    #[test]
    fn test_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let result = read_texts(&[dir.path().join("missing.txt")], false);
        assert!(result.is_err());
    }
}
