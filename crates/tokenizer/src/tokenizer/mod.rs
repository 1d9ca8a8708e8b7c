//! Tokenizer API.
//!
//! [`Tokenizer`] is the capability set every tokenizer offers; callers that
//! only train, encode, decode and persist can hold a `Box<dyn Tokenizer>`.
//! [`BpeTokenizer`] is the byte-level BPE implementation.

pub mod bpe;

pub use bpe::{BpeTokenizer, TokenizerBuilder, TokenizerConfig};

use bytepair_core::Result;
use std::path::Path;

/// Operations shared by all tokenizers.
pub trait Tokenizer {
    /// Learn a vocabulary of at most `vocab_size` tokens from `texts`.
    fn train(&mut self, texts: &[&str], vocab_size: usize) -> Result<()>;

    /// Learn a vocabulary from a single text.
    fn train_text(&mut self, text: &str, vocab_size: usize) -> Result<()> {
        self.train(&[text], vocab_size)
    }

    /// Encode text to token IDs.
    fn encode(&self, text: &str) -> Vec<u32>;

    /// Decode token IDs back to text.
    fn decode(&self, ids: &[u32]) -> Result<String>;

    /// Write the tokenizer state to `path`.
    fn save(&self, path: &Path) -> Result<()>;

    /// Replace the tokenizer state with the one stored at `path`.
    ///
    /// On error the current state is left untouched.
    fn load(&mut self, path: &Path) -> Result<()>;

    /// Number of tokens in the vocabulary.
    fn vocab_size(&self) -> usize;
}
