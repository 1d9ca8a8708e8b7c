//! Byte-level BPE tokenizer.
//!
//! This module provides [`BpeTokenizer`], which ties together the trainer,
//! the byte-level encoder and the JSON persistence format.

use super::Tokenizer;
use crate::io::{SerializedTokenizer, TokenizerLoader, TokenizerSaver};
use bytepair_core::{ByteLevelEncoder, MergeRules, Result, Vocabulary};
use bytepair_training::{BpeTrainer, TrainedModel, TrainingConfig};
use rayon::prelude::*;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Configuration for building a tokenizer.
#[derive(Debug, Clone)]
pub struct TokenizerConfig {
    /// Minimum frequency for merges during training
    pub min_frequency: u64,
    /// Log training progress every N merges
    pub log_interval: usize,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        let training = TrainingConfig::default();
        Self {
            min_frequency: training.min_frequency,
            log_interval: training.log_interval,
        }
    }
}

/// Builder for creating a tokenizer.
#[derive(Clone, Default)]
pub struct TokenizerBuilder {
    config: TokenizerConfig,
    cancel: Option<Arc<AtomicBool>>,
}

impl TokenizerBuilder {
    /// Create a new tokenizer builder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the minimum frequency for merges.
    pub fn min_frequency(mut self, freq: u64) -> Self {
        self.config.min_frequency = freq;
        self
    }

    /// Set how often training logs progress.
    pub fn log_interval(mut self, interval: usize) -> Self {
        self.config.log_interval = interval;
        self
    }

    /// Stop training between merges once `flag` is set.
    pub fn cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Build the tokenizer.
    pub fn build(self) -> BpeTokenizer {
        BpeTokenizer {
            encoder: ByteLevelEncoder::default(),
            config: self.config,
            cancel: self.cancel,
        }
    }
}

/// Byte-level BPE tokenizer.
///
/// A new tokenizer holds only the 256 byte tokens and encodes text to raw
/// bytes. Training or loading replaces the vocabulary and merges wholesale.
#[derive(Clone)]
pub struct BpeTokenizer {
    /// Encoder owning the shared vocabulary and merge rules
    encoder: ByteLevelEncoder,
    /// Configuration
    config: TokenizerConfig,
    /// Cancellation flag handed to the trainer
    cancel: Option<Arc<AtomicBool>>,
}

impl BpeTokenizer {
    /// Create an untrained tokenizer with default configuration.
    pub fn new() -> Self {
        TokenizerBuilder::new().build()
    }

    /// Create a tokenizer builder.
    pub fn builder() -> TokenizerBuilder {
        TokenizerBuilder::new()
    }

    /// Create a tokenizer from existing tables.
    pub fn from_parts(vocab: Vocabulary, merges: MergeRules) -> Self {
        let mut tokenizer = Self::new();
        tokenizer.install(vocab, merges);
        tokenizer
    }

    /// Load a tokenizer from a file written by [`save`](Self::save).
    pub fn from_file(path: &Path) -> Result<Self> {
        let (vocab, merges) = TokenizerLoader::load(path)?;
        Ok(Self::from_parts(vocab, merges))
    }

    /// Swap in new tables and rebuild the encoder around them.
    fn install(&mut self, vocab: Vocabulary, merges: MergeRules) {
        self.encoder = ByteLevelEncoder::with_arcs(Arc::new(vocab), Arc::new(merges));
    }

    /// Train the tokenizer on a corpus.
    ///
    /// Training always starts from the byte vocabulary; previously learned
    /// merges are discarded. A `vocab_size` of 256 or less leaves the
    /// tokenizer byte-level.
    pub fn train<S: AsRef<str>>(&mut self, texts: &[S], vocab_size: usize) -> Result<()> {
        let mut trainer = BpeTrainer::new(TrainingConfig {
            vocab_size,
            min_frequency: self.config.min_frequency,
            log_interval: self.config.log_interval,
        });
        if let Some(flag) = &self.cancel {
            trainer = trainer.with_cancel_flag(Arc::clone(flag));
        }

        let TrainedModel { vocab, merges } = trainer.train(texts)?;
        self.install(vocab, merges);

        Ok(())
    }

    /// Train the tokenizer on a single text.
    pub fn train_text(&mut self, text: &str, vocab_size: usize) -> Result<()> {
        self.train(&[text], vocab_size)
    }

    /// Encode text to token IDs.
    pub fn encode(&self, text: &str) -> Vec<u32> {
        self.encoder.encode(text)
    }

    /// Encode a batch of texts (parallelized).
    pub fn encode_batch<S: AsRef<str> + Sync>(&self, texts: &[S]) -> Vec<Vec<u32>> {
        texts
            .par_iter()
            .map(|text| self.encode(text.as_ref()))
            .collect()
    }

    /// Decode token IDs back to text.
    ///
    /// Invalid UTF-8 is replaced with U+FFFD; unknown IDs are an error.
    pub fn decode(&self, ids: &[u32]) -> Result<String> {
        self.encoder.decode(ids)
    }

    /// Decode token IDs to the raw bytes they represent.
    pub fn decode_bytes(&self, ids: &[u32]) -> Result<Vec<u8>> {
        self.encoder.decode_bytes(ids)
    }

    /// Get the vocabulary size.
    pub fn vocab_size(&self) -> usize {
        self.encoder.vocab().len()
    }

    /// Get a reference to the vocabulary.
    pub fn vocab(&self) -> &Vocabulary {
        self.encoder.vocab()
    }

    /// Get the merge rules in creation order.
    pub fn merges(&self) -> &MergeRules {
        self.encoder.merges()
    }

    /// Get the configuration.
    pub fn config(&self) -> &TokenizerConfig {
        &self.config
    }

    /// Serialize the tokenizer state to a record.
    pub fn serialize(&self) -> SerializedTokenizer {
        TokenizerSaver::new(self.vocab(), self.merges()).serialize()
    }

    /// Rebuild a tokenizer from a record.
    pub fn deserialize(record: SerializedTokenizer) -> Result<Self> {
        let (vocab, merges) = TokenizerLoader::deserialize(record)?;
        Ok(Self::from_parts(vocab, merges))
    }

    /// Serialize the tokenizer state to a JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.serialize())?)
    }

    /// Rebuild a tokenizer from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        let record: SerializedTokenizer = serde_json::from_str(json)?;
        Self::deserialize(record)
    }

    /// Save the tokenizer to a JSON file.
    ///
    /// # Arguments
    /// * `path` - File to write, or a directory to write `tokenizer.json` into
    pub fn save(&self, path: &Path) -> Result<()> {
        TokenizerSaver::new(self.vocab(), self.merges()).save(path)
    }

    /// Replace this tokenizer's state with the one stored at `path`.
    ///
    /// The configuration is kept. If loading fails nothing changes.
    pub fn load(&mut self, path: &Path) -> Result<()> {
        let (vocab, merges) = TokenizerLoader::load(path)?;
        self.install(vocab, merges);
        Ok(())
    }
}

impl Default for BpeTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for BpeTokenizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BpeTokenizer")
            .field("vocab_size", &self.vocab_size())
            .field("merges", &self.merges().len())
            .field("config", &self.config)
            .finish()
    }
}

impl Tokenizer for BpeTokenizer {
    fn train(&mut self, texts: &[&str], vocab_size: usize) -> Result<()> {
        BpeTokenizer::train(self, texts, vocab_size)
    }

    fn encode(&self, text: &str) -> Vec<u32> {
        BpeTokenizer::encode(self, text)
    }

    fn decode(&self, ids: &[u32]) -> Result<String> {
        BpeTokenizer::decode(self, ids)
    }

    fn save(&self, path: &Path) -> Result<()> {
        BpeTokenizer::save(self, path)
    }

    fn load(&mut self, path: &Path) -> Result<()> {
        BpeTokenizer::load(self, path)
    }

    fn vocab_size(&self) -> usize {
        BpeTokenizer::vocab_size(self)
    }
}
