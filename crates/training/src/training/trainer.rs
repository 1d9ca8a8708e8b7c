//! BPE trainer implementation.
//!
//! Each iteration recounts every adjacent pair in the corpus, merges the most
//! frequent one and rewrites the corpus. Training is sequential: every merge
//! depends on the corpus produced by the previous one.

use super::counter::PairCounter;
use bytepair_core::{MergeRules, Result, TokenizerError, Vocabulary, BYTE_VOCAB_SIZE};
use log::{debug, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Configuration for BPE training.
#[derive(Debug, Clone)]
pub struct TrainingConfig {
    /// Target vocabulary size, including the 256 byte tokens
    pub vocab_size: usize,
    /// Minimum frequency for a pair to be merged
    pub min_frequency: u64,
    /// Log progress every N merges (0 disables progress logs)
    pub log_interval: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            vocab_size: 30_000,
            min_frequency: 1,
            log_interval: 100,
        }
    }
}

/// Output of a training run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainedModel {
    /// Byte vocabulary extended with one token per merge
    pub vocab: Vocabulary,
    /// Merge rules in creation order
    pub merges: MergeRules,
}

impl TrainedModel {
    /// Vocabulary size: 256 byte tokens plus one per merge.
    pub fn vocab_size(&self) -> usize {
        self.vocab.len()
    }
}

/// BPE trainer.
///
/// Trains a byte-level BPE model from text by iteratively merging the most
/// frequent adjacent token pair.
pub struct BpeTrainer {
    /// Configuration
    config: TrainingConfig,
    /// Checked between merges; set it to stop training early
    cancel: Option<Arc<AtomicBool>>,
}

impl BpeTrainer {
    /// Create a new BPE trainer with the given configuration.
    pub fn new(config: TrainingConfig) -> Self {
        Self {
            config,
            cancel: None,
        }
    }

    /// Create a new BPE trainer with default configuration.
    pub fn with_vocab_size(vocab_size: usize) -> Self {
        Self::new(TrainingConfig {
            vocab_size,
            ..Default::default()
        })
    }

    /// Stop training between merges once `flag` is set.
    ///
    /// A cancelled run still returns the merges learned so far.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Get the configuration.
    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Train on a single text.
    pub fn train_text(&self, text: &str) -> Result<TrainedModel> {
        self.train(&[text])
    }

    /// Train on a corpus of texts.
    ///
    /// Performs up to `vocab_size - 256` merges, fewer if the corpus runs out
    /// of pairs or the best pair falls below `min_frequency`. A target of 256
    /// or less yields the plain byte vocabulary.
    pub fn train<S: AsRef<str>>(&self, texts: &[S]) -> Result<TrainedModel> {
        if self.config.vocab_size > u32::MAX as usize {
            return Err(TokenizerError::InvalidConfig(format!(
                "vocab_size {} exceeds the token ID range",
                self.config.vocab_size
            )));
        }

        let num_merges = self
            .config
            .vocab_size
            .saturating_sub(BYTE_VOCAB_SIZE as usize);
        if num_merges == 0 {
            warn!(
                "vocab_size {} leaves no room for merges; keeping the byte vocabulary",
                self.config.vocab_size
            );
        }

        let mut counter = PairCounter::new();
        counter.add_texts(texts);

        // Every merge removes at least one token from the corpus.
        let capacity = num_merges.min(counter.total_tokens());
        let mut vocab = Vocabulary::with_capacity(BYTE_VOCAB_SIZE as usize + capacity);
        let mut merges = MergeRules::with_capacity(capacity);

        info!(
            "Training BPE on {} texts ({} bytes), {} merges requested",
            counter.sequence_count(),
            counter.total_tokens(),
            num_merges
        );

        while merges.len() < num_merges {
            if self.is_cancelled() {
                info!("Training cancelled after {} merges", merges.len());
                break;
            }

            let (pair, count) = match counter.most_frequent() {
                Some(best) => best,
                None => {
                    debug!("No pairs left after {} merges", merges.len());
                    break;
                }
            };

            if count < self.config.min_frequency {
                debug!(
                    "Best pair {:?} occurs {} times, below min_frequency {}",
                    pair, count, self.config.min_frequency
                );
                break;
            }

            let new_token_id = merges.push(pair)?;
            vocab.add_merged(pair, new_token_id)?;
            counter.merge_pair(pair, new_token_id);

            if self.config.log_interval > 0 && merges.len() % self.config.log_interval == 0 {
                debug!(
                    "Merge {}/{}: {:?} -> {} (count {}, {} tokens left)",
                    merges.len(),
                    num_merges,
                    pair,
                    new_token_id,
                    count,
                    counter.total_tokens()
                );
            }
        }

        info!(
            "Learned {} merges, vocabulary size {}",
            merges.len(),
            vocab.len()
        );

        Ok(TrainedModel { vocab, merges })
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CORPUS: [&str; 3] = ["hello world", "hello there", "world peace"];

    #[test]
    fn test_basic_training() {
        let trainer = BpeTrainer::with_vocab_size(300);
        let model = trainer.train(&CORPUS).unwrap();

        assert!(model.vocab_size() > 256);
        assert!(model.vocab_size() <= 300);
        assert_eq!(model.merges.len(), model.vocab_size() - 256);
    }

    #[test]
    fn test_first_merge_is_most_frequent_pair() {
        let trainer = BpeTrainer::with_vocab_size(257);
        let model = trainer.train(&["aaabdaaabac"]).unwrap();

        assert_eq!(model.merges.len(), 1);
        assert_eq!(model.merges.pair_for(256), Some((b'a' as u32, b'a' as u32)));
        assert_eq!(model.vocab.get_bytes(256), Some(&b"aa"[..]));
    }

    #[test]
    fn test_merged_tokens_concatenate_their_pair() {
        let trainer = BpeTrainer::with_vocab_size(280);
        let model = trainer.train(&CORPUS).unwrap();

        for (pair, new_id) in model.merges.iter() {
            let mut expected = model.vocab.get_bytes(pair.0).unwrap().to_vec();
            expected.extend_from_slice(model.vocab.get_bytes(pair.1).unwrap());
            assert_eq!(model.vocab.get_bytes(new_id).unwrap(), expected.as_slice());
        }
    }

    #[test]
    fn test_training_is_deterministic() {
        let trainer = BpeTrainer::with_vocab_size(290);
        let first = trainer.train(&CORPUS).unwrap();
        let second = trainer.train(&CORPUS).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_small_vocab_size_yields_no_merges() {
        for vocab_size in [0, 1, 255, 256] {
            let model = BpeTrainer::with_vocab_size(vocab_size)
                .train(&CORPUS)
                .unwrap();
            assert!(model.merges.is_empty());
            assert_eq!(model.vocab_size(), 256);
        }
    }

    #[test]
    fn test_empty_corpus() {
        let trainer = BpeTrainer::with_vocab_size(300);

        let empty: [&str; 0] = [];
        assert!(trainer.train(&empty).unwrap().merges.is_empty());
        assert!(trainer.train(&["", ""]).unwrap().merges.is_empty());
        assert!(trainer.train_text("x").unwrap().merges.is_empty());
    }

    #[test]
    fn test_stops_when_corpus_collapses() {
        let model = BpeTrainer::with_vocab_size(1_000).train_text("abcd").unwrap();

        // "abcd" collapses to a single token after three merges.
        assert_eq!(model.merges.len(), 3);
        assert_eq!(model.vocab.get_bytes(258), Some(&b"abcd"[..]));
    }

    #[test]
    fn test_min_frequency_filter() {
        let trainer = BpeTrainer::new(TrainingConfig {
            vocab_size: 300,
            min_frequency: 2,
            log_interval: 0,
        });

        let model = trainer.train(&["abab", "cd"]).unwrap();
        assert_eq!(model.merges.len(), 1);
        assert_eq!(model.merges.pair_for(256), Some((b'a' as u32, b'b' as u32)));
    }

    #[test]
    fn test_cancelled_before_start() {
        let flag = Arc::new(AtomicBool::new(true));
        let trainer = BpeTrainer::with_vocab_size(300).with_cancel_flag(flag);

        let model = trainer.train(&CORPUS).unwrap();
        assert!(model.merges.is_empty());
    }

    #[test]
    fn test_rejects_vocab_size_beyond_id_range() {
        if usize::BITS <= 32 {
            return;
        }
        let trainer = BpeTrainer::with_vocab_size((u32::MAX as u64 + 1) as usize);
        assert!(matches!(
            trainer.train(&CORPUS),
            Err(TokenizerError::InvalidConfig(_))
        ));
    }
}
