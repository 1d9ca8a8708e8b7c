//! Pair counting for BPE training.
//!
//! The counter owns the training corpus: one token sequence per input text,
//! initialised from the text's UTF-8 bytes and rewritten in place as merges
//! are learned.

use ahash::AHashMap;
use bytepair_core::{merge_pair, Pair};

/// Frequency of a pair and the scan position where it first appeared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairStats {
    /// Number of occurrences across the corpus
    pub count: u64,
    /// Index of the first occurrence in a text-by-text, left-to-right scan
    pub first_seen: usize,
}

/// Pair -> frequency statistics.
pub type PairCounts = AHashMap<Pair, PairStats>;

/// Counter for BPE pair frequencies.
pub struct PairCounter {
    /// Text -> current token IDs
    sequences: Vec<Vec<u32>>,
}

impl PairCounter {
    /// Create a new pair counter.
    pub fn new() -> Self {
        Self {
            sequences: Vec::new(),
        }
    }

    /// Add a text; its UTF-8 bytes become its initial tokens.
    pub fn add_text(&mut self, text: &str) {
        self.sequences.push(text.bytes().map(u32::from).collect());
    }

    /// Add every text of a corpus, in order.
    pub fn add_texts<I, S>(&mut self, texts: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for text in texts {
            self.add_text(text.as_ref());
        }
    }

    /// Count all adjacent pairs across the corpus.
    pub fn count_pairs(&self) -> PairCounts {
        let mut pair_counts = PairCounts::new();
        let mut position = 0usize;

        for sequence in &self.sequences {
            for window in sequence.windows(2) {
                let pair = (window[0], window[1]);
                pair_counts
                    .entry(pair)
                    .or_insert(PairStats {
                        count: 0,
                        first_seen: position,
                    })
                    .count += 1;
                position += 1;
            }
        }

        pair_counts
    }

    /// Find the pair to merge next.
    ///
    /// The highest count wins; among equal counts, the pair that occurs first
    /// when scanning the texts in order, left to right.
    pub fn most_frequent(&self) -> Option<(Pair, u64)> {
        self.count_pairs()
            .into_iter()
            .max_by(|(_, a), (_, b)| {
                a.count
                    .cmp(&b.count)
                    .then_with(|| b.first_seen.cmp(&a.first_seen))
            })
            .map(|(pair, stats)| (pair, stats.count))
    }

    /// Merge a pair in all sequences (mutates them in place).
    ///
    /// Returns the total number of replacements.
    pub fn merge_pair(&mut self, pair: Pair, new_token_id: u32) -> usize {
        self.sequences
            .iter_mut()
            .map(|sequence| merge_pair(sequence, pair, new_token_id))
            .sum()
    }

    /// Get the number of texts.
    pub fn sequence_count(&self) -> usize {
        self.sequences.len()
    }

    /// Get the number of tokens currently in the corpus.
    pub fn total_tokens(&self) -> usize {
        self.sequences.iter().map(Vec::len).sum()
    }

    /// Get a reference to the sequences.
    pub fn sequences(&self) -> &[Vec<u32>] {
        &self.sequences
    }

    /// Clear all data from the counter.
    pub fn clear(&mut self) {
        self.sequences.clear();
    }
}

impl Default for PairCounter {
    fn default() -> Self {
        Self::new()
    }
}
