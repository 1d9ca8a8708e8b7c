//! Core BPE data model.
//!
//! This module contains the vocabulary, the ordered merge table and the
//! priority queue the encoder applies merges with.

pub mod merges;
pub mod priority;
pub mod vocab;

pub use merges::{merge_pair, MergeMap, MergeRules, Pair};
pub use priority::{MergeCandidate, MergeQueue};
pub use vocab::{Vocab, VocabR, Vocabulary, BYTE_VOCAB_SIZE};
