//! Bytepair-core - Core byte-level BPE data model and codec
//!
//! This crate provides the fundamental data structures for byte-pair
//! encoding: the 256-entry byte vocabulary and its learned extensions, the
//! ordered merge table, and the encoder/decoder that applies them.
//!
//! # Features
//!
//! - Token IDs 0-255 are raw bytes; merged tokens are numbered from 256 in
//!   creation order
//! - Insertion-ordered merge rules with `AHashMap` pair lookup
//! - Heap-driven encoding that matches a rule-by-rule replay exactly
//! - Lossy UTF-8 decoding with explicit errors for unknown token IDs
//!
//! # Example
//!
//! ```rust
//! use bytepair_core::{ByteLevelEncoder, MergeRules, Vocabulary};
//!
//! let mut vocab = Vocabulary::new();
//! let mut merges = MergeRules::new();
//!
//! let pair = (b'l' as u32, b'l' as u32);
//! let id = merges.push(pair)?;
//! vocab.add_merged(pair, id)?;
//!
//! let encoder = ByteLevelEncoder::new(vocab, merges);
//! let ids = encoder.encode("hello");
//! assert_eq!(ids, vec![104, 101, 256, 111]);
//! assert_eq!(encoder.decode(&ids)?, "hello");
//! # Ok::<(), bytepair_core::TokenizerError>(())
//! ```

pub mod error;
pub use error::{Result, TokenizerError};

// Core BPE data model
pub mod core;
pub use self::core::{
    merge_pair, MergeCandidate, MergeMap, MergeQueue, MergeRules, Pair, Vocab, VocabR,
    Vocabulary, BYTE_VOCAB_SIZE,
};

// Encoding
pub mod encoding;
pub use encoding::ByteLevelEncoder;
