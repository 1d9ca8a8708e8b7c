//! Format definitions for tokenizer serialization.
//!
//! This module defines the record a trained tokenizer is saved as. Merges
//! are kept as a list because their order is the order they are applied in.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// File name used when a directory is given instead of a file.
pub const TOKENIZER_FILE: &str = "tokenizer.json";

/// A single merge rule: `(left, right) -> new_token_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedMerge {
    /// Left token of the pair
    pub left: u32,
    /// Right token of the pair
    pub right: u32,
    /// The token ID created by this merge
    pub new_token_id: u32,
}

/// Complete tokenizer serialization format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedTokenizer {
    /// Crate version that wrote the record
    pub version: String,
    /// 256 + number of merges
    pub vocab_size: usize,
    /// Merge rules in creation order
    pub merges: Vec<SerializedMerge>,
    /// Token ID -> raw bytes
    pub token_to_bytes: BTreeMap<u32, Vec<u8>>,
}
