//! Bytepair-tokenizer - High-level tokenizer API
//!
//! This crate provides a user-friendly interface for byte-level BPE
//! tokenization, integrating the vocabulary, merge rules, trainer and encoder
//! into a single type with JSON persistence.
//!
//! # Features
//!
//! - `Tokenizer` trait for polymorphic train/encode/decode/save/load
//! - `BpeTokenizer` with a builder for training options
//! - Round-trip safe: any text decodes back to itself
//! - Save and load as a single JSON file
//!
//! # Example
//!
//! ```rust
//! use bytepair_tokenizer::BpeTokenizer;
//!
//! let mut tokenizer = BpeTokenizer::new();
//! tokenizer.train(&["hello world", "hello there", "world peace"], 300)?;
//!
//! let ids = tokenizer.encode("hello world");
//! assert!(ids.len() < "hello world".len());
//!
//! let text = tokenizer.decode(&ids)?;
//! assert_eq!(text, "hello world");
//! # Ok::<(), bytepair_tokenizer::TokenizerError>(())
//! ```

// Re-export core types
pub use bytepair_core::{MergeRules, Result, TokenizerError, Vocabulary};

// Tokenizer API
pub mod tokenizer;
pub use tokenizer::{BpeTokenizer, Tokenizer, TokenizerBuilder, TokenizerConfig};

// IO/Serialization
pub mod io;
pub use io::{SerializedMerge, SerializedTokenizer, TokenizerLoader, TokenizerSaver};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
