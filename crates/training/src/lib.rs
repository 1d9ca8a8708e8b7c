//! Bytepair-training - BPE training infrastructure
//!
//! This crate provides the merge learner: it turns a corpus of texts into an
//! ordered table of merge rules and the matching vocabulary.
//!
//! # Features
//!
//! - Byte-level corpus: every text starts as its UTF-8 bytes
//! - Deterministic selection: highest count, ties go to the pair seen first
//! - Configurable target vocabulary size and minimum pair frequency
//! - Cooperative cancellation between merges
//!
//! # Example
//!
//! ```rust
//! use bytepair_training::{BpeTrainer, TrainingConfig};
//!
//! let trainer = BpeTrainer::new(TrainingConfig {
//!     vocab_size: 300,
//!     ..Default::default()
//! });
//!
//! let model = trainer.train(&["hello world", "hello there"])?;
//! assert!(model.vocab_size() > 256);
//! # Ok::<(), bytepair_training::TokenizerError>(())
//! ```

pub use bytepair_core::{Result, TokenizerError};

// Training infrastructure
pub mod training;
pub use training::{BpeTrainer, PairCounter, PairCounts, PairStats, TrainedModel, TrainingConfig};
