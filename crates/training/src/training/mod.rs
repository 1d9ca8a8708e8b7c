//! Training infrastructure for BPE tokenizers.
//!
//! This module provides the merge learner: pair counting over the corpus and
//! the training loop that turns counts into ordered merge rules.

pub mod counter;
pub mod trainer;

pub use counter::{PairCounter, PairCounts, PairStats};
pub use trainer::{BpeTrainer, TrainedModel, TrainingConfig};
