//! Encoding for BPE tokenization.
//!
//! Only byte-level encoding is provided: all text is handled as UTF-8 bytes,
//! so there are no out-of-vocabulary inputs.

pub mod byte_level;

pub use byte_level::ByteLevelEncoder;
