//! Serialization and deserialization for BPE models.
//!
//! This module provides functionality for saving and loading trained
//! tokenizers as a single JSON file.

pub mod format;
pub mod load;
pub mod save;

pub use format::{SerializedMerge, SerializedTokenizer, TOKENIZER_FILE};
pub use load::TokenizerLoader;
pub use save::TokenizerSaver;

use std::path::{Path, PathBuf};

/// Resolve the file to read or write: directories get `tokenizer.json`.
pub(crate) fn resolve_path(path: &Path) -> PathBuf {
    if path.is_dir() {
        path.join(TOKENIZER_FILE)
    } else {
        path.to_path_buf()
    }
}
