//! Save functionality for trained tokenizers.
//!
//! This module writes a tokenizer's merge table and vocabulary to disk as
//! pretty-printed JSON.

use super::format::{SerializedMerge, SerializedTokenizer};
use super::resolve_path;
use bytepair_core::{MergeRules, Result, TokenizerError, Vocabulary};
use log::info;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Tokenizer saver - handles saving trained models.
pub struct TokenizerSaver<'a> {
    /// Vocabulary reference
    vocab: &'a Vocabulary,
    /// Merge rules reference
    merges: &'a MergeRules,
}

impl<'a> TokenizerSaver<'a> {
    /// Create a new tokenizer saver.
    pub fn new(vocab: &'a Vocabulary, merges: &'a MergeRules) -> Self {
        Self { vocab, merges }
    }

    /// Save the tokenizer as JSON.
    ///
    /// `path` is the file to write; if it is an existing directory,
    /// `tokenizer.json` is written inside it. Missing parent directories are
    /// created.
    pub fn save(&self, path: &Path) -> Result<()> {
        let file_path = resolve_path(path);

        if let Some(parent) = file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| TokenizerError::io(parent, e))?;
        }

        let file = File::create(&file_path).map_err(|e| TokenizerError::io(&file_path, e))?;
        let mut writer = BufWriter::new(file);

        serde_json::to_writer_pretty(&mut writer, &self.serialize())
            .map_err(|e| TokenizerError::Save(format!("Failed to serialize tokenizer: {}", e)))?;
        writer
            .flush()
            .map_err(|e| TokenizerError::io(&file_path, e))?;

        info!(
            "Tokenizer saved to {} ({} merges)",
            file_path.display(),
            self.merges.len()
        );
        Ok(())
    }

    /// Serialize the tokenizer to a record.
    pub fn serialize(&self) -> SerializedTokenizer {
        let merges = self
            .merges
            .iter()
            .map(|((left, right), new_token_id)| SerializedMerge {
                left,
                right,
                new_token_id,
            })
            .collect();

        let token_to_bytes = self
            .vocab
            .iter()
            .map(|(id, bytes)| (id, bytes.to_vec()))
            .collect();

        SerializedTokenizer {
            version: env!("CARGO_PKG_VERSION").to_string(),
            vocab_size: self.vocab.len(),
            merges,
            token_to_bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Vocabulary, MergeRules) {
        let mut vocab = Vocabulary::new();
        let mut merges = MergeRules::new();
        for pair in [(b'l' as u32, b'l' as u32), (b'e' as u32, 256)] {
            let id = merges.push(pair).unwrap();
            vocab.add_merged(pair, id).unwrap();
        }
        (vocab, merges)
    }

    #[test]
    fn test_serialize() {
        let (vocab, merges) = sample();
        let serialized = TokenizerSaver::new(&vocab, &merges).serialize();

        assert_eq!(serialized.version, env!("CARGO_PKG_VERSION"));
        assert_eq!(serialized.vocab_size, 258);
        assert_eq!(serialized.token_to_bytes.len(), 258);
        assert_eq!(serialized.token_to_bytes[&257], b"ell".to_vec());
        assert_eq!(
            serialized.merges,
            vec![
                SerializedMerge {
                    left: 108,
                    right: 108,
                    new_token_id: 256
                },
                SerializedMerge {
                    left: 101,
                    right: 256,
                    new_token_id: 257
                },
            ]
        );
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let (vocab, merges) = sample();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("model.json");

        TokenizerSaver::new(&vocab, &merges).save(&path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let record: SerializedTokenizer = serde_json::from_str(&written).unwrap();
        assert_eq!(record.merges.len(), 2);
    }

    #[test]
    fn test_save_into_directory() {
        let (vocab, merges) = sample();
        let dir = tempfile::tempdir().unwrap();

        TokenizerSaver::new(&vocab, &merges).save(dir.path()).unwrap();

        assert!(dir.path().join("tokenizer.json").is_file());
    }
}
