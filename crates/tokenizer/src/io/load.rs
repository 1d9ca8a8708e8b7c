//! Load functionality for pre-trained tokenizers.
//!
//! The vocabulary is taken from the stored bytes as-is; the loader only
//! checks that the record is consistent before handing it out.

use super::format::SerializedTokenizer;
use super::resolve_path;
use bytepair_core::{MergeRules, Result, TokenizerError, Vocabulary, BYTE_VOCAB_SIZE};
use log::{debug, info};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Tokenizer loader - handles loading trained models.
pub struct TokenizerLoader;

impl TokenizerLoader {
    /// Load a tokenizer from a JSON file.
    ///
    /// If `path` is a directory, `tokenizer.json` inside it is read.
    pub fn load(path: &Path) -> Result<(Vocabulary, MergeRules)> {
        let file_path = resolve_path(path);
        let file = File::open(&file_path).map_err(|e| TokenizerError::io(&file_path, e))?;

        let reader = BufReader::new(file);
        let serialized: SerializedTokenizer = serde_json::from_reader(reader).map_err(|e| {
            TokenizerError::Load(format!(
                "Failed to deserialize tokenizer from {}: {}",
                file_path.display(),
                e
            ))
        })?;

        let (vocab, merges) = Self::deserialize(serialized)?;
        info!(
            "Tokenizer loaded from {} ({} merges)",
            file_path.display(),
            merges.len()
        );

        Ok((vocab, merges))
    }

    /// Rebuild vocabulary and merge rules from a record.
    pub fn deserialize(data: SerializedTokenizer) -> Result<(Vocabulary, MergeRules)> {
        debug!("Deserializing tokenizer written by version {}", data.version);

        let expected = BYTE_VOCAB_SIZE as usize + data.merges.len();
        if data.vocab_size != expected {
            return Err(TokenizerError::Load(format!(
                "vocab_size {} does not match {} merges",
                data.vocab_size,
                data.merges.len()
            )));
        }
        if data.token_to_bytes.len() != expected {
            return Err(TokenizerError::Load(format!(
                "expected {} vocabulary entries, found {}",
                expected,
                data.token_to_bytes.len()
            )));
        }

        // BTreeMap iterates in ID order, so any gap shows up as a mismatch.
        let mut tokens = Vec::with_capacity(expected);
        for (position, (id, bytes)) in data.token_to_bytes.into_iter().enumerate() {
            if id as usize != position {
                return Err(TokenizerError::Load(format!(
                    "vocabulary is missing token {}",
                    position
                )));
            }
            tokens.push(bytes);
        }

        let vocab = Vocabulary::from_tokens(tokens)
            .map_err(|e| TokenizerError::Load(format!("Invalid vocabulary: {}", e)))?;

        let mut merges = MergeRules::with_capacity(data.merges.len());
        for merge in data.merges {
            let pair = (merge.left, merge.right);
            merges.add_merge(pair, merge.new_token_id)?;
            Self::check_merge_bytes(&vocab, pair, merge.new_token_id)?;
        }

        Ok((vocab, merges))
    }

    /// A merged token's bytes must be its pair's bytes concatenated.
    fn check_merge_bytes(vocab: &Vocabulary, pair: (u32, u32), new_token_id: u32) -> Result<()> {
        let bytes_of = |id| {
            vocab
                .get_bytes(id)
                .ok_or(TokenizerError::UnknownTokenId(id))
        };

        let left = bytes_of(pair.0)?;
        let right = bytes_of(pair.1)?;
        let merged = bytes_of(new_token_id)?;

        if merged.len() != left.len() + right.len()
            || !merged.starts_with(left)
            || !merged.ends_with(right)
        {
            return Err(TokenizerError::InvalidMerge(format!(
                "token {} does not hold the bytes of {:?}",
                new_token_id, pair
            )));
        }

        Ok(())
    }
}
