//! Vocabulary storage and lookup.
//!
//! Every token ID maps to the raw bytes it expands to. IDs below 256 are the
//! bytes themselves; merged tokens are appended in creation order, so the
//! reverse table is a plain vector indexed by ID.

use super::merges::Pair;
use crate::error::{Result, TokenizerError};
use ahash::AHashMap;

/// Number of single-byte base tokens.
pub const BYTE_VOCAB_SIZE: u32 = 256;

/// Forward mapping: byte sequence -> lowest token ID producing it
pub type Vocab = AHashMap<Vec<u8>, u32>;

/// Reverse mapping: token ID (index) -> byte sequence
pub type VocabR = Vec<Vec<u8>>;

/// Vocabulary with forward and reverse mappings.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    /// Forward mapping: byte sequence -> ID
    vocab: Vocab,
    /// Reverse mapping: ID -> byte sequence
    vocab_r: VocabR,
}

impl Vocabulary {
    /// Create the base byte-level vocabulary (IDs 0-255).
    pub fn new() -> Self {
        Self::with_capacity(BYTE_VOCAB_SIZE as usize)
    }

    /// Create the base vocabulary with room for `capacity` tokens in total.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(BYTE_VOCAB_SIZE as usize);
        let mut vocab = Vocab::with_capacity(capacity);
        let mut vocab_r = VocabR::with_capacity(capacity);

        for byte in 0..=u8::MAX {
            vocab.insert(vec![byte], byte as u32);
            vocab_r.push(vec![byte]);
        }

        Self { vocab, vocab_r }
    }

    /// Rebuild a vocabulary from its byte sequences, indexed by token ID.
    ///
    /// The first 256 entries must be the identity byte tokens.
    pub fn from_tokens(tokens: VocabR) -> Result<Self> {
        if tokens.len() < BYTE_VOCAB_SIZE as usize {
            return Err(TokenizerError::InvalidConfig(format!(
                "vocabulary has {} tokens, expected at least {}",
                tokens.len(),
                BYTE_VOCAB_SIZE
            )));
        }

        for (id, bytes) in tokens.iter().enumerate() {
            if id < BYTE_VOCAB_SIZE as usize && bytes.as_slice() != [id as u8] {
                return Err(TokenizerError::InvalidConfig(format!(
                    "byte token {} maps to {:?}",
                    id, bytes
                )));
            }
            if bytes.is_empty() {
                return Err(TokenizerError::InvalidConfig(format!(
                    "token {} has no bytes",
                    id
                )));
            }
        }

        let mut vocab = Vocab::with_capacity(tokens.len());
        for (id, bytes) in tokens.iter().enumerate() {
            vocab.entry(bytes.clone()).or_insert(id as u32);
        }

        Ok(Self {
            vocab,
            vocab_r: tokens,
        })
    }

    /// Add the token produced by merging `pair`.
    ///
    /// `new_token_id` must be the next free ID.
    pub fn add_merged(&mut self, pair: Pair, new_token_id: u32) -> Result<()> {
        if new_token_id as usize != self.vocab_r.len() {
            return Err(TokenizerError::InvalidMerge(format!(
                "token ID {} is not the next free ID {}",
                new_token_id,
                self.vocab_r.len()
            )));
        }

        let left = self
            .get_bytes(pair.0)
            .ok_or(TokenizerError::UnknownTokenId(pair.0))?;
        let right = self
            .get_bytes(pair.1)
            .ok_or(TokenizerError::UnknownTokenId(pair.1))?;

        let mut bytes = Vec::with_capacity(left.len() + right.len());
        bytes.extend_from_slice(left);
        bytes.extend_from_slice(right);

        self.vocab.entry(bytes.clone()).or_insert(new_token_id);
        self.vocab_r.push(bytes);

        Ok(())
    }

    /// Get the ID for a byte sequence.
    #[inline]
    pub fn get_id(&self, bytes: &[u8]) -> Option<u32> {
        self.vocab.get(bytes).copied()
    }

    /// Get the byte sequence for an ID.
    #[inline]
    pub fn get_bytes(&self, id: u32) -> Option<&[u8]> {
        self.vocab_r.get(id as usize).map(|b| b.as_slice())
    }

    /// Concatenate the bytes of every token in `ids`.
    pub fn decode_bytes(&self, ids: &[u32]) -> Result<Vec<u8>> {
        let mut bytes = Vec::with_capacity(ids.len() * 2);

        for &id in ids {
            let token = self
                .get_bytes(id)
                .ok_or(TokenizerError::UnknownTokenId(id))?;
            bytes.extend_from_slice(token);
        }

        Ok(bytes)
    }

    /// Iterate over `(id, bytes)` in ID order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &[u8])> + '_ {
        self.vocab_r
            .iter()
            .enumerate()
            .map(|(id, bytes)| (id as u32, bytes.as_slice()))
    }

    /// Get the size of the vocabulary.
    #[inline]
    pub fn len(&self) -> usize {
        self.vocab_r.len()
    }

    /// Check if the vocabulary is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vocab_r.is_empty()
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Vocabulary {
    fn eq(&self, other: &Self) -> bool {
        self.vocab_r == other.vocab_r
    }
}

impl Eq for Vocabulary {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_vocabulary() {
        let vocab = Vocabulary::new();
        assert_eq!(vocab.len(), 256);
        assert_eq!(vocab.get_bytes(0), Some(&[0u8][..]));
        assert_eq!(vocab.get_bytes(b'h' as u32), Some(&b"h"[..]));
        assert_eq!(vocab.get_bytes(255), Some(&[255u8][..]));
        assert_eq!(vocab.get_bytes(256), None);
        assert_eq!(vocab.get_id(b"z"), Some(b'z' as u32));
    }

    #[test]
    fn test_add_merged() {
        let mut vocab = Vocabulary::new();
        vocab.add_merged((b'l' as u32, b'l' as u32), 256).unwrap();
        vocab.add_merged((b'e' as u32, 256), 257).unwrap();

        assert_eq!(vocab.get_bytes(256), Some(&b"ll"[..]));
        assert_eq!(vocab.get_bytes(257), Some(&b"ell"[..]));
        assert_eq!(vocab.get_id(b"ell"), Some(257));
        assert_eq!(vocab.len(), 258);
    }

    #[test]
    fn test_add_merged_rejects_gaps_and_unknown_tokens() {
        let mut vocab = Vocabulary::new();
        assert!(vocab.add_merged((1, 2), 300).is_err());
        assert!(matches!(
            vocab.add_merged((1, 999), 256),
            Err(TokenizerError::UnknownTokenId(999))
        ));
        assert_eq!(vocab.len(), 256);
    }

    #[test]
    fn test_duplicate_bytes_keep_lowest_id() {
        let mut vocab = Vocabulary::new();
        vocab.add_merged((b'a' as u32, b'b' as u32), 256).unwrap();
        vocab.add_merged((b'b' as u32, b'c' as u32), 257).unwrap();
        vocab.add_merged((256, b'c' as u32), 258).unwrap();
        vocab.add_merged((b'a' as u32, 257), 259).unwrap();

        assert_eq!(vocab.get_bytes(258), vocab.get_bytes(259));
        assert_eq!(vocab.get_id(b"abc"), Some(258));
    }

    #[test]
    fn test_decode_bytes() {
        let mut vocab = Vocabulary::new();
        vocab.add_merged((b'h' as u32, b'i' as u32), 256).unwrap();

        assert_eq!(vocab.decode_bytes(&[256, b'!' as u32]).unwrap(), b"hi!");
        assert!(vocab.decode_bytes(&[]).unwrap().is_empty());
        assert!(matches!(
            vocab.decode_bytes(&[256, 257]),
            Err(TokenizerError::UnknownTokenId(257))
        ));
    }

    #[test]
    fn test_from_tokens_roundtrip() {
        let mut vocab = Vocabulary::new();
        vocab.add_merged((b'a' as u32, b'a' as u32), 256).unwrap();

        let tokens: VocabR = vocab.iter().map(|(_, b)| b.to_vec()).collect();
        let rebuilt = Vocabulary::from_tokens(tokens).unwrap();

        assert_eq!(rebuilt, vocab);
        assert_eq!(rebuilt.get_id(b"aa"), Some(256));
    }

    #[test]
    fn test_from_tokens_validates_byte_tokens() {
        let mut tokens: VocabR = (0..=255u8).map(|b| vec![b]).collect();
        tokens[7] = vec![8];
        assert!(Vocabulary::from_tokens(tokens).is_err());

        let short: VocabR = (0..10u8).map(|b| vec![b]).collect();
        assert!(Vocabulary::from_tokens(short).is_err());
    }
}
