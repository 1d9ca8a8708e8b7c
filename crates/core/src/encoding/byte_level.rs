//! Byte-level BPE encoding.
//!
//! Text is turned into its UTF-8 bytes, each byte is a base token, and the
//! learned merge rules are applied on top. Decoding concatenates the bytes of
//! each token and converts them back to text lossily.

use crate::core::merges::merge_pair;
use crate::core::priority::{MergeCandidate, MergeQueue};
use crate::core::{MergeRules, Vocabulary};
use crate::Result;
use std::sync::Arc;

/// Marks a missing neighbour in the symbol list.
const NONE: usize = usize::MAX;

/// A symbol of the sequence being encoded, linked to its live neighbours.
#[derive(Debug, Clone, Copy)]
struct Symbol {
    id: u32,
    prev: usize,
    next: usize,
    alive: bool,
}

/// Byte-level BPE encoder.
///
/// Vocabulary and merges are shared through `Arc`, so rebuilding the encoder
/// after training or loading does not copy the tables.
#[derive(Debug, Clone)]
pub struct ByteLevelEncoder {
    /// Token ID -> bytes
    vocab: Arc<Vocabulary>,
    /// Ordered merge rules
    merges: Arc<MergeRules>,
}

impl ByteLevelEncoder {
    /// Create a new encoder that takes ownership of the tables.
    pub fn new(vocab: Vocabulary, merges: MergeRules) -> Self {
        Self::with_arcs(Arc::new(vocab), Arc::new(merges))
    }

    /// Create a new encoder sharing already wrapped tables.
    pub fn with_arcs(vocab: Arc<Vocabulary>, merges: Arc<MergeRules>) -> Self {
        Self { vocab, merges }
    }

    /// The vocabulary used for decoding.
    pub fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }

    /// The merge rules used for encoding.
    pub fn merges(&self) -> &MergeRules {
        &self.merges
    }

    /// Encode text into token IDs.
    ///
    /// Produces exactly what [`encode_replay`](Self::encode_replay) produces,
    /// but only touches pairs that actually have a merge rule: a min-heap
    /// keyed by (rank, position) drives the merges over a linked list of
    /// symbols.
    pub fn encode(&self, text: &str) -> Vec<u32> {
        let bytes = text.as_bytes();
        if bytes.len() < 2 || self.merges.is_empty() {
            return bytes.iter().map(|&b| b as u32).collect();
        }

        let last = bytes.len() - 1;
        let mut symbols: Vec<Symbol> = bytes
            .iter()
            .enumerate()
            .map(|(i, &b)| Symbol {
                id: b as u32,
                prev: if i == 0 { NONE } else { i - 1 },
                next: if i == last { NONE } else { i + 1 },
                alive: true,
            })
            .collect();

        let mut queue = MergeQueue::with_capacity(bytes.len());
        for pos in 0..last {
            self.push_candidate(&mut queue, &symbols, pos);
        }

        while let Some(candidate) = queue.pop() {
            let left = symbols[candidate.pos];
            if !left.alive || left.next == NONE {
                continue;
            }

            // Rules are unique per pair, so a matching rank means the pair at
            // this position is still the one the candidate was queued for.
            let right_pos = left.next;
            let pair = (left.id, symbols[right_pos].id);
            match self.merges.get(pair) {
                Some((rank, _)) if rank == candidate.rank => {}
                _ => continue,
            }

            let after = symbols[right_pos].next;
            symbols[candidate.pos].id = candidate.new_id;
            symbols[candidate.pos].next = after;
            symbols[right_pos].alive = false;
            if after != NONE {
                symbols[after].prev = candidate.pos;
            }

            if left.prev != NONE {
                self.push_candidate(&mut queue, &symbols, left.prev);
            }
            self.push_candidate(&mut queue, &symbols, candidate.pos);
        }

        // The first symbol is never consumed: merges keep the left position.
        let mut ids = Vec::with_capacity(bytes.len());
        let mut pos = 0;
        while pos != NONE {
            ids.push(symbols[pos].id);
            pos = symbols[pos].next;
        }

        ids
    }

    /// Queue the pair starting at `pos` if a merge rule exists for it.
    #[inline]
    fn push_candidate(&self, queue: &mut MergeQueue, symbols: &[Symbol], pos: usize) {
        let next = symbols[pos].next;
        if next == NONE {
            return;
        }

        if let Some((rank, new_id)) = self.merges.get((symbols[pos].id, symbols[next].id)) {
            queue.push(MergeCandidate::new(rank, pos, new_id));
        }
    }

    /// Encode text by replaying every merge rule in creation order.
    ///
    /// Each rule collapses all non-overlapping occurrences of its pair, left to
    /// right, exactly as the training loop rewrote the corpus. This runs in
    /// O(merges * length) and is the reference [`encode`](Self::encode) must
    /// agree with.
    pub fn encode_replay(&self, text: &str) -> Vec<u32> {
        let mut tokens: Vec<u32> = text.bytes().map(u32::from).collect();

        for (pair, new_id) in self.merges.iter() {
            if tokens.len() < 2 {
                break;
            }
            merge_pair(&mut tokens, pair, new_id);
        }

        tokens
    }

    /// Decode token IDs into the raw bytes they stand for.
    pub fn decode_bytes(&self, ids: &[u32]) -> Result<Vec<u8>> {
        self.vocab.decode_bytes(ids)
    }

    /// Decode token IDs back to text.
    ///
    /// Byte sequences that are not valid UTF-8 become U+FFFD. Unknown token
    /// IDs are an error.
    pub fn decode(&self, ids: &[u32]) -> Result<String> {
        let bytes = self.decode_bytes(ids)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

impl Default for ByteLevelEncoder {
    fn default() -> Self {
        Self::new(Vocabulary::new(), MergeRules::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TokenizerError;

    const A: u32 = b'a' as u32;
    const B: u32 = b'b' as u32;
    const C: u32 = b'c' as u32;

    fn encoder_with(pairs: &[(u32, u32)]) -> ByteLevelEncoder {
        let mut vocab = Vocabulary::new();
        let mut merges = MergeRules::new();
        for &pair in pairs {
            let id = merges.push(pair).unwrap();
            vocab.add_merged(pair, id).unwrap();
        }
        ByteLevelEncoder::new(vocab, merges)
    }

    #[test]
    fn test_encode_without_merges_is_bytes() {
        let encoder = ByteLevelEncoder::default();
        assert_eq!(encoder.encode("hi!"), vec![104, 105, 33]);
        assert_eq!(encoder.encode("é"), vec![0xC3, 0xA9]);
    }

    #[test]
    fn test_empty_input() {
        let encoder = encoder_with(&[(A, B)]);
        assert!(encoder.encode("").is_empty());
        assert!(encoder.encode_replay("").is_empty());
        assert_eq!(encoder.decode(&[]).unwrap(), "");
    }

    #[test]
    fn test_merges_apply_in_creation_order() {
        // (a,b) was learned before (b,c): "abc" must become [ab, c].
        let encoder = encoder_with(&[(A, B), (B, C)]);
        assert_eq!(encoder.encode("abc"), vec![256, C]);
        assert_eq!(encoder.encode_replay("abc"), vec![256, C]);

        // Learned the other way round, the same text encodes differently.
        let reversed = encoder_with(&[(B, C), (A, B)]);
        assert_eq!(reversed.encode("abc"), vec![A, 256]);
    }

    #[test]
    fn test_later_merges_build_on_earlier_ones() {
        let encoder = encoder_with(&[(A, B), (256, C), (257, 257)]);
        assert_eq!(encoder.encode("abc"), vec![257]);
        assert_eq!(encoder.encode("abcabc"), vec![258]);
        assert_eq!(encoder.encode("abcab"), vec![257, 256]);
    }

    #[test]
    fn test_overlapping_pairs_merge_left_to_right() {
        let encoder = encoder_with(&[(A, A)]);
        assert_eq!(encoder.encode("aaa"), vec![256, A]);
        assert_eq!(encoder.encode("aaaa"), vec![256, 256]);
        assert_eq!(encoder.encode("aaaaa"), vec![256, 256, A]);
    }

    #[test]
    fn test_encode_matches_replay() {
        let encoder = encoder_with(&[
            (A, A),
            (A, B),
            (256, A),
            (B, C),
            (257, 259),
            (256, 256),
            (C, A),
            (261, 258),
        ]);

        let inputs = [
            "a", "aa", "aaa", "aaaa", "aaaaaaa", "ab", "abc", "aabc", "abcabca", "caaab",
            "cacaca", "aaabcaaab", "bcbcbc", "abababab", "aabcaaaab", "xyz", "a b c",
        ];
        for input in inputs {
            assert_eq!(
                encoder.encode(input),
                encoder.encode_replay(input),
                "mismatch for {:?}",
                input
            );
        }
    }

    #[test]
    fn test_roundtrip() {
        let encoder = encoder_with(&[(A, B), (256, C), (b' ' as u32, A)]);
        for text in ["abc abc", "Hello, world!", "日本語 abc", "🎉ab"] {
            let ids = encoder.encode(text);
            assert_eq!(encoder.decode(&ids).unwrap(), text);
        }
    }

    #[test]
    fn test_decode_replaces_invalid_utf8() {
        let encoder = ByteLevelEncoder::default();
        // Truncated three-byte sequence for '€' followed by 'a'
        let decoded = encoder.decode(&[0xE2, 0x82, A]).unwrap();
        assert_eq!(decoded, "\u{FFFD}a");
        assert_eq!(encoder.decode_bytes(&[0xE2, 0x82]).unwrap(), vec![0xE2, 0x82]);
    }

    #[test]
    fn test_decode_unknown_token() {
        let encoder = encoder_with(&[(A, B)]);
        assert!(matches!(
            encoder.decode(&[256, 257]),
            Err(TokenizerError::UnknownTokenId(257))
        ));
    }
}
