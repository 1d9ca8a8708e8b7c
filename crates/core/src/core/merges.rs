//! Merge rule management for BPE.
//!
//! Merge rules are stored using token IDs rather than byte strings for fast
//! comparison. The table remembers creation order, which is the order the
//! rules must be replayed in when encoding.

use super::vocab::BYTE_VOCAB_SIZE;
use crate::error::{Result, TokenizerError};
use ahash::AHashMap;

/// A pair of token IDs that can be merged.
pub type Pair = (u32, u32);

/// Merge rule mapping: pair -> (rank, new_token_id).
///
/// The rank is the creation index of the rule (lower rank = created earlier =
/// applied first). The new_token_id is always `256 + rank`.
pub type MergeMap = AHashMap<Pair, (u32, u32)>;

/// Ordered collection of BPE merge rules with constant-time pair lookup.
#[derive(Debug, Clone, Default)]
pub struct MergeRules {
    /// Merge rules: pair -> (rank, new_token_id)
    merges: MergeMap,
    /// Pairs in creation order; index is the rank
    order: Vec<Pair>,
}

impl MergeRules {
    /// Create a new empty collection of merge rules.
    pub fn new() -> Self {
        Self {
            merges: MergeMap::new(),
            order: Vec::new(),
        }
    }

    /// Create a new collection with capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            merges: MergeMap::with_capacity(capacity),
            order: Vec::with_capacity(capacity),
        }
    }

    /// The ID the next merge rule will be assigned.
    #[inline]
    pub fn next_token_id(&self) -> u32 {
        BYTE_VOCAB_SIZE + self.order.len() as u32
    }

    /// Append a merge rule, assigning it the next token ID.
    pub fn push(&mut self, pair: Pair) -> Result<u32> {
        let new_token_id = self.next_token_id();
        self.add_merge(pair, new_token_id)?;
        Ok(new_token_id)
    }

    /// Add a merge rule with an explicit token ID.
    ///
    /// The ID must be the next contiguous ID, the pair must not already be
    /// present, and both halves of the pair must refer to existing tokens.
    pub fn add_merge(&mut self, pair: Pair, new_token_id: u32) -> Result<()> {
        let expected = self.next_token_id();
        if new_token_id != expected {
            return Err(TokenizerError::InvalidMerge(format!(
                "merge {:?} has token ID {}, expected {}",
                pair, new_token_id, expected
            )));
        }
        if pair.0 >= new_token_id || pair.1 >= new_token_id {
            return Err(TokenizerError::InvalidMerge(format!(
                "merge {:?} refers to a token not created before {}",
                pair, new_token_id
            )));
        }
        if self.merges.contains_key(&pair) {
            return Err(TokenizerError::InvalidMerge(format!(
                "duplicate merge {:?}",
                pair
            )));
        }

        let rank = self.order.len() as u32;
        self.merges.insert(pair, (rank, new_token_id));
        self.order.push(pair);
        Ok(())
    }

    /// Get the merge rule for a pair.
    ///
    /// Returns Some((rank, new_token_id)) if this pair should be merged,
    /// None otherwise.
    #[inline]
    pub fn get(&self, pair: Pair) -> Option<(u32, u32)> {
        self.merges.get(&pair).copied()
    }

    /// Get the pair that produced a merged token.
    pub fn pair_for(&self, token_id: u32) -> Option<Pair> {
        let rank = token_id.checked_sub(BYTE_VOCAB_SIZE)?;
        self.order.get(rank as usize).copied()
    }

    /// Iterate over `(pair, new_token_id)` in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (Pair, u32)> + '_ {
        self.order
            .iter()
            .enumerate()
            .map(|(rank, &pair)| (pair, BYTE_VOCAB_SIZE + rank as u32))
    }

    /// Get the number of merge rules.
    #[inline]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Check if there are no merge rules.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Remove all merge rules.
    pub fn clear(&mut self) {
        self.merges.clear();
        self.order.clear();
    }
}

impl PartialEq for MergeRules {
    fn eq(&self, other: &Self) -> bool {
        // IDs and ranks are derived from position, so order is the whole state
        self.order == other.order
    }
}

impl Eq for MergeRules {}

/// Replace every non-overlapping occurrence of `pair`, scanning left to right.
///
/// Rewrites `tokens` in place and returns how many replacements were made.
pub fn merge_pair(tokens: &mut Vec<u32>, pair: Pair, new_token_id: u32) -> usize {
    let len = tokens.len();
    let mut read = 0;
    let mut write = 0;
    let mut merged = 0;

    while read < len {
        if read + 1 < len && tokens[read] == pair.0 && tokens[read + 1] == pair.1 {
            tokens[write] = new_token_id;
            read += 2;
            merged += 1;
        } else {
            tokens[write] = tokens[read];
            read += 1;
        }
        write += 1;
    }

    tokens.truncate(write);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_assigns_contiguous_ids() {
        let mut rules = MergeRules::new();
        assert_eq!(rules.push((104, 101)).unwrap(), 256);
        assert_eq!(rules.push((256, 108)).unwrap(), 257);

        assert_eq!(rules.get((104, 101)), Some((0, 256)));
        assert_eq!(rules.get((256, 108)), Some((1, 257)));
        assert_eq!(rules.get((1, 2)), None);
        assert_eq!(rules.len(), 2);
    }

    #[test]
    fn test_iter_preserves_creation_order() {
        let mut rules = MergeRules::new();
        rules.push((200, 1)).unwrap();
        rules.push((3, 4)).unwrap();
        rules.push((256, 257)).unwrap();

        let collected: Vec<_> = rules.iter().collect();
        assert_eq!(
            collected,
            vec![((200, 1), 256), ((3, 4), 257), ((256, 257), 258)]
        );
        assert_eq!(rules.pair_for(257), Some((3, 4)));
        assert_eq!(rules.pair_for(97), None);
        assert_eq!(rules.pair_for(300), None);
    }

    #[test]
    fn test_rejects_duplicate_pair() {
        let mut rules = MergeRules::new();
        rules.push((1, 2)).unwrap();
        let err = rules.push((1, 2)).unwrap_err();
        assert!(matches!(err, TokenizerError::InvalidMerge(_)));
        assert_eq!(rules.len(), 1);
    }

    #[test]
    fn test_rejects_non_contiguous_id() {
        let mut rules = MergeRules::new();
        assert!(rules.add_merge((1, 2), 300).is_err());
        assert!(rules.add_merge((1, 256), 256).is_err());
        assert!(rules.add_merge((1, 2), 256).is_ok());
    }

    #[test]
    fn test_equality_follows_order() {
        let mut a = MergeRules::new();
        a.push((1, 2)).unwrap();
        a.push((3, 4)).unwrap();

        let mut b = MergeRules::new();
        b.push((3, 4)).unwrap();
        b.push((1, 2)).unwrap();

        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn test_merge_pair_is_non_overlapping() {
        let mut tokens = vec![97, 97, 97];
        assert_eq!(merge_pair(&mut tokens, (97, 97), 256), 1);
        assert_eq!(tokens, vec![256, 97]);

        let mut tokens = vec![97, 97, 97, 97];
        assert_eq!(merge_pair(&mut tokens, (97, 97), 256), 2);
        assert_eq!(tokens, vec![256, 256]);
    }

    #[test]
    fn test_merge_pair_without_match() {
        let mut tokens = vec![1, 2, 3];
        assert_eq!(merge_pair(&mut tokens, (3, 1), 256), 0);
        assert_eq!(tokens, vec![1, 2, 3]);

        let mut empty: Vec<u32> = Vec::new();
        assert_eq!(merge_pair(&mut empty, (1, 2), 256), 0);
        assert!(empty.is_empty());
    }
}
