//! Priority queue for BPE merge candidates.
//!
//! The encoder uses this queue to apply merges in the same order a
//! rule-by-rule replay would: lowest rank first, and left to right among
//! occurrences of the same rule.

use dary_heap::OctonaryHeap;

/// A pending merge at a position of a symbol sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeCandidate {
    /// Rank of the merge rule (creation index)
    pub rank: u32,
    /// Index of the left symbol of the pair
    pub pos: usize,
    /// Token ID produced by the merge
    pub new_id: u32,
}

impl MergeCandidate {
    /// Create a new merge candidate.
    pub fn new(rank: u32, pos: usize, new_id: u32) -> Self {
        Self { rank, pos, new_id }
    }
}

// The heap is a max-heap: lower rank, then lower position, is "greater".
impl Ord for MergeCandidate {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        other
            .rank
            .cmp(&self.rank)
            .then_with(|| other.pos.cmp(&self.pos))
    }
}

impl PartialOrd for MergeCandidate {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Priority queue of merge candidates.
///
/// Uses an 8-ary heap for better cache locality than a binary heap.
/// Entries may go stale as neighbouring merges consume their symbols; the
/// consumer is expected to re-validate each popped candidate.
pub struct MergeQueue {
    heap: OctonaryHeap<MergeCandidate>,
}

impl MergeQueue {
    /// Create a new empty queue.
    pub fn new() -> Self {
        Self {
            heap: OctonaryHeap::new(),
        }
    }

    /// Create a new queue with the given capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: OctonaryHeap::with_capacity(capacity),
        }
    }

    /// Push a merge candidate onto the queue.
    #[inline]
    pub fn push(&mut self, candidate: MergeCandidate) {
        self.heap.push(candidate);
    }

    /// Pop the candidate with the lowest rank, leftmost first.
    #[inline]
    pub fn pop(&mut self) -> Option<MergeCandidate> {
        self.heap.pop()
    }

    /// Get the number of (potentially stale) entries in the queue.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Check if the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Clear all entries from the queue.
    pub fn clear(&mut self) {
        self.heap.clear();
    }
}

impl Default for MergeQueue {
    fn default() -> Self {
        Self::new()
    }
}
