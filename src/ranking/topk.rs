use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use super::types::ScoredUnit;

/// Heap ordering: higher score is greater; on equal scores the earlier position is
/// greater, so it survives eviction and sorts first.
#[derive(Debug)]
struct HeapEntry(ScoredUnit);

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .score
            .total_cmp(&other.0.score)
            .then_with(|| other.0.unit.position.cmp(&self.0.unit.position))
    }
}

/// Bounded min-heap holding the `k` best units seen so far.
#[derive(Debug)]
pub struct TopK {
    capacity: usize,
    heap: BinaryHeap<Reverse<HeapEntry>>,
}

impl TopK {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            heap: BinaryHeap::with_capacity(capacity.saturating_add(1)),
        }
    }

    /// Inserts while below capacity; afterwards replaces the minimum only when
    /// `candidate` scores strictly higher. Returns whether it was kept.
    pub fn offer(&mut self, candidate: ScoredUnit) -> bool {
        if self.capacity == 0 {
            return false;
        }

        if self.heap.len() < self.capacity {
            self.heap.push(Reverse(HeapEntry(candidate)));
            return true;
        }

        let Some(Reverse(min)) = self.heap.peek() else {
            return false;
        };
        if candidate.score > min.0.score {
            self.heap.pop();
            self.heap.push(Reverse(HeapEntry(candidate)));
            true
        } else {
            false
        }
    }

    /// Lowest score currently held.
    pub fn min_score(&self) -> Option<f32> {
        self.heap.peek().map(|Reverse(entry)| entry.0.score)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Score descending, position ascending.
    pub fn into_ranked(self) -> Vec<ScoredUnit> {
        self.heap
            .into_sorted_vec()
            .into_iter()
            .map(|Reverse(entry)| entry.0)
            .collect()
    }
}
