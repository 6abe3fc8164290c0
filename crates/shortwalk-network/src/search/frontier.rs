//! Priority frontier shared by both search strategies.
//!
//! A binary heap keyed by `(score, insertion sequence)`. Lowering a
//! vertex's score pushes a fresh entry and stamps the vertex with the new
//! sequence number; entries whose sequence no longer matches the stamp
//! are stale and skipped on pop. Equal scores pop in insertion order, so
//! results never depend on heap internals.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Stamp of a vertex that is not on the frontier.
const NOT_OPEN: u64 = u64::MAX;

#[derive(Debug, Clone, Copy)]
struct Entry {
    score: f64,
    seq: u64,
    vertex: usize,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    // Reversed so the max-heap pops the lowest score, then the oldest entry.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// The open set of a search: discovered vertices not yet finalized.
#[derive(Debug)]
pub struct Frontier {
    heap: BinaryHeap<Entry>,
    stamps: Vec<u64>,
    next_seq: u64,
}

impl Frontier {
    /// An empty frontier over `vertex_count` vertices.
    pub fn new(vertex_count: usize) -> Self {
        Self {
            heap: BinaryHeap::new(),
            stamps: vec![NOT_OPEN; vertex_count],
            next_seq: 0,
        }
    }

    /// Open `vertex` at `score`, replacing any earlier entry.
    pub fn push(&mut self, vertex: usize, score: f64) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.stamps[vertex] = seq;
        self.heap.push(Entry { score, seq, vertex });
    }

    /// Remove and return the open vertex with the lowest score.
    pub fn pop(&mut self) -> Option<usize> {
        while let Some(entry) = self.heap.pop() {
            if self.stamps[entry.vertex] == entry.seq {
                self.stamps[entry.vertex] = NOT_OPEN;
                return Some(entry.vertex);
            }
        }
        None
    }

    /// Whether `vertex` is open; out-of-range vertices never are.
    pub fn contains(&self, vertex: usize) -> bool {
        self.stamps.get(vertex).is_some_and(|&s| s != NOT_OPEN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_lowest_score_first() {
        let mut f = Frontier::new(4);
        f.push(0, 3.0);
        f.push(1, 1.0);
        f.push(2, 2.0);
        assert_eq!(f.pop(), Some(1));
        assert_eq!(f.pop(), Some(2));
        assert_eq!(f.pop(), Some(0));
        assert_eq!(f.pop(), None);
    }

    #[test]
    fn ties_pop_in_insertion_order() {
        let mut f = Frontier::new(4);
        f.push(3, 1.0);
        f.push(0, 1.0);
        f.push(2, 1.0);
        assert_eq!(f.pop(), Some(3));
        assert_eq!(f.pop(), Some(0));
        assert_eq!(f.pop(), Some(2));
    }

    #[test]
    fn lowering_a_score_discards_the_stale_entry() {
        let mut f = Frontier::new(3);
        f.push(0, 5.0);
        f.push(1, 4.0);
        f.push(0, 1.0);
        assert_eq!(f.pop(), Some(0));
        assert_eq!(f.pop(), Some(1));
        assert_eq!(f.pop(), None);
    }

    #[test]
    fn contains_tracks_open_vertices() {
        let mut f = Frontier::new(2);
        assert!(!f.contains(0));
        f.push(0, 1.0);
        assert!(f.contains(0));
        f.pop();
        assert!(!f.contains(0));
        assert!(!f.contains(7));
    }
}
