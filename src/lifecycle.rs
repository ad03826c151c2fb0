//! Despawn removal scheduling
//!
//! A despawned agent keeps its sprite briefly so its visual exit
//! transition can complete. Removals are held as future events in a
//! priority queue owned by the engine and drained from the tick, so no
//! removal can fire outside the single-writer update path. Scheduled
//! removals are not cancelable.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use crate::agent::AgentId;
use crate::stage::PageId;

/// One scheduled sprite removal, due at an engine-clock instant.
#[derive(Debug, Clone, Copy)]
struct PendingRemoval {
    due: f64,
    page: PageId,
    agent: AgentId,
}

impl PartialEq for PendingRemoval {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PendingRemoval {}

impl PartialOrd for PendingRemoval {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PendingRemoval {
    fn cmp(&self, other: &Self) -> Ordering {
        self.due
            .total_cmp(&other.due)
            .then_with(|| self.agent.cmp(&other.agent))
    }
}

/// Min-heap of pending removals, earliest due first.
#[derive(Debug, Default)]
pub struct RemovalQueue {
    heap: BinaryHeap<Reverse<PendingRemoval>>,
}

impl RemovalQueue {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
        }
    }

    /// Schedule an agent's sprite removal at engine-clock second `due`.
    pub fn schedule(&mut self, due: f64, page: PageId, agent: AgentId) {
        self.heap.push(Reverse(PendingRemoval { due, page, agent }));
    }

    /// Pop the next removal due at or before `now`, earliest first.
    /// Returns `None` while nothing is due.
    pub fn pop_due(&mut self, now: f64) -> Option<(PageId, AgentId)> {
        match self.heap.peek() {
            Some(Reverse(pending)) if pending.due <= now => self
                .heap
                .pop()
                .map(|Reverse(p)| (p.page, p.agent)),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pop_due_in_order() {
        let mut queue = RemovalQueue::new();
        queue.schedule(0.3, PageId(0), AgentId(3));
        queue.schedule(0.1, PageId(1), AgentId(1));
        queue.schedule(0.2, PageId(0), AgentId(2));

        assert_eq!(queue.pop_due(1.0), Some((PageId(1), AgentId(1))));
        assert_eq!(queue.pop_due(1.0), Some((PageId(0), AgentId(2))));
        assert_eq!(queue.pop_due(1.0), Some((PageId(0), AgentId(3))));
        assert_eq!(queue.pop_due(1.0), None);
    }

    #[test]
    fn test_not_due_yet_stays_queued() {
        let mut queue = RemovalQueue::new();
        queue.schedule(0.5, PageId(0), AgentId(1));

        assert_eq!(queue.pop_due(0.4), None);
        assert_eq!(queue.len(), 1);

        assert_eq!(queue.pop_due(0.5), Some((PageId(0), AgentId(1))));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_same_due_breaks_ties_by_agent() {
        let mut queue = RemovalQueue::new();
        queue.schedule(0.2, PageId(0), AgentId(9));
        queue.schedule(0.2, PageId(0), AgentId(4));

        assert_eq!(queue.pop_due(1.0), Some((PageId(0), AgentId(4))));
        assert_eq!(queue.pop_due(1.0), Some((PageId(0), AgentId(9))));
    }
}
