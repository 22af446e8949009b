//! Completion queue.
//!
//! State machines in this crate never call back into user code. They push
//! what happened (a progress change, a finished fade, a command for the
//! renderer) onto a FIFO queue that the owner drains when convenient, so the
//! order in which things happened is exactly the order in which they are read.
//!
//! Owners are expected to drain regularly. A queue holds at most its
//! capacity; pushing into a full queue drops the oldest event.

use std::collections::VecDeque;

/// Events kept by a queue nobody drains.
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// Bounded FIFO queue of events produced by one component.
#[derive(Clone, Debug)]
pub struct CompletionQueue<E> {
    items: VecDeque<E>,
    capacity: usize,
    /// Events dropped because the queue was full
    dropped: u64,
}

impl<E> Default for CompletionQueue<E> {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_QUEUE_CAPACITY)
    }
}

impl<E> CompletionQueue<E> {
    /// Empty queue with the default capacity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty queue holding at most `capacity` events (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: VecDeque::new(),
            capacity: capacity.max(1),
            dropped: 0,
        }
    }

    /// Append an event, dropping the oldest one when full.
    pub fn push(&mut self, event: E) {
        if self.items.len() >= self.capacity {
            self.items.pop_front();
            self.dropped += 1;
            tracing::trace!(
                dropped = self.dropped,
                "completion queue full, oldest event dropped"
            );
        }
        self.items.push_back(event);
    }

    /// Take the oldest event.
    pub fn pop(&mut self) -> Option<E> {
        self.items.pop_front()
    }

    /// Take every queued event, oldest first.
    pub fn drain(&mut self) -> Vec<E> {
        self.items.drain(..).collect()
    }

    /// Number of queued events.
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when nothing is queued.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Maximum number of queued events.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Events dropped since creation because the queue was full.
    #[inline]
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Discard every queued event.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_order() {
        let mut q = CompletionQueue::new();
        q.push(1);
        q.push(2);
        q.push(3);
        assert_eq!(q.pop(), Some(1));
        assert_eq!(q.drain(), vec![2, 3]);
        assert!(q.is_empty());
    }

    #[test]
    fn test_full_queue_drops_oldest() {
        let mut q = CompletionQueue::with_capacity(2);
        q.push("a");
        q.push("b");
        q.push("c");
        assert_eq!(q.len(), 2);
        assert_eq!(q.dropped(), 1);
        assert_eq!(q.drain(), vec!["b", "c"]);

        let mut undrained = CompletionQueue::new();
        for i in 0..1000 {
            undrained.push(i);
        }
        assert_eq!(undrained.len(), DEFAULT_QUEUE_CAPACITY);
        assert_eq!(undrained.pop(), Some(1000 - DEFAULT_QUEUE_CAPACITY));
    }

    #[test]
    fn test_zero_capacity_keeps_latest() {
        let mut q = CompletionQueue::with_capacity(0);
        assert_eq!(q.capacity(), 1);
        q.push(1);
        q.push(2);
        assert_eq!(q.drain(), vec![2]);
    }
}
