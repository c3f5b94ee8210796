//! Capacity-bounded FIFO queue of displayed ads

use std::collections::VecDeque;

/// Insertion-ordered queue that never holds more than `capacity` items
///
/// Pushing past capacity evicts the oldest item and hands it back to the
/// caller so the associated scene entity can be detached.
#[derive(Debug, Clone)]
pub struct AdQueue<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> AdQueue<T> {
    /// Default number of ads shown at once
    pub const DEFAULT_CAPACITY: usize = 2;

    /// Create a queue; a capacity of zero is raised to one
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    /// Append an item, returning the evicted oldest item on overflow
    pub fn push(&mut self, item: T) -> Option<T> {
        self.items.push_back(item);
        if self.items.len() > self.capacity {
            self.items.pop_front()
        } else {
            None
        }
    }

    /// Change the capacity, returning any items evicted oldest-first
    pub fn set_capacity(&mut self, capacity: usize) -> Vec<T> {
        self.capacity = capacity.max(1);
        let mut evicted = Vec::new();
        while self.items.len() > self.capacity {
            if let Some(item) = self.items.pop_front() {
                evicted.push(item);
            }
        }
        evicted
    }

    /// Remove the first item matching the predicate
    pub fn remove_first<F>(&mut self, mut predicate: F) -> Option<T>
    where
        F: FnMut(&T) -> bool,
    {
        let index = self.items.iter().position(|item| predicate(item))?;
        self.items.remove(index)
    }

    pub fn oldest(&self) -> Option<&T> {
        self.items.front()
    }

    pub fn newest(&self) -> Option<&T> {
        self.items.back()
    }

    /// Iterate oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    /// Remove everything, oldest first
    pub fn drain(&mut self) -> Vec<T> {
        self.items.drain(..).collect()
    }
}

impl<T> Default for AdQueue<T> {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_default_capacity_evicts_oldest() {
        let mut queue = AdQueue::default();
        assert_eq!(queue.push("a"), None);
        assert_eq!(queue.push("b"), None);
        assert!(queue.is_full());
        assert_eq!(queue.push("c"), Some("a"));
        assert_eq!(queue.iter().copied().collect::<Vec<_>>(), vec!["b", "c"]);
    }

    #[test]
    fn test_zero_capacity_clamped() {
        let mut queue = AdQueue::new(0);
        assert_eq!(queue.capacity(), 1);
        queue.push(1);
        assert_eq!(queue.push(2), Some(1));
    }

    #[test]
    fn test_shrink_capacity() {
        let mut queue = AdQueue::new(4);
        for i in 0..4 {
            queue.push(i);
        }
        assert_eq!(queue.set_capacity(2), vec![0, 1]);
        assert_eq!(queue.iter().copied().collect::<Vec<_>>(), vec![2, 3]);
    }

    #[test]
    fn test_remove_first() {
        let mut queue = AdQueue::new(3);
        queue.push(1);
        queue.push(2);
        queue.push(3);
        assert_eq!(queue.remove_first(|v| *v == 2), Some(2));
        assert_eq!(queue.remove_first(|v| *v == 9), None);
        assert_eq!(queue.oldest(), Some(&1));
        assert_eq!(queue.newest(), Some(&3));
    }

    proptest! {
        #[test]
        fn keeps_most_recent_in_order(capacity in 1usize..8, extra in 1usize..20) {
            let total = capacity + extra;
            let mut queue = AdQueue::new(capacity);
            let mut evicted = Vec::new();
            for i in 0..total {
                if let Some(old) = queue.push(i) {
                    evicted.push(old);
                }
                prop_assert!(queue.len() <= capacity);
            }

            let remaining: Vec<usize> = queue.iter().copied().collect();
            let expected: Vec<usize> = (total - capacity..total).collect();
            prop_assert_eq!(remaining, expected);
            prop_assert_eq!(evicted, (0..total - capacity).collect::<Vec<_>>());
        }
    }
}
