//! LRU List Module
//!
//! Recency tracking for cache eviction: a doubly linked list over a slot
//! arena, indexed by key, so every operation is O(1).
//!
//! Head = most recently used, tail = least recently used. Links are arena
//! indices rather than owning pointers, which keeps the doubly linked
//! structure free of reference cycles.

use std::collections::HashMap;

#[derive(Debug, Default)]
struct LruNode {
    key: String,
    prev: Option<usize>,
    next: Option<usize>,
}

// == LRU List ==
/// Tracks access order for LRU eviction.
#[derive(Debug, Default)]
pub struct LruList {
    /// Slot arena; freed slots are recycled through `free`
    nodes: Vec<LruNode>,
    free: Vec<usize>,
    /// key -> arena slot, for O(1) splicing
    index: HashMap<String, usize>,
    head: Option<usize>,
    tail: Option<usize>,
}

impl LruList {
    // == Constructor ==
    /// Creates a new empty list.
    pub fn new() -> Self {
        Self::default()
    }

    // == Touch ==
    /// Marks a key as most recently used.
    ///
    /// An already-tracked key is spliced to the head; a new key gets a
    /// fresh node at the head.
    pub fn touch(&mut self, key: &str) {
        if let Some(&slot) = self.index.get(key) {
            self.unlink(slot);
            self.link_front(slot);
        } else {
            let slot = self.alloc(key);
            self.index.insert(key.to_string(), slot);
            self.link_front(slot);
        }
    }

    // == Remove ==
    /// Stops tracking a key. Returns whether it was tracked.
    pub fn remove(&mut self, key: &str) -> bool {
        match self.index.remove(key) {
            Some(slot) => {
                self.unlink(slot);
                self.release(slot);
                true
            }
            None => false,
        }
    }

    // == Evict Oldest ==
    /// Removes and returns the least recently used key.
    pub fn evict_oldest(&mut self) -> Option<String> {
        let slot = self.tail?;
        let key = self.nodes[slot].key.clone();
        self.index.remove(&key);
        self.unlink(slot);
        self.release(slot);
        Some(key)
    }

    // == Peek Oldest ==
    /// Returns the least recently used key without removing it.
    pub fn peek_oldest(&self) -> Option<&str> {
        self.tail.map(|slot| self.nodes[slot].key.as_str())
    }

    // == Length ==
    /// Returns the number of tracked keys.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns true if no keys are tracked.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    // == Contains ==
    /// Checks if a key is being tracked.
    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    // == Clear ==
    /// Drops all tracked keys and recycled slots.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.free.clear();
        self.index.clear();
        self.head = None;
        self.tail = None;
    }

    /// Keys from most to least recently used. Test/debug helper.
    #[cfg(test)]
    pub fn keys_most_recent_first(&self) -> Vec<String> {
        let mut keys = Vec::with_capacity(self.len());
        let mut cur = self.head;
        while let Some(slot) = cur {
            keys.push(self.nodes[slot].key.clone());
            cur = self.nodes[slot].next;
        }
        keys
    }

    // == Internal Plumbing ==
    fn alloc(&mut self, key: &str) -> usize {
        match self.free.pop() {
            Some(slot) => {
                self.nodes[slot].key = key.to_string();
                slot
            }
            None => {
                self.nodes.push(LruNode {
                    key: key.to_string(),
                    prev: None,
                    next: None,
                });
                self.nodes.len() - 1
            }
        }
    }

    fn release(&mut self, slot: usize) {
        self.nodes[slot] = LruNode::default();
        self.free.push(slot);
    }

    /// Detaches a slot from the list, fixing neighbor and end pointers.
    fn unlink(&mut self, slot: usize) {
        let (prev, next) = (self.nodes[slot].prev, self.nodes[slot].next);
        match prev {
            Some(p) => self.nodes[p].next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.nodes[n].prev = prev,
            None => self.tail = prev,
        }
        self.nodes[slot].prev = None;
        self.nodes[slot].next = None;
    }

    /// Attaches a detached slot at the head.
    fn link_front(&mut self, slot: usize) {
        self.nodes[slot].prev = None;
        self.nodes[slot].next = self.head;
        if let Some(old_head) = self.head {
            self.nodes[old_head].prev = Some(slot);
        }
        self.head = Some(slot);
        if self.tail.is_none() {
            self.tail = Some(slot);
        }
    }
}
