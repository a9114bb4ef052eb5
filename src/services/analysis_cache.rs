// Analysis Cache
// Caller-owned memo of finished analyses keyed by an external item id.
// Bounded; the oldest inserted entry is evicted first.

use std::collections::{HashMap, VecDeque};

pub struct AnalysisCache<V> {
    capacity: usize,
    entries: HashMap<String, V>,
    order: VecDeque<String>,
}

impl<V: Clone> AnalysisCache<V> {
    /// A capacity of 0 disables caching.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&V> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Insert or replace. Replacing keeps the entry's original eviction position.
    pub fn insert(&mut self, id: impl Into<String>, value: V) {
        if self.capacity == 0 {
            return;
        }
        let id = id.into();
        if let Some(slot) = self.entries.get_mut(&id) {
            *slot = value;
            return;
        }
        while self.entries.len() >= self.capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            self.entries.remove(&oldest);
        }
        self.order.push_back(id.clone());
        self.entries.insert(id, value);
    }

    pub fn remove(&mut self, id: &str) -> Option<V> {
        let removed = self.entries.remove(id)?;
        self.order.retain(|k| k != id);
        Some(removed)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
