//! Duplicate filter
//!
//! Remembers recently seen reading ids in a bounded set. When the set grows
//! past capacity, roughly a tenth of it is evicted in bulk, in arbitrary
//! order. An evicted id may be admitted again (false negative); an id never
//! seen is never reported as a duplicate.

use std::collections::HashSet;

use parking_lot::Mutex;

/// Bounded set of recently seen ids
#[derive(Debug)]
pub struct DuplicateFilter {
    seen: Mutex<HashSet<String>>,
    capacity: usize,
}

impl DuplicateFilter {
    /// Create a filter holding at most `capacity` ids (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            seen: Mutex::new(HashSet::with_capacity(capacity.min(1 << 16))),
            capacity,
        }
    }

    /// Check an id, recording it when it is new
    ///
    /// Returns `true` if the id was already in the window.
    pub fn is_duplicate(&self, id: &str) -> bool {
        let mut seen = self.seen.lock();
        if seen.contains(id) {
            return true;
        }

        seen.insert(id.to_string());

        if seen.len() > self.capacity {
            let evict = (self.capacity / 10).max(1);
            let victims: Vec<String> = seen.iter().take(evict).cloned().collect();
            for victim in &victims {
                seen.remove(victim);
            }
            tracing::debug!(evicted = victims.len(), remaining = seen.len(), "dedup window trimmed");
        }

        false
    }

    /// Ids currently held
    pub fn len(&self) -> usize {
        self.seen.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
