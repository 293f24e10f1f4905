use crate::fingerprint::Fingerprint;
use std::collections::{HashSet, VecDeque};

pub const DEFAULT_DEDUP_CAPACITY: usize = 80;

/// Bounded set of recently seen fingerprints.
///
/// Eviction is FIFO by insertion: nothing is ever re-accessed, so recency of
/// use carries no information. `len() <= capacity` holds after every insert.
#[derive(Debug, Clone)]
pub struct DedupStore {
    capacity: usize,
    order: VecDeque<Fingerprint>,
    members: HashSet<Fingerprint>,
}

impl Default for DedupStore {
    fn default() -> Self {
        Self::new(DEFAULT_DEDUP_CAPACITY)
    }
}

impl DedupStore {
    /// A capacity of 0 is treated as 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            order: VecDeque::with_capacity(capacity),
            members: HashSet::with_capacity(capacity),
        }
    }

    pub fn contains(&self, fp: &Fingerprint) -> bool {
        self.members.contains(fp)
    }

    /// Returns false when the fingerprint was already present (no-op).
    pub fn insert(&mut self, fp: Fingerprint) -> bool {
        if !self.members.insert(fp) {
            return false;
        }
        self.order.push_back(fp);
        while self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.members.remove(&oldest);
            }
        }
        true
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{fingerprint, FeedItem};

    fn fp(n: usize) -> Fingerprint {
        fingerprint(&FeedItem::new(format!("item {n}"), format!("https://news/{n}")))
    }

    #[test]
    fn evicts_oldest_beyond_capacity() {
        let n = 5;
        let mut store = DedupStore::new(n);
        for i in 0..=n {
            assert!(store.insert(fp(i)));
            assert!(store.len() <= n);
        }
        assert_eq!(store.len(), n);
        assert!(!store.contains(&fp(0)));
        for i in 1..=n {
            assert!(store.contains(&fp(i)));
        }
    }

    #[test]
    fn reinsert_is_a_noop_and_does_not_refresh() {
        let mut store = DedupStore::new(2);
        store.insert(fp(1));
        store.insert(fp(2));
        assert!(!store.insert(fp(1)));
        assert_eq!(store.len(), 2);

        // fp(1) is still the oldest insertion, so it goes first
        store.insert(fp(3));
        assert!(!store.contains(&fp(1)));
        assert!(store.contains(&fp(2)));
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let mut store = DedupStore::new(0);
        assert_eq!(store.capacity(), 1);
        store.insert(fp(1));
        store.insert(fp(2));
        assert_eq!(store.len(), 1);
        assert!(store.contains(&fp(2)));
    }
}
