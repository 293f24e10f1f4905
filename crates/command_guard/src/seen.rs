use chrono::{DateTime, Duration, Utc};
use std::collections::{HashMap, VecDeque};
use std::hash::Hash;

pub const DEFAULT_SEEN_RETENTION_SECS: i64 = 60;

/// Ids of recently handled inbound events, with timed self-expiry.
#[derive(Debug)]
pub struct SeenIds<K> {
    first_seen: HashMap<K, DateTime<Utc>>,
    order: VecDeque<(K, DateTime<Utc>)>,
    retention: Duration,
}

impl<K: Hash + Eq + Clone> SeenIds<K> {
    pub fn new(retention: Duration) -> Self {
        Self {
            first_seen: HashMap::new(),
            order: VecDeque::new(),
            retention,
        }
    }

    /// Check and mark in one step: true when `id` was already seen within
    /// the retention window, otherwise records it and returns false.
    pub fn seen(&mut self, id: K, now: DateTime<Utc>) -> bool {
        self.expire(now);
        if self.first_seen.contains_key(&id) {
            return true;
        }
        self.first_seen.insert(id.clone(), now);
        self.order.push_back((id, now));
        false
    }

    fn expire(&mut self, now: DateTime<Utc>) {
        while let Some((_, at)) = self.order.front() {
            if now.signed_duration_since(*at) < self.retention {
                break;
            }
            if let Some((id, _)) = self.order.pop_front() {
                self.first_seen.remove(&id);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.first_seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.first_seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn second_sighting_within_retention_is_seen() {
        let t0 = Utc.with_ymd_and_hms(2025, 6, 1, 20, 0, 0).unwrap();
        let mut ids = SeenIds::new(Duration::seconds(60));
        assert!(!ids.seen(7_i64, t0));
        assert!(ids.seen(7, t0 + Duration::seconds(59)));
        assert!(!ids.seen(8, t0 + Duration::seconds(59)));
    }

    #[test]
    fn ids_expire_after_retention() {
        let t0 = Utc.with_ymd_and_hms(2025, 6, 1, 20, 0, 0).unwrap();
        let mut ids = SeenIds::new(Duration::seconds(60));
        ids.seen("a".to_string(), t0);
        ids.seen("b".to_string(), t0 + Duration::seconds(30));
        assert!(!ids.seen("a".to_string(), t0 + Duration::seconds(60)));
        // "b" still inside its window, "a" re-marked
        assert_eq!(ids.len(), 2);
        assert!(ids.seen("b".to_string(), t0 + Duration::seconds(60)));
    }
}
