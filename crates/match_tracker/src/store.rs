use crate::snapshot::{MatchId, MatchSnapshot, MatchStatus};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Missed polls tolerated before a match is forgotten (120 × 30s = 1h).
pub const DEFAULT_GRACE_POLLS: u64 = 120;

/// Last observed state of one match plus its one-shot alert flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchState {
    pub status: MatchStatus,
    pub home_score: u32,
    pub away_score: u32,
    pub pregame_alert_sent: bool,
    pub finished_alert_sent: bool,
}

impl MatchState {
    /// State synthesized on first sight: mirrors the snapshot, no flags set.
    pub fn first_seen(snap: &MatchSnapshot) -> Self {
        Self {
            status: snap.status,
            home_score: snap.home_score,
            away_score: snap.away_score,
            pregame_alert_sent: false,
            finished_alert_sent: false,
        }
    }
}

#[derive(Debug, Clone)]
struct Slot {
    state: MatchState,
    seen_generation: u64,
}

/// match id → last state. Entries are stamped with the poll generation that
/// last wrote them; `finish_poll` drops the ones the feed stopped reporting.
#[derive(Debug)]
pub struct MatchStateStore {
    slots: HashMap<MatchId, Slot>,
    generation: u64,
    grace_polls: u64,
}

impl Default for MatchStateStore {
    fn default() -> Self {
        Self::new(DEFAULT_GRACE_POLLS)
    }
}

impl MatchStateStore {
    pub fn new(grace_polls: u64) -> Self {
        Self {
            slots: HashMap::new(),
            generation: 0,
            grace_polls,
        }
    }

    pub fn get(&self, id: MatchId) -> Option<&MatchState> {
        self.slots.get(&id).map(|s| &s.state)
    }

    pub fn put(&mut self, id: MatchId, state: MatchState) {
        self.slots.insert(
            id,
            Slot {
                state,
                seen_generation: self.generation,
            },
        );
    }

    /// Close the current poll: forget matches not written for more than
    /// `grace_polls` consecutive polls, then advance the generation.
    /// Call only after a successful fetch. Returns how many were dropped.
    pub fn finish_poll(&mut self) -> usize {
        let current = self.generation;
        let grace = self.grace_polls;
        let before = self.slots.len();
        self.slots
            .retain(|_, slot| current.saturating_sub(slot.seen_generation) <= grace);
        let dropped = before - self.slots.len();
        if dropped > 0 {
            debug!(dropped, generation = current, "match store sweep");
        }
        self.generation += 1;
        dropped
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = MatchId> + '_ {
        self.slots.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn live_state(h: u32, a: u32) -> MatchState {
        MatchState {
            status: MatchStatus::Live,
            home_score: h,
            away_score: a,
            pregame_alert_sent: false,
            finished_alert_sent: false,
        }
    }

    #[test]
    fn put_then_get_returns_latest() {
        let mut store = MatchStateStore::default();
        assert!(store.get(7).is_none());
        store.put(7, live_state(0, 0));
        store.put(7, live_state(1, 0));
        assert_eq!(store.get(7), Some(&live_state(1, 0)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn absent_match_survives_grace_then_drops() {
        let mut store = MatchStateStore::new(2);
        store.put(1, live_state(0, 0));
        store.put(2, live_state(0, 0));
        assert_eq!(store.finish_poll(), 0);

        // match 1 disappears from the feed, match 2 keeps being reported
        for _ in 0..2 {
            store.put(2, live_state(0, 0));
            assert_eq!(store.finish_poll(), 0);
        }
        assert!(store.get(1).is_some());

        store.put(2, live_state(0, 0));
        assert_eq!(store.finish_poll(), 1);
        assert!(store.get(1).is_none());
        assert!(store.get(2).is_some());
    }

    #[test]
    fn reappearing_match_resets_its_age() {
        let mut store = MatchStateStore::new(1);
        store.put(9, live_state(0, 0));
        store.finish_poll();
        store.finish_poll();
        assert!(store.get(9).is_some());

        store.put(9, live_state(1, 0));
        store.finish_poll();
        store.finish_poll();
        assert_eq!(store.get(9), Some(&live_state(1, 0)));

        store.finish_poll();
        assert!(store.is_empty());
    }
}
