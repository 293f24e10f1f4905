use crate::dedup::DedupStore;
use crate::fingerprint::{fingerprint, Fingerprint};
use crate::item::FeedItem;
use tracing::{debug, warn};

/// How many of the newest feed entries are considered per poll.
pub const DEFAULT_SCAN_DEPTH: usize = 12;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Novelty {
    pub emit: Option<FeedItem>,
    pub warmed: bool,
}

/// Newest unseen item among the first `depth` entries (feed order, newest
/// first).
///
/// First call (`warmed == false`) only records the current window and emits
/// nothing, so a restart never replays the backlog. Later calls surface at
/// most one item; a burst of new articles drains one per poll.
pub fn detect(items: &[FeedItem], warmed: bool, store: &mut DedupStore, depth: usize) -> Novelty {
    let window = items.iter().take(depth);

    if !warmed {
        for item in window {
            store.insert(fingerprint(item));
        }
        debug!(seeded = store.len(), "news warm-up");
        return Novelty { emit: None, warmed: true };
    }

    for item in window {
        let fp = fingerprint(item);
        if !store.contains(&fp) {
            store.insert(fp);
            return Novelty {
                emit: Some(item.clone()),
                warmed,
            };
        }
    }

    Novelty { emit: None, warmed }
}

/// Dedup store + warm-up flag owned by the news poll task.
#[derive(Debug, Clone)]
pub struct NewsWatch {
    store: DedupStore,
    warmed: bool,
    depth: usize,
}

impl Default for NewsWatch {
    fn default() -> Self {
        Self::new(DedupStore::default(), DEFAULT_SCAN_DEPTH)
    }
}

impl NewsWatch {
    /// The scan window is clamped to `(capacity + 1) / 2`: an item still in
    /// the window has at most `2 * depth - 2` fingerprints inserted after it,
    /// so it can never be evicted and replayed.
    pub fn new(store: DedupStore, depth: usize) -> Self {
        let mut depth = depth.max(1);
        let max_depth = (store.capacity() + 1) / 2;
        if depth > max_depth {
            warn!(
                depth,
                capacity = store.capacity(),
                "news scan depth too large for dedup capacity, clamping to {}",
                max_depth
            );
            depth = max_depth;
        }
        Self {
            store,
            warmed: false,
            depth,
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Feed one successful fetch. Failed fetches must not reach here.
    pub fn observe(&mut self, items: &[FeedItem]) -> Option<FeedItem> {
        let novelty = detect(items, self.warmed, &mut self.store, self.depth);
        self.warmed = novelty.warmed;
        novelty.emit
    }

    pub fn is_warmed(&self) -> bool {
        self.warmed
    }

    pub fn remembered(&self) -> usize {
        self.store.len()
    }

    pub fn knows(&self, fp: &Fingerprint) -> bool {
        self.store.contains(fp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn item(tag: &str) -> FeedItem {
        FeedItem::new(format!("Notícia {tag}"), format!("https://news.example/{tag}"))
    }

    #[test]
    fn warm_up_then_newest_unseen_then_nothing() {
        let (a, b, c, d) = (item("a"), item("b"), item("c"), item("d"));
        let mut store = DedupStore::new(60);

        let first = detect(&[a.clone(), b.clone(), c.clone()], false, &mut store, 12);
        assert_eq!(first, Novelty { emit: None, warmed: true });
        for it in [&a, &b, &c] {
            assert!(store.contains(&fingerprint(it)));
        }

        let feed = [d.clone(), a, b, c];
        let second = detect(&feed, true, &mut store, 12);
        assert_eq!(second.emit, Some(d));
        assert!(second.warmed);

        let third = detect(&feed, true, &mut store, 12);
        assert_eq!(third, Novelty { emit: None, warmed: true });
    }

    #[test]
    fn burst_drains_one_item_per_call() {
        let mut watch = NewsWatch::new(DedupStore::new(60), 12);
        assert_eq!(watch.observe(&[item("old")]), None);

        let feed = [item("n3"), item("n2"), item("n1"), item("old")];
        assert_eq!(watch.observe(&feed), Some(item("n3")));
        assert_eq!(watch.observe(&feed), Some(item("n2")));
        assert_eq!(watch.observe(&feed), Some(item("n1")));
        assert_eq!(watch.observe(&feed), None);
    }

    #[test]
    fn warm_up_only_seeds_the_scan_window() {
        let feed: Vec<_> = (0..5).map(|i| item(&i.to_string())).collect();
        let mut watch = NewsWatch::new(DedupStore::new(60), 3);
        assert_eq!(watch.observe(&feed), None);
        assert_eq!(watch.remembered(), 3);
        // entries past the window are never looked at
        assert_eq!(watch.observe(&feed), None);
        assert!(!watch.knows(&fingerprint(&feed[4])));
    }

    #[test]
    fn scan_depth_is_clamped_to_dedup_capacity() {
        let feed: Vec<_> = (0..4).map(|i| item(&format!("t{i}"))).collect();
        let mut watch = NewsWatch::new(DedupStore::new(2), 4);
        assert_eq!(watch.depth(), 1);
        let emitted: Vec<_> = (0..7).map(|_| watch.observe(&feed)).collect();
        assert_eq!(emitted, vec![None; 7]);
    }

    #[test]
    fn small_store_never_replays_items_still_in_the_window() {
        let mut watch = NewsWatch::new(DedupStore::new(4), 4);
        assert_eq!(watch.depth(), 2);
        let (a, b, c, d) = (item("a"), item("b"), item("c"), item("d"));
        assert_eq!(watch.observe(&[a.clone(), b.clone(), c.clone(), d]), None);

        let mut feed = vec![a, b, c];
        let mut sent = Vec::new();
        for tag in ["n1", "n2", "n3", "n4"] {
            feed.insert(0, item(tag));
            for _ in 0..3 {
                if let Some(it) = watch.observe(&feed) {
                    sent.push(it);
                }
            }
        }
        assert_eq!(sent, vec![item("n1"), item("n2"), item("n3"), item("n4")]);
    }

    #[test]
    fn empty_first_poll_still_warms() {
        let mut watch = NewsWatch::default();
        assert_eq!(watch.observe(&[]), None);
        assert!(watch.is_warmed());
        assert_eq!(watch.observe(&[item("x")]), Some(item("x")));
    }
}
