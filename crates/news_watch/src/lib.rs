//! FutNews — News Watch
//!
//! Picks the newest unseen article out of a feed snapshot.
//! - fingerprint: SHA-256 over (title, link, published_at), membership only
//! - DedupStore: bounded FIFO set of fingerprints
//! - detect / NewsWatch: warm-up on the first poll, then one new item per poll

mod dedup;
mod fingerprint;
mod item;
mod novelty;

pub use dedup::{DedupStore, DEFAULT_DEDUP_CAPACITY};
pub use fingerprint::{fingerprint, Fingerprint};
pub use item::FeedItem;
pub use novelty::{detect, NewsWatch, Novelty, DEFAULT_SCAN_DEPTH};
