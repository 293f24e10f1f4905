//! FutNews — Feed Client
//!
//! HTTP transport for the two upstream sources. Everything here normalizes
//! raw payloads into the flat records the trackers consume:
//!   - football-data.org v4 → `MatchSnapshot`, `StandingRow`
//!   - RSS/Atom → `FeedItem` (newest first)

pub mod football;
pub mod rss;

pub use football::{FootballClient, StandingRow, TeamRef, UpcomingMatch};
pub use rss::{parse_feed, RssClient};

use std::time::Duration;

pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 15;
const USER_AGENT: &str = "FutNews/1.0";

/// At most `max` characters of an upstream body, for log lines and errors.
pub fn body_snippet(body: &str, max: usize) -> String {
    body.chars().take(max).collect()
}

pub(crate) fn build_http(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snippet_cuts_on_char_boundaries() {
        let body = format!("{}é tail", "x".repeat(119));
        let cut = body_snippet(&body, 120);
        assert_eq!(cut.chars().count(), 120);
        assert!(cut.ends_with('é'));
        assert_eq!(body_snippet("curto", 120), "curto");
    }
}
