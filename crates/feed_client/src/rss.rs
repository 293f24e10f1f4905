//! RSS / Atom news feed client (feed-rs)

use anyhow::{Context, Result};
use feed_rs::model::Entry;
use news_watch::FeedItem;
use std::time::Duration;
use tracing::debug;

const SUMMARY_MAX_CHARS: usize = 300;

pub struct RssClient {
    http: reqwest::Client,
}

impl RssClient {
    pub fn new(timeout: Duration) -> Self {
        Self {
            http: crate::build_http(timeout),
        }
    }

    /// Items ordered newest first.
    pub async fn fetch_items(&self, url: &str) -> Result<Vec<FeedItem>> {
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .context("news feed request failed")?;

        let status = resp.status();
        if !status.is_success() {
            anyhow::bail!("news feed HTTP {}", status);
        }

        let bytes = resp.bytes().await.context("news feed body read failed")?;
        let items = parse_feed(&bytes)?;
        debug!("news feed {}: {} items", url, items.len());
        Ok(items)
    }
}

/// Parse RSS/Atom bytes into feed items.
///
/// Entries without a title are skipped. When every entry carries a date the
/// list is stable-sorted newest first; otherwise feed order is kept, which
/// is newest first for every feed we care about.
pub fn parse_feed(bytes: &[u8]) -> Result<Vec<FeedItem>> {
    let feed = feed_rs::parser::parse(bytes).context("news feed parse failed")?;
    let mut items: Vec<FeedItem> = feed.entries.iter().filter_map(to_item).collect();

    if items.iter().all(|i| i.published_at.is_some()) {
        items.sort_by(|a, b| b.published_at.cmp(&a.published_at));
    }
    Ok(items)
}

fn to_item(entry: &Entry) -> Option<FeedItem> {
    let title = entry
        .title
        .as_ref()
        .map(|t| t.content.trim().to_string())
        .filter(|t| !t.is_empty())?;

    Some(FeedItem {
        title,
        link: select_link(entry),
        published_at: entry.published.or(entry.updated),
        image_url: select_image(entry),
        summary: entry
            .summary
            .as_ref()
            .map(|s| clean_summary(&s.content))
            .filter(|s| !s.is_empty()),
    })
}

fn select_link(entry: &Entry) -> String {
    let alternate = entry.links.iter().find(|l| {
        let rel = l.rel.as_deref().unwrap_or("");
        !l.href.trim().is_empty() && (rel.is_empty() || rel.eq_ignore_ascii_case("alternate"))
    });
    if let Some(link) = alternate.or_else(|| entry.links.iter().find(|l| !l.href.trim().is_empty())) {
        return link.href.trim().to_string();
    }
    let id = entry.id.trim();
    if id.starts_with("http://") || id.starts_with("https://") {
        return id.to_string();
    }
    String::new()
}

/// media:content / enclosure with an image type, then media thumbnails.
fn select_image(entry: &Entry) -> Option<String> {
    for media in &entry.media {
        for content in &media.content {
            let is_image = content
                .content_type
                .as_ref()
                .map(|m| m.to_string().starts_with("image/"))
                .unwrap_or(false);
            if let (true, Some(url)) = (is_image, content.url.as_ref()) {
                return Some(url.to_string());
            }
        }
        if let Some(thumb) = media.thumbnails.first() {
            return Some(thumb.image.uri.clone());
        }
    }
    entry
        .links
        .iter()
        .find(|l| {
            l.rel.as_deref() == Some("enclosure")
                && l.media_type.as_deref().map(|m| m.starts_with("image/")).unwrap_or(false)
        })
        .map(|l| l.href.clone())
}

/// Strip tags, collapse whitespace, cap length.
fn clean_summary(raw: &str) -> String {
    let mut text = String::with_capacity(raw.len());
    let mut in_tag = false;
    for c in raw.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                text.push(' ');
            }
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }
    let text = text
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    if text.chars().count() > SUMMARY_MAX_CHARS {
        let cut: String = text.chars().take(SUMMARY_MAX_CHARS).collect();
        format!("{}…", cut.trim_end())
    } else {
        text
    }
}
