use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A news entry as normalized by the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedItem {
    pub title: String,
    pub link: String,
    pub published_at: Option<DateTime<Utc>>,
    pub image_url: Option<String>,
    pub summary: Option<String>,
}

impl FeedItem {
    pub fn new(title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            published_at: None,
            image_url: None,
            summary: None,
        }
    }
}
