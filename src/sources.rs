//! Read seams between the pollers / command handler and the transport.

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use feed_client::{FootballClient, RssClient, StandingRow, UpcomingMatch};
use match_tracker::MatchSnapshot;
use news_watch::FeedItem;
use std::sync::Arc;

#[async_trait]
pub trait MatchSource: Send + Sync {
    async fn fetch_matches(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<MatchSnapshot>>;
}

#[async_trait]
pub trait NewsSource: Send + Sync {
    /// Newest first.
    async fn fetch_items(&self, url: &str) -> Result<Vec<FeedItem>>;
}

/// Read-only queries behind the chat commands.
#[async_trait]
pub trait LeagueSource: Send + Sync {
    async fn standings(&self) -> Result<Vec<StandingRow>>;
    async fn upcoming(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<UpcomingMatch>>;
    async fn live(&self) -> Result<Vec<MatchSnapshot>>;
}

#[async_trait]
impl MatchSource for FootballClient {
    async fn fetch_matches(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<MatchSnapshot>> {
        FootballClient::fetch_matches(self, from, to).await
    }
}

#[async_trait]
impl LeagueSource for FootballClient {
    async fn standings(&self) -> Result<Vec<StandingRow>> {
        self.fetch_standings().await
    }

    async fn upcoming(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<UpcomingMatch>> {
        self.fetch_upcoming(from, to).await
    }

    async fn live(&self) -> Result<Vec<MatchSnapshot>> {
        self.fetch_live().await
    }
}

#[async_trait]
impl NewsSource for RssClient {
    async fn fetch_items(&self, url: &str) -> Result<Vec<FeedItem>> {
        RssClient::fetch_items(self, url).await
    }
}

#[async_trait]
impl<T: MatchSource + ?Sized> MatchSource for Arc<T> {
    async fn fetch_matches(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<MatchSnapshot>> {
        (**self).fetch_matches(from, to).await
    }
}

#[async_trait]
impl<T: NewsSource + ?Sized> NewsSource for Arc<T> {
    async fn fetch_items(&self, url: &str) -> Result<Vec<FeedItem>> {
        (**self).fetch_items(url).await
    }
}

#[async_trait]
impl<T: LeagueSource + ?Sized> LeagueSource for Arc<T> {
    async fn standings(&self) -> Result<Vec<StandingRow>> {
        (**self).standings().await
    }

    async fn upcoming(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<UpcomingMatch>> {
        (**self).upcoming(from, to).await
    }

    async fn live(&self) -> Result<Vec<MatchSnapshot>> {
        (**self).live().await
    }
}
