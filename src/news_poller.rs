use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use logger::EventLogger;
use news_watch::NewsWatch;
use std::sync::Arc;
use tracing::info;

use crate::notify::{deliver, Alert, Notifier};
use crate::scheduler::{PollTask, TickReport};
use crate::sources::NewsSource;

/// At most one news alert per tick; the first successful poll only warms up.
pub struct NewsPollTask<S, N> {
    source: Option<S>,
    feed_url: Option<String>,
    notifier: Option<N>,
    watch: NewsWatch,
    logger: Arc<EventLogger>,
}

impl<S: NewsSource, N: Notifier> NewsPollTask<S, N> {
    pub fn new(
        source: Option<S>,
        feed_url: Option<String>,
        notifier: Option<N>,
        watch: NewsWatch,
        logger: Arc<EventLogger>,
    ) -> Self {
        Self {
            source,
            feed_url,
            notifier,
            watch,
            logger,
        }
    }

    pub fn watch(&self) -> &NewsWatch {
        &self.watch
    }
}

#[async_trait]
impl<S: NewsSource, N: Notifier> PollTask for NewsPollTask<S, N> {
    fn name(&self) -> &'static str {
        "news"
    }

    async fn tick(&mut self, _now: DateTime<Utc>) -> Result<TickReport> {
        let (Some(source), Some(url)) = (self.source.as_ref(), self.feed_url.as_deref()) else {
            return Ok(TickReport::skipped("NEWS_FEED_URL not set"));
        };
        let Some(notifier) = self.notifier.as_ref() else {
            return Ok(TickReport::skipped("no destination chat"));
        };

        let items = source.fetch_items(url).await.context("news fetch failed")?;

        let was_warmed = self.watch.is_warmed();
        let fresh = self.watch.observe(&items);
        if !was_warmed {
            info!("news warm-up: {} items remembered", self.watch.remembered());
        }

        let mut emitted = 0;
        if let Some(item) = fresh {
            deliver(notifier, &self.logger, &Alert::News(item)).await;
            emitted = 1;
        }

        Ok(TickReport {
            items: items.len(),
            emitted,
            retained: self.watch.remembered(),
            skipped: None,
        })
    }
}
