use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Days, Utc};
use logger::EventLogger;
use match_tracker::{detect, MatchStateStore};
use std::sync::Arc;
use tracing::debug;

use crate::notify::{deliver, Alert, Notifier};
use crate::scheduler::{PollTask, TickReport};
use crate::sources::MatchSource;

/// Today plus two days, in UTC dates.
pub const MATCH_LOOKAHEAD_DAYS: u64 = 2;

/// Fetch → diff against the store → commit → deliver.
///
/// State is committed before any alert goes out, so a delivery failure
/// never causes a second alert for the same transition.
pub struct MatchPollTask<S, N> {
    source: Option<S>,
    notifier: Option<N>,
    store: MatchStateStore,
    logger: Arc<EventLogger>,
}

impl<S: MatchSource, N: Notifier> MatchPollTask<S, N> {
    pub fn new(source: Option<S>, notifier: Option<N>, store: MatchStateStore, logger: Arc<EventLogger>) -> Self {
        Self {
            source,
            notifier,
            store,
            logger,
        }
    }

    pub fn store(&self) -> &MatchStateStore {
        &self.store
    }
}

#[async_trait]
impl<S: MatchSource, N: Notifier> PollTask for MatchPollTask<S, N> {
    fn name(&self) -> &'static str {
        "matches"
    }

    async fn tick(&mut self, now: DateTime<Utc>) -> Result<TickReport> {
        let Some(source) = self.source.as_ref() else {
            return Ok(TickReport::skipped("FOOTBALL_API_KEY not set"));
        };
        let Some(notifier) = self.notifier.as_ref() else {
            return Ok(TickReport::skipped("no destination chat"));
        };

        let from = now.date_naive();
        let to = from + Days::new(MATCH_LOOKAHEAD_DAYS);
        let snapshots = source
            .fetch_matches(from, to)
            .await
            .context("match fetch failed")?;

        let mut alerts = Vec::new();
        for snap in &snapshots {
            let detection = detect(self.store.get(snap.id), snap, now);
            self.store.put(snap.id, detection.next);
            alerts.extend(detection.events.into_iter().map(Alert::Match));
        }
        let evicted = self.store.finish_poll();
        if evicted > 0 {
            debug!("match store: evicted {} stale entries", evicted);
        }

        for alert in &alerts {
            deliver(notifier, &self.logger, alert).await;
        }

        Ok(TickReport {
            items: snapshots.len(),
            emitted: alerts.len(),
            retained: self.store.len(),
            skipped: None,
        })
    }
}
