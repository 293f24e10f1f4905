//! Fakes shared by the unit tests.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use feed_client::{StandingRow, TeamRef, UpcomingMatch};
use logger::EventLogger;
use match_tracker::{MatchSnapshot, MatchStatus};
use news_watch::FeedItem;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::notify::{Alert, Notifier};
use crate::sources::{LeagueSource, MatchSource, NewsSource};

static TEMP_SEQ: AtomicUsize = AtomicUsize::new(0);

pub fn temp_logger(tag: &str) -> (EventLogger, PathBuf) {
    let dir = std::env::temp_dir().join(format!(
        "futnews-test-{}-{}-{}",
        tag,
        std::process::id(),
        TEMP_SEQ.fetch_add(1, Ordering::SeqCst)
    ));
    std::fs::remove_dir_all(&dir).ok();
    (EventLogger::new(&dir), dir)
}

pub fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, h, m, s).unwrap()
}

pub fn snapshot(id: u64, status: MatchStatus, home: u32, away: u32, kickoff: DateTime<Utc>) -> MatchSnapshot {
    MatchSnapshot {
        id,
        status,
        kickoff: Some(kickoff),
        home_name: format!("Home {id}"),
        away_name: format!("Away {id}"),
        home_score: home,
        away_score: away,
    }
}

pub fn team(id: u64, name: &str, short: &str, tla: &str) -> TeamRef {
    TeamRef {
        id: Some(id),
        name: name.to_string(),
        short_name: Some(short.to_string()),
        tla: Some(tla.to_string()),
    }
}

pub fn row(position: u32, team: TeamRef, points: i32) -> StandingRow {
    StandingRow {
        position,
        team,
        played: 10,
        won: 5,
        draw: 2,
        lost: 3,
        points,
        goal_difference: 4,
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Alert>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<Alert> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, alert: &Alert) -> Result<()> {
        if self.fail {
            anyhow::bail!("chat unavailable");
        }
        self.sent.lock().unwrap().push(alert.clone());
        Ok(())
    }
}

/// Replays queued responses; an exhausted queue is an error.
#[derive(Default)]
pub struct Scripted<T> {
    queue: Mutex<VecDeque<Result<T>>>,
    calls: AtomicUsize,
}

impl<T> Scripted<T> {
    pub fn push_ok(&self, value: T) {
        self.queue.lock().unwrap().push_back(Ok(value));
    }

    pub fn push_err(&self, msg: &'static str) {
        self.queue.lock().unwrap().push_back(Err(anyhow::anyhow!(msg)));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn next(&self) -> Result<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(anyhow::anyhow!("script exhausted")))
    }
}

#[async_trait]
impl MatchSource for Scripted<Vec<MatchSnapshot>> {
    async fn fetch_matches(&self, _from: NaiveDate, _to: NaiveDate) -> Result<Vec<MatchSnapshot>> {
        self.next()
    }
}

#[async_trait]
impl NewsSource for Scripted<Vec<FeedItem>> {
    async fn fetch_items(&self, _url: &str) -> Result<Vec<FeedItem>> {
        self.next()
    }
}

#[derive(Default)]
pub struct FakeLeague {
    pub standings: Option<Vec<StandingRow>>,
    pub upcoming: Vec<UpcomingMatch>,
    pub live: Vec<MatchSnapshot>,
    pub upcoming_ranges: Mutex<Vec<(NaiveDate, NaiveDate)>>,
}

#[async_trait]
impl LeagueSource for FakeLeague {
    async fn standings(&self) -> Result<Vec<StandingRow>> {
        self.standings
            .clone()
            .ok_or_else(|| anyhow::anyhow!("standings unavailable"))
    }

    async fn upcoming(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<UpcomingMatch>> {
        self.upcoming_ranges.lock().unwrap().push((from, to));
        Ok(self.upcoming.clone())
    }

    async fn live(&self) -> Result<Vec<MatchSnapshot>> {
        Ok(self.live.clone())
    }
}
