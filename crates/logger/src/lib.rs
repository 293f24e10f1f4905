/// FutNews — Logger
/// JSONL audit stream: emitted alerts, poll outcomes, commands, heartbeats

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

pub struct EventLogger {
    log_dir: PathBuf,
}

impl EventLogger {
    pub fn new(log_dir: impl Into<PathBuf>) -> Self {
        let dir = log_dir.into();
        fs::create_dir_all(&dir).ok();
        Self { log_dir: dir }
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    /// One line per event, file rotated per UTC day.
    pub fn log<T: Serialize>(&self, event: &T) -> Result<()> {
        self.log_at(event, Utc::now())
    }

    pub fn log_at<T: Serialize>(&self, event: &T, at: DateTime<Utc>) -> Result<()> {
        let path  = self.path_for(at);
        let line  = serde_json::to_string(event).context("serialize event")?;
        let mut f = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("open {}", path.display()))?;
        writeln!(f, "{line}")?;
        Ok(())
    }

    pub fn path_for(&self, at: DateTime<Utc>) -> PathBuf {
        let date = at.format("%Y-%m-%d").to_string();
        self.log_dir.join(format!("{date}.jsonl"))
    }
}

pub fn now_iso() -> String {
    Utc::now().to_rfc3339()
}

// ── Event types ────────────────────────────────────────────────────────────────

#[derive(Serialize, Debug, Clone)]
pub struct MatchAlertEvent {
    pub ts:         String,
    pub event:      &'static str,   // "MATCH_ALERT"
    pub kind:       &'static str,   // "PREGAME" | "KICKOFF" | "GOAL" | "FULLTIME"
    pub match_id:   u64,
    pub home:       String,
    pub away:       String,
    pub home_score: u32,
    pub away_score: u32,
    pub kickoff:    Option<String>,
    pub scorer:     Option<&'static str>,
    pub delivered:  bool,
}

#[derive(Serialize, Debug, Clone)]
pub struct NewsAlertEvent {
    pub ts:          String,
    pub event:       &'static str,  // "NEWS_ALERT"
    pub title:       String,
    pub link:        String,
    pub fingerprint: String,
    pub delivered:   bool,
}

#[derive(Serialize, Debug, Clone)]
pub struct PollStatusEvent {
    pub ts:      String,
    pub event:   &'static str,      // "POLL_STATUS"
    pub task:    String,            // "matches" | "news"
    pub ok:      bool,
    pub skipped: bool,
    pub items:   usize,
    pub emitted: usize,
    pub message: String,
}

#[derive(Serialize, Debug, Clone)]
pub struct CommandEvent {
    pub ts:        String,
    pub event:     &'static str,    // "COMMAND"
    pub chat_id:   i64,
    pub user_id:   i64,
    pub command:   String,
    pub admission: &'static str,    // "accepted" | "duplicate" | "cooling_down"
    pub ok:        bool,
}

#[derive(Serialize, Debug, Clone)]
pub struct SystemHeartbeatEvent {
    pub ts:              String,
    pub event:           &'static str,   // "SYSTEM_HEARTBEAT"
    pub instance_id:     String,
    pub tracked_matches: usize,
    pub match_ticks:     u64,
    pub news_ticks:      u64,
    pub failed_ticks:    u64,
}
