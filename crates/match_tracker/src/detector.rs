use crate::snapshot::{MatchSnapshot, MatchStatus};
use crate::store::MatchState;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// PREGAME fires while kickoff is strictly less than this far away.
pub const PREGAME_WINDOW_SECS: i64 = 10 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScorerSide {
    Home,
    Away,
    /// Both sides changed in one tick, or a lone correction downwards.
    Unknown,
}

impl ScorerSide {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Home => "HOME",
            Self::Away => "AWAY",
            Self::Unknown => "UNKNOWN",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchEvent {
    Pregame(MatchSnapshot),
    Kickoff(MatchSnapshot),
    Goal {
        snapshot: MatchSnapshot,
        side: ScorerSide,
        previous_home: u32,
        previous_away: u32,
    },
    FullTime(MatchSnapshot),
}

impl MatchEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Pregame(_) => "PREGAME",
            Self::Kickoff(_) => "KICKOFF",
            Self::Goal { .. } => "GOAL",
            Self::FullTime(_) => "FULLTIME",
        }
    }

    pub fn snapshot(&self) -> &MatchSnapshot {
        match self {
            Self::Pregame(s) | Self::Kickoff(s) | Self::FullTime(s) => s,
            Self::Goal { snapshot, .. } => snapshot,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    pub events: Vec<MatchEvent>,
    pub next: MatchState,
}

/// Diff `snap` against the previous state of the same match.
///
/// Rules run in a fixed order and are not exclusive: pregame, kickoff, goal,
/// full time. Without `prev` the snapshot itself stands in for the previous
/// state, so a match first seen live or mid-score fires nothing retroactively;
/// only the flag-guarded PREGAME and FULLTIME can fire on first sight.
pub fn detect(prev: Option<&MatchState>, snap: &MatchSnapshot, now: DateTime<Utc>) -> Detection {
    let prev = prev.cloned().unwrap_or_else(|| MatchState::first_seen(snap));
    let mut events = Vec::new();
    let mut pregame_alert_sent = prev.pregame_alert_sent;
    let mut finished_alert_sent = prev.finished_alert_sent;

    if !pregame_alert_sent && snap.status.is_upcoming() && kickoff_imminent(snap, now) {
        events.push(MatchEvent::Pregame(snap.clone()));
        pregame_alert_sent = true;
    }

    if prev.status != MatchStatus::Live && snap.status == MatchStatus::Live {
        events.push(MatchEvent::Kickoff(snap.clone()));
    }

    let home_changed = snap.home_score != prev.home_score;
    let away_changed = snap.away_score != prev.away_score;
    if snap.status == MatchStatus::Live && (home_changed || away_changed) {
        let side = if home_changed && away_changed {
            ScorerSide::Unknown
        } else if snap.home_score > prev.home_score {
            ScorerSide::Home
        } else if snap.away_score > prev.away_score {
            ScorerSide::Away
        } else {
            // score went down: upstream correction, reported generically
            ScorerSide::Unknown
        };
        events.push(MatchEvent::Goal {
            snapshot: snap.clone(),
            side,
            previous_home: prev.home_score,
            previous_away: prev.away_score,
        });
    }

    if snap.status == MatchStatus::Finished && !finished_alert_sent {
        events.push(MatchEvent::FullTime(snap.clone()));
        finished_alert_sent = true;
    }

    Detection {
        events,
        next: MatchState {
            status: snap.status,
            home_score: snap.home_score,
            away_score: snap.away_score,
            pregame_alert_sent,
            finished_alert_sent,
        },
    }
}

fn kickoff_imminent(snap: &MatchSnapshot, now: DateTime<Utc>) -> bool {
    let Some(kickoff) = snap.kickoff else {
        return false;
    };
    let until = kickoff.signed_duration_since(now);
    until > chrono::Duration::zero() && until < chrono::Duration::seconds(PREGAME_WINDOW_SECS)
}
