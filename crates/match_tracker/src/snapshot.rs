use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub type MatchId = u64;

/// Match status as the tracker sees it. The transport folds the upstream
/// vocabulary into these buckets before a snapshot reaches the detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    Scheduled,
    Timed,
    Live,
    Finished,
    Other,
}

impl MatchStatus {
    /// football-data.org v4 status strings. PAUSED (half-time) counts as live
    /// so the second half does not look like a fresh kickoff.
    pub fn from_api(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "SCHEDULED" => Self::Scheduled,
            "TIMED" => Self::Timed,
            "LIVE" | "IN_PLAY" | "PAUSED" => Self::Live,
            "FINISHED" | "AWARDED" => Self::Finished,
            _ => Self::Other,
        }
    }

    pub fn is_upcoming(self) -> bool {
        matches!(self, Self::Scheduled | Self::Timed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Scheduled => "SCHEDULED",
            Self::Timed => "TIMED",
            Self::Live => "LIVE",
            Self::Finished => "FINISHED",
            Self::Other => "OTHER",
        }
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One poll's observation of a match. Scores are already defaulted to 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSnapshot {
    pub id: MatchId,
    pub status: MatchStatus,
    pub kickoff: Option<DateTime<Utc>>,
    pub home_name: String,
    pub away_name: String,
    pub home_score: u32,
    pub away_score: u32,
}

impl MatchSnapshot {
    pub fn score_line(&self) -> String {
        format!("{} x {}", self.home_score, self.away_score)
    }
}
