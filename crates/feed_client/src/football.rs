//! football-data.org v4 client
//!
//! Endpoints:
//!   GET /competitions/{code}/matches?dateFrom=&dateTo=[&status=]
//!   GET /competitions/{code}/standings
//! Auth header: X-Auth-Token

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use match_tracker::{MatchSnapshot, MatchStatus};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "https://api.football-data.org/v4";
pub const DEFAULT_COMPETITION: &str = "BSA";

// ====================================================================
// Raw response types
// ====================================================================

#[derive(Debug, Deserialize)]
struct MatchesResponse {
    #[serde(default)]
    matches: Vec<ApiMatch>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiMatch {
    id: u64,
    utc_date: Option<String>,
    status: Option<String>,
    home_team: Option<ApiTeam>,
    away_team: Option<ApiTeam>,
    score: Option<ApiScore>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiTeam {
    id: Option<u64>,
    name: Option<String>,
    short_name: Option<String>,
    tla: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiScore {
    full_time: Option<ApiScorePair>,
    half_time: Option<ApiScorePair>,
    regular_time: Option<ApiScorePair>,
}

#[derive(Debug, Deserialize)]
struct ApiScorePair {
    home: Option<u32>,
    away: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct StandingsResponse {
    #[serde(default)]
    standings: Vec<ApiStanding>,
}

#[derive(Debug, Deserialize)]
struct ApiStanding {
    #[serde(rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    table: Vec<ApiTableRow>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiTableRow {
    position: u32,
    team: Option<ApiTeam>,
    #[serde(default)]
    played_games: u32,
    #[serde(default)]
    won: u32,
    #[serde(default)]
    draw: u32,
    #[serde(default)]
    lost: u32,
    #[serde(default)]
    points: i32,
    #[serde(default)]
    goal_difference: i32,
}

// ====================================================================
// Normalized types
// ====================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamRef {
    pub id: Option<u64>,
    pub name: String,
    pub short_name: Option<String>,
    pub tla: Option<String>,
}

impl TeamRef {
    fn from_api(team: Option<&ApiTeam>, fallback: &str) -> Self {
        let name = team
            .and_then(|t| t.name.as_deref().or(t.short_name.as_deref()))
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(fallback)
            .to_string();
        Self {
            id: team.and_then(|t| t.id),
            name,
            short_name: team.and_then(|t| t.short_name.clone()),
            tla: team.and_then(|t| t.tla.clone()),
        }
    }

    pub fn display_name(&self) -> &str {
        self.short_name.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpcomingMatch {
    pub id: u64,
    pub kickoff: Option<DateTime<Utc>>,
    pub home: TeamRef,
    pub away: TeamRef,
}

impl UpcomingMatch {
    pub fn involves(&self, team_id: u64) -> bool {
        self.home.id == Some(team_id) || self.away.id == Some(team_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandingRow {
    pub position: u32,
    pub team: TeamRef,
    pub played: u32,
    pub won: u32,
    pub draw: u32,
    pub lost: u32,
    pub points: i32,
    pub goal_difference: i32,
}

// ====================================================================
// Normalization
// ====================================================================

fn parse_kickoff(raw: Option<&str>) -> Option<DateTime<Utc>> {
    raw.and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

/// fullTime → halfTime → regularTime → 0, per side.
fn pick_score(score: Option<&ApiScore>) -> (u32, u32) {
    let Some(score) = score else {
        return (0, 0);
    };
    let pairs = [&score.full_time, &score.half_time, &score.regular_time];
    let home = pairs
        .iter()
        .find_map(|p| p.as_ref().and_then(|p| p.home))
        .unwrap_or(0);
    let away = pairs
        .iter()
        .find_map(|p| p.as_ref().and_then(|p| p.away))
        .unwrap_or(0);
    (home, away)
}

fn to_snapshot(m: &ApiMatch) -> MatchSnapshot {
    let (home_score, away_score) = pick_score(m.score.as_ref());
    MatchSnapshot {
        id: m.id,
        status: m
            .status
            .as_deref()
            .map(MatchStatus::from_api)
            .unwrap_or(MatchStatus::Other),
        kickoff: parse_kickoff(m.utc_date.as_deref()),
        home_name: TeamRef::from_api(m.home_team.as_ref(), "Casa").name,
        away_name: TeamRef::from_api(m.away_team.as_ref(), "Fora").name,
        home_score,
        away_score,
    }
}

fn to_upcoming(m: &ApiMatch) -> UpcomingMatch {
    UpcomingMatch {
        id: m.id,
        kickoff: parse_kickoff(m.utc_date.as_deref()),
        home: TeamRef::from_api(m.home_team.as_ref(), "Casa"),
        away: TeamRef::from_api(m.away_team.as_ref(), "Fora"),
    }
}

fn to_standings(resp: StandingsResponse) -> Vec<StandingRow> {
    let total = resp
        .standings
        .into_iter()
        .find(|s| s.kind.as_deref() == Some("TOTAL"));
    let Some(total) = total else {
        return Vec::new();
    };
    total
        .table
        .into_iter()
        .map(|r| StandingRow {
            position: r.position,
            team: TeamRef::from_api(r.team.as_ref(), "Time"),
            played: r.played_games,
            won: r.won,
            draw: r.draw,
            lost: r.lost,
            points: r.points,
            goal_difference: r.goal_difference,
        })
        .collect()
}

// ====================================================================
// Client
// ====================================================================

pub struct FootballClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
    competition: String,
}

impl FootballClient {
    pub fn new(token: impl Into<String>, timeout: Duration) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, DEFAULT_COMPETITION, token, timeout)
    }

    pub fn with_base_url(
        base_url: impl Into<String>,
        competition: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            http: crate::build_http(timeout),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            competition: competition.into(),
        }
    }

    pub fn competition(&self) -> &str {
        &self.competition
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path_and_query: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path_and_query);
        debug!("football GET {}", url);
        let resp = self
            .http
            .get(&url)
            .header("X-Auth-Token", &self.token)
            .send()
            .await
            .context("football-data request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!("football-data HTTP {status}: {}", crate::body_snippet(&body, 120));
            anyhow::bail!("football-data HTTP {}", status);
        }

        let raw = resp.text().await.context("football-data body read failed")?;
        serde_json::from_str(&raw).context("football-data json parse failed")
    }

    fn matches_path(&self, from: NaiveDate, to: NaiveDate, status: Option<&str>) -> String {
        let mut path = format!(
            "/competitions/{}/matches?dateFrom={}&dateTo={}",
            self.competition,
            from.format("%Y-%m-%d"),
            to.format("%Y-%m-%d"),
        );
        if let Some(s) = status {
            path.push_str("&status=");
            path.push_str(s);
        }
        path
    }

    /// Every match in `[from, to]` (UTC dates), any status.
    pub async fn fetch_matches(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<MatchSnapshot>> {
        let resp: MatchesResponse = self.get_json(&self.matches_path(from, to, None)).await?;
        Ok(resp.matches.iter().map(to_snapshot).collect())
    }

    pub async fn fetch_upcoming(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<UpcomingMatch>> {
        let resp: MatchesResponse = self
            .get_json(&self.matches_path(from, to, Some("SCHEDULED")))
            .await?;
        Ok(resp.matches.iter().map(to_upcoming).collect())
    }

    pub async fn fetch_live(&self) -> Result<Vec<MatchSnapshot>> {
        let path = format!("/competitions/{}/matches?status=LIVE", self.competition);
        let resp: MatchesResponse = self.get_json(&path).await?;
        Ok(resp.matches.iter().map(to_snapshot).collect())
    }

    /// TOTAL table, ordered by position.
    pub async fn fetch_standings(&self) -> Result<Vec<StandingRow>> {
        let path = format!("/competitions/{}/standings", self.competition);
        let resp: StandingsResponse = self.get_json(&path).await?;
        let rows = to_standings(resp);
        if rows.is_empty() {
            anyhow::bail!("standings table is empty");
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn parse_matches(v: serde_json::Value) -> Vec<MatchSnapshot> {
        let resp: MatchesResponse = serde_json::from_value(v).unwrap();
        resp.matches.iter().map(to_snapshot).collect()
    }

    #[test]
    fn match_payload_normalizes_scores_and_status() {
        let snaps = parse_matches(json!({
            "matches": [
                {
                    "id": 501,
                    "utcDate": "2025-06-01T19:00:00Z",
                    "status": "IN_PLAY",
                    "homeTeam": {"id": 1783, "name": "CR Flamengo", "shortName": "Flamengo", "tla": "FLA"},
                    "awayTeam": {"id": 1769, "name": "SE Palmeiras", "shortName": "Palmeiras", "tla": "PAL"},
                    "score": {
                        "fullTime": {"home": null, "away": null},
                        "halfTime": {"home": 1, "away": null},
                        "regularTime": {"home": 3, "away": 2}
                    }
                },
                {
                    "id": 502,
                    "status": "POSTPONED",
                    "homeTeam": {"name": null},
                    "score": null
                }
            ]
        }));

        assert_eq!(snaps.len(), 2);
        let live = &snaps[0];
        assert_eq!(live.status, MatchStatus::Live);
        assert_eq!((live.home_score, live.away_score), (1, 2));
        assert_eq!(live.home_name, "CR Flamengo");
        assert_eq!(
            live.kickoff,
            Some(Utc.with_ymd_and_hms(2025, 6, 1, 19, 0, 0).unwrap())
        );

        let odd = &snaps[1];
        assert_eq!(odd.status, MatchStatus::Other);
        assert_eq!((odd.home_score, odd.away_score), (0, 0));
        assert_eq!(odd.home_name, "Casa");
        assert_eq!(odd.away_name, "Fora");
        assert_eq!(odd.kickoff, None);
    }

    #[test]
    fn standings_use_total_table() {
        let resp: StandingsResponse = serde_json::from_value(json!({
            "standings": [
                {"type": "HOME", "table": [{"position": 1, "team": {"name": "Wrong"}}]},
                {"type": "TOTAL", "table": [
                    {"position": 1, "team": {"id": 1, "name": "Botafogo FR", "shortName": "Botafogo", "tla": "BOT"},
                     "playedGames": 10, "won": 7, "draw": 2, "lost": 1, "points": 23, "goalDifference": 12},
                    {"position": 2, "team": {"id": 2, "name": "SE Palmeiras"},
                     "playedGames": 10, "won": 6, "draw": 3, "lost": 1, "points": 21, "goalDifference": 9}
                ]}
            ]
        }))
        .unwrap();

        let rows = to_standings(resp);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].team.display_name(), "Botafogo");
        assert_eq!(rows[1].team.display_name(), "SE Palmeiras");
        assert_eq!(rows[0].points, 23);
    }

    #[test]
    fn matches_path_carries_dates_and_status() {
        let client = FootballClient::with_base_url("http://api.local/v4/", "BSA", "t", Duration::from_secs(1));
        let from = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2025, 6, 3).unwrap();
        assert_eq!(
            client.matches_path(from, to, Some("SCHEDULED")),
            "/competitions/BSA/matches?dateFrom=2025-06-01&dateTo=2025-06-03&status=SCHEDULED"
        );
        assert_eq!(client.base_url, "http://api.local/v4");
    }

    #[tokio::test]
    async fn error_body_with_multibyte_text_is_an_error() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_test_writer()
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let _ = stream.read(&mut buf).await;
            let body = format!("{}é", "x".repeat(119));
            let resp = format!(
                "HTTP/1.1 503 Service Unavailable\r\nContent-Type: text/plain; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            stream.write_all(resp.as_bytes()).await.unwrap();
        });

        let client = FootballClient::with_base_url(format!("http://{addr}"), "BSA", "t", Duration::from_secs(5));
        let from = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let err = client.fetch_matches(from, from).await.unwrap_err();
        assert!(format!("{err:#}").contains("503"));
    }
}
