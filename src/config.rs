//! Environment configuration. Every value is optional; a missing API key,
//! feed URL or chat id disables the task that needs it instead of failing.

use chrono::Utc;
use std::time::Duration;
use tracing::{info, warn};

use command_guard::DEFAULT_COOLDOWN_MS;
use feed_client::football::{DEFAULT_BASE_URL, DEFAULT_COMPETITION};
use feed_client::DEFAULT_HTTP_TIMEOUT_SECS;
use match_tracker::DEFAULT_GRACE_POLLS;
use news_watch::{DEFAULT_DEDUP_CAPACITY, DEFAULT_SCAN_DEPTH};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub football_api_key: Option<String>,
    pub football_api_url: String,
    pub competition: String,
    pub news_feed_url: Option<String>,
    pub telegram_token: Option<String>,
    pub telegram_chat_id: Option<i64>,
    pub match_poll_interval: Duration,
    pub news_poll_interval: Duration,
    pub http_timeout: Duration,
    pub match_grace_polls: u64,
    pub news_dedup_capacity: usize,
    pub news_scan_depth: usize,
    pub command_cooldown_ms: i64,
    pub health_bind: String,
    pub log_dir: String,
    pub instance_id: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let text = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let number = |key: &str, default: u64| {
            text(key)
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(default)
        };

        let health_bind = match (text("HEALTH_BIND"), text("PORT")) {
            (Some(bind), _) => bind,
            (None, Some(port)) => format!("0.0.0.0:{port}"),
            (None, None) => "0.0.0.0:3000".to_string(),
        };

        Self {
            football_api_key: text("FOOTBALL_API_KEY"),
            football_api_url: text("FOOTBALL_API_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            competition: text("FOOTBALL_COMPETITION").unwrap_or_else(|| DEFAULT_COMPETITION.to_string()),
            news_feed_url: text("NEWS_FEED_URL"),
            telegram_token: text("TELEGRAM_BOT_TOKEN"),
            telegram_chat_id: text("TELEGRAM_CHAT_ID").and_then(|v| v.parse().ok()),
            match_poll_interval: Duration::from_secs(number("MATCH_POLL_INTERVAL_SECS", 30).max(1)),
            news_poll_interval: Duration::from_secs(number("NEWS_POLL_INTERVAL_SECS", 120).max(1)),
            http_timeout: Duration::from_secs(number("HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS).max(1)),
            match_grace_polls: number("MATCH_STATE_GRACE_POLLS", DEFAULT_GRACE_POLLS),
            news_dedup_capacity: number("NEWS_DEDUP_CAPACITY", DEFAULT_DEDUP_CAPACITY as u64) as usize,
            news_scan_depth: number("NEWS_SCAN_DEPTH", DEFAULT_SCAN_DEPTH as u64) as usize,
            command_cooldown_ms: i64::try_from(number("COMMAND_COOLDOWN_MS", DEFAULT_COOLDOWN_MS as u64))
                .unwrap_or(DEFAULT_COOLDOWN_MS),
            health_bind,
            log_dir: text("LOG_DIR").unwrap_or_else(|| "logs".to_string()),
            instance_id: text("INSTANCE_ID").unwrap_or_else(random_instance_id),
        }
    }

    pub fn log_summary(&self) {
        info!("instance: {}", self.instance_id);
        info!(
            "match poll every {}s, news poll every {}s, http timeout {}s",
            self.match_poll_interval.as_secs(),
            self.news_poll_interval.as_secs(),
            self.http_timeout.as_secs()
        );
        if self.football_api_key.is_none() {
            warn!("FOOTBALL_API_KEY missing: match alerts and commands disabled");
        }
        if self.news_feed_url.is_none() {
            warn!("NEWS_FEED_URL missing: news alerts disabled");
        }
        if self.telegram_token.is_none() {
            warn!("TELEGRAM_BOT_TOKEN missing: no delivery, no commands");
        }
        if self.telegram_chat_id.is_none() {
            warn!("TELEGRAM_CHAT_ID missing: automatic alerts disabled");
        }
    }
}

fn random_instance_id() -> String {
    let seed = Utc::now().timestamp_subsec_nanos() ^ std::process::id().rotate_left(16);
    format!("inst-{:06x}", seed & 0x00ff_ffff)
}
