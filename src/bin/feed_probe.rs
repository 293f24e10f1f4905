/// Feed probe: one fetch from each configured upstream, printed.
///
/// Shows the normalized match snapshots, what a cold start would alert
/// right now, and the head of the news feed with fingerprints. Nothing is
/// posted anywhere.
///
///   cargo run --bin feed-probe

use anyhow::Result;
use chrono::{Days, Utc};
use dotenv::dotenv;
use feed_client::{FootballClient, RssClient};
use futnews::match_poller::MATCH_LOOKAHEAD_DAYS;
use futnews::{Alert, AppConfig, LogNotifier, Notifier};
use match_tracker::detect;
use news_watch::fingerprint;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    let cfg = AppConfig::from_env();
    let now = Utc::now();
    let notifier = LogNotifier;

    match &cfg.football_api_key {
        Some(key) => {
            let client = FootballClient::with_base_url(
                cfg.football_api_url.clone(),
                cfg.competition.clone(),
                key.clone(),
                cfg.http_timeout,
            );
            let from = now.date_naive();
            let to = from + Days::new(MATCH_LOOKAHEAD_DAYS);
            match client.fetch_matches(from, to).await {
                Ok(snaps) => {
                    info!("{}: {} matches {} → {}", client.competition(), snaps.len(), from, to);
                    for s in &snaps {
                        info!(
                            "  #{} {:<9} {} {} {} | kickoff {}",
                            s.id,
                            s.status.as_str(),
                            s.home_name,
                            s.score_line(),
                            s.away_name,
                            s.kickoff.map(|k| k.to_rfc3339()).unwrap_or_else(|| "?".into())
                        );
                        for ev in detect(None, s, now).events {
                            notifier.notify(&Alert::Match(ev)).await?;
                        }
                    }
                }
                Err(e) => warn!("match fetch failed: {:#}", e),
            }
        }
        None => warn!("FOOTBALL_API_KEY not set, skipping matches"),
    }

    match &cfg.news_feed_url {
        Some(url) => {
            let client = RssClient::new(cfg.http_timeout);
            match client.fetch_items(url).await {
                Ok(items) => {
                    info!("{}: {} items", url, items.len());
                    for item in items.iter().take(cfg.news_scan_depth) {
                        info!(
                            "  {} {} | {}",
                            &fingerprint(item).to_hex()[..12],
                            item.title,
                            item.link
                        );
                    }
                    if let Some(newest) = items.first() {
                        notifier.notify(&Alert::News(newest.clone())).await?;
                    }
                }
                Err(e) => warn!("news fetch failed: {:#}", e),
            }
        }
        None => warn!("NEWS_FEED_URL not set, skipping news"),
    }

    Ok(())
}
