/// FutNews — match + news alert bot
///
/// What it does:
///   1. Polls football-data.org every 30s: PREGAME / KICKOFF / GOAL / FULLTIME
///   2. Polls one RSS/Atom feed every 120s: newest unseen article
///   3. Answers /tabela /rodada /aovivo /time /ajuda /teste in Telegram
///   4. GET /health, /state for the hosting platform
///
/// Run:
///   cargo run --bin futnews

use anyhow::{Context, Result};
use command_guard::CommandGuard;
use dotenv::dotenv;
use feed_client::{FootballClient, RssClient};
use futnews::commands::{run_command_loop, CommandHandler};
use futnews::health::start_http_server;
use futnews::match_poller::MatchPollTask;
use futnews::news_poller::NewsPollTask;
use futnews::scheduler::{run_periodic, shared_status, SharedStatus};
use futnews::telegram::TelegramClient;
use futnews::{AppConfig, TelegramNotifier};
use logger::{now_iso, EventLogger, SystemHeartbeatEvent};
use match_tracker::MatchStateStore;
use news_watch::{DedupStore, NewsWatch};
use std::env;
use std::fs::File;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

const HEARTBEAT_EVERY: Duration = Duration::from_secs(300);

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
    info!("=== FutNews — match + news alerts ===");
    cfg.log_summary();
    info!("Logs: ./{}/", cfg.log_dir);

    // Single instance lock
    let lock_file_path = env::temp_dir().join("futnews.lock");
    let lock_file = match File::create(&lock_file_path) {
        Ok(f) => f,
        Err(e) => {
            warn!("Failed to create lock file at {:?}: {}", lock_file_path, e);
            return Ok(());
        }
    };

    let mut lock = fd_lock::RwLock::new(lock_file);
    let _write_guard = match lock.try_write() {
        Ok(guard) => {
            info!("Acquired single-instance lock.");
            guard
        }
        Err(_) => {
            warn!("Another FutNews instance is already running! Exiting.");
            return Ok(());
        }
    };

    let bind: SocketAddr = cfg
        .health_bind
        .parse()
        .with_context(|| format!("Invalid HEALTH_BIND / PORT: {}", cfg.health_bind))?;

    let logger = Arc::new(EventLogger::new(&cfg.log_dir));
    let status = shared_status(cfg.instance_id.clone());

    let telegram = cfg
        .telegram_token
        .as_ref()
        .map(|token| Arc::new(TelegramClient::new(token.clone(), cfg.http_timeout)));
    let notifier = match (&telegram, cfg.telegram_chat_id) {
        (Some(tg), Some(chat_id)) => Some(Arc::new(TelegramNotifier::new(tg.clone(), chat_id))),
        _ => None,
    };
    let football = cfg.football_api_key.as_ref().map(|key| {
        Arc::new(FootballClient::with_base_url(
            cfg.football_api_url.clone(),
            cfg.competition.clone(),
            key.clone(),
            cfg.http_timeout,
        ))
    });
    let rss = cfg.news_feed_url.as_ref().map(|_| RssClient::new(cfg.http_timeout));

    // ── Pollers ──────────────────────────────────────────────────────────────
    let match_task = MatchPollTask::new(
        football.clone(),
        notifier.clone(),
        MatchStateStore::new(cfg.match_grace_polls),
        logger.clone(),
    );
    tokio::spawn(run_periodic(match_task, cfg.match_poll_interval, status.clone(), logger.clone()));

    let news_task = NewsPollTask::new(
        rss,
        cfg.news_feed_url.clone(),
        notifier.clone(),
        NewsWatch::new(DedupStore::new(cfg.news_dedup_capacity), cfg.news_scan_depth),
        logger.clone(),
    );
    tokio::spawn(run_periodic(news_task, cfg.news_poll_interval, status.clone(), logger.clone()));

    // ── Commands ─────────────────────────────────────────────────────────────
    match telegram {
        Some(tg) => {
            let handler = Arc::new(CommandHandler::new(football, cfg.instance_id.clone()));
            let guard = CommandGuard::new(chrono::Duration::milliseconds(cfg.command_cooldown_ms));
            tokio::spawn(run_command_loop(tg, handler, guard, logger.clone()));
        }
        None => warn!("No TELEGRAM_BOT_TOKEN: command loop not started"),
    }

    // ── Health + heartbeat ───────────────────────────────────────────────────
    let health_status = status.clone();
    tokio::spawn(async move {
        if let Err(e) = start_http_server(health_status, bind).await {
            error!("health endpoint stopped: {:#}", e);
        }
    });

    tokio::spawn(heartbeat(status, logger));

    tokio::signal::ctrl_c().await.context("ctrl-c handler")?;
    info!("Shutting down.");
    Ok(())
}

async fn heartbeat(status: SharedStatus, logger: Arc<EventLogger>) {
    let mut interval = tokio::time::interval(HEARTBEAT_EVERY);
    interval.tick().await;
    loop {
        interval.tick().await;
        let st = status.read().await.clone();
        let matches = st.task("matches");
        let news = st.task("news");
        info!(
            "💓 {} | matches: {} ticks, {} tracked | news: {} ticks | failed: {}",
            st.instance_id,
            matches.ticks,
            matches.retained,
            news.ticks,
            st.failed_ticks()
        );
        let event = SystemHeartbeatEvent {
            ts: now_iso(),
            event: "SYSTEM_HEARTBEAT",
            instance_id: st.instance_id.clone(),
            tracked_matches: matches.retained,
            match_ticks: matches.ticks,
            news_ticks: news.ticks,
            failed_ticks: st.failed_ticks(),
        };
        if let Err(e) = logger.log(&event) {
            warn!("heartbeat log failed: {:#}", e);
        }
    }
}
