//! Outbound alerts: what the pollers emit and where it goes.

use anyhow::Result;
use async_trait::async_trait;
use logger::{now_iso, EventLogger, MatchAlertEvent, NewsAlertEvent};
use match_tracker::MatchEvent;
use news_watch::{fingerprint, FeedItem};
use std::sync::Arc;
use tracing::{info, warn};

use crate::render;
use crate::telegram::TelegramClient;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Alert {
    Match(MatchEvent),
    News(FeedItem),
}

impl Alert {
    pub fn kind(&self) -> &'static str {
        match self {
            Alert::Match(ev) => ev.kind(),
            Alert::News(_) => "NEWS",
        }
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, alert: &Alert) -> Result<()>;
}

#[async_trait]
impl<T: Notifier + ?Sized> Notifier for Arc<T> {
    async fn notify(&self, alert: &Alert) -> Result<()> {
        (**self).notify(alert).await
    }
}

/// Posts into one configured chat.
pub struct TelegramNotifier {
    client: Arc<TelegramClient>,
    chat_id: i64,
}

impl TelegramNotifier {
    pub fn new(client: Arc<TelegramClient>, chat_id: i64) -> Self {
        Self { client, chat_id }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, alert: &Alert) -> Result<()> {
        let text = render::alert_text(alert);
        // News gets the preview card so the article image shows up.
        let preview = matches!(alert, Alert::News(_));
        self.client.send_message(self.chat_id, &text, preview).await?;
        Ok(())
    }
}

/// Writes rendered alerts to the tracing log only.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, alert: &Alert) -> Result<()> {
        info!("[{}] {}", alert.kind(), render::alert_text(alert).replace('\n', " | "));
        Ok(())
    }
}

/// Deliver then record. Delivery failures are logged and swallowed so the
/// rest of the batch still goes out.
pub async fn deliver(notifier: &dyn Notifier, logger: &EventLogger, alert: &Alert) -> bool {
    let delivered = match notifier.notify(alert).await {
        Ok(()) => true,
        Err(e) => {
            warn!("alert {} not delivered: {:#}", alert.kind(), e);
            false
        }
    };
    if let Err(e) = audit(logger, alert, delivered) {
        warn!("audit log write failed: {:#}", e);
    }
    delivered
}

fn audit(logger: &EventLogger, alert: &Alert, delivered: bool) -> Result<()> {
    match alert {
        Alert::Match(ev) => {
            let s = ev.snapshot();
            let scorer = match ev {
                MatchEvent::Goal { side, .. } => Some(side.as_str()),
                _ => None,
            };
            logger.log(&MatchAlertEvent {
                ts: now_iso(),
                event: "MATCH_ALERT",
                kind: ev.kind(),
                match_id: s.id,
                home: s.home_name.clone(),
                away: s.away_name.clone(),
                home_score: s.home_score,
                away_score: s.away_score,
                kickoff: s.kickoff.map(|k| k.to_rfc3339()),
                scorer,
                delivered,
            })
        }
        Alert::News(item) => logger.log(&NewsAlertEvent {
            ts: now_iso(),
            event: "NEWS_ALERT",
            title: item.title.clone(),
            link: item.link.clone(),
            fingerprint: fingerprint(item).to_hex(),
            delivered,
        }),
    }
}
