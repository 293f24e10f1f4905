//! Chat commands: parsing, admission and replies.
//!
//! Accepted forms are `/cmd`, `!cmd` and `/cmd@botname`, with an optional
//! argument after the first whitespace.

use anyhow::Result;
use chrono::{DateTime, Days, Utc};
use command_guard::{Admission, CommandGuard};
use feed_client::{StandingRow, UpcomingMatch};
use logger::{now_iso, CommandEvent, EventLogger};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::render;
use crate::sources::LeagueSource;
use crate::telegram::{TelegramClient, TgUpdate};

pub const STANDINGS_MAX_ROWS: usize = 20;
pub const ROUND_LOOKAHEAD_DAYS: u64 = 14;
pub const ROUND_MAX_FIXTURES: usize = 10;
pub const TEAM_LOOKAHEAD_DAYS: u64 = 30;
pub const TEAM_MAX_FIXTURES: usize = 3;

const LONG_POLL_SECS: u64 = 25;
const RETRY_DELAY: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Standings { top: usize },
    Upcoming,
    Live,
    Team(String),
    Ping,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Help => "ajuda",
            Command::Standings { .. } => "tabela",
            Command::Upcoming => "rodada",
            Command::Live => "aovivo",
            Command::Team(_) => "time",
            Command::Ping => "teste",
        }
    }
}

/// `None` for anything that is not one of our commands, including commands
/// addressed to a different bot.
pub fn parse_command(text: &str, bot_username: Option<&str>) -> Option<Command> {
    let text = text.trim();
    let rest = text.strip_prefix('/').or_else(|| text.strip_prefix('!'))?;
    let (head, arg) = match rest.split_once(char::is_whitespace) {
        Some((head, arg)) => (head, arg.trim()),
        None => (rest, ""),
    };
    let name = match head.split_once('@') {
        Some((name, mention)) => {
            if let Some(bot) = bot_username {
                if !mention.eq_ignore_ascii_case(bot) {
                    return None;
                }
            }
            name
        }
        None => head,
    };

    match name.to_lowercase().as_str() {
        "ajuda" | "help" | "start" => Some(Command::Help),
        "tabela" => Some(Command::Standings { top: parse_top(arg) }),
        "rodada" => Some(Command::Upcoming),
        "aovivo" => Some(Command::Live),
        "ao" if arg.eq_ignore_ascii_case("vivo") => Some(Command::Live),
        "time" if !arg.is_empty() => Some(Command::Team(arg.to_string())),
        "teste" | "ping" => Some(Command::Ping),
        _ => None,
    }
}

fn parse_top(arg: &str) -> usize {
    arg.split_whitespace()
        .next()
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(STANDINGS_MAX_ROWS)
        .clamp(1, STANDINGS_MAX_ROWS)
}

/// Lowercase with diacritics stripped: "Grêmio" and "gremio" compare equal.
pub fn fold(s: &str) -> String {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

/// First row whose name or short name contains the query, or whose TLA
/// equals it.
pub fn find_team<'a>(rows: &'a [StandingRow], query: &str) -> Option<&'a StandingRow> {
    let q = fold(query.trim());
    if q.is_empty() {
        return None;
    }
    rows.iter().find(|r| {
        fold(&r.team.name).contains(&q)
            || r.team.short_name.as_deref().map(|s| fold(s).contains(&q)).unwrap_or(false)
            || r.team.tla.as_deref().map(|t| fold(t) == q).unwrap_or(false)
    })
}

// ====================================================================
// Handler
// ====================================================================

pub struct CommandHandler<L> {
    league: Option<L>,
    instance_id: String,
}

impl<L: LeagueSource> CommandHandler<L> {
    pub fn new(league: Option<L>, instance_id: impl Into<String>) -> Self {
        Self {
            league,
            instance_id: instance_id.into(),
        }
    }

    fn league(&self) -> Result<&L> {
        self.league
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("FOOTBALL_API_KEY not set"))
    }

    pub async fn execute(&self, command: &Command, now: DateTime<Utc>) -> Result<String> {
        let today = now.date_naive();
        let id = &self.instance_id;
        match command {
            Command::Help => Ok(render::help_text(id)),
            Command::Ping => Ok(render::ping_text(id)),
            Command::Standings { top } => {
                let rows = self.league()?.standings().await?;
                let shown = &rows[..rows.len().min(*top)];
                Ok(render::standings_text(shown, id))
            }
            Command::Upcoming => {
                let mut fixtures = self
                    .league()?
                    .upcoming(today, today + Days::new(ROUND_LOOKAHEAD_DAYS))
                    .await?;
                fixtures.truncate(ROUND_MAX_FIXTURES);
                Ok(render::upcoming_text(&fixtures, id))
            }
            Command::Live => {
                let live = self.league()?.live().await?;
                Ok(render::live_text(&live, id))
            }
            Command::Team(query) => {
                let league = self.league()?;
                let rows = league.standings().await?;
                let Some(row) = find_team(&rows, query) else {
                    return Ok(render::team_not_found_text(query));
                };
                let next: Vec<UpcomingMatch> = match row.team.id {
                    Some(team_id) => league
                        .upcoming(today, today + Days::new(TEAM_LOOKAHEAD_DAYS))
                        .await?
                        .into_iter()
                        .filter(|m| m.involves(team_id))
                        .take(TEAM_MAX_FIXTURES)
                        .collect(),
                    None => Vec::new(),
                };
                Ok(render::team_text(row, &next, id))
            }
        }
    }

    /// Reply text and whether it succeeded. Failures become one generic reply.
    pub async fn respond(&self, command: &Command, now: DateTime<Utc>) -> (String, bool) {
        match self.execute(command, now).await {
            Ok(text) => (text, true),
            Err(e) => {
                warn!("command {} failed: {:#}", command.name(), e);
                (render::error_text(), false)
            }
        }
    }
}

// ====================================================================
// Telegram loop
// ====================================================================

/// A command that passed parsing and admission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accepted {
    pub chat_id: i64,
    pub user_id: i64,
    pub command: Command,
}

/// Parse and admit one update. Non-commands and bot messages yield `None`
/// without touching the guard.
pub fn triage(
    update: &TgUpdate,
    bot_username: Option<&str>,
    guard: &mut CommandGuard,
    logger: &EventLogger,
    now: DateTime<Utc>,
) -> Option<Accepted> {
    let msg = update.message.as_ref()?;
    let text = msg.text.as_deref()?;
    if msg.from.as_ref().map(|u| u.is_bot).unwrap_or(false) {
        return None;
    }
    let command = parse_command(text, bot_username)?;
    let user_id = msg.from.as_ref().map(|u| u.id).unwrap_or(msg.chat.id);

    let admission = guard.admit(update.update_id, msg.chat.id, user_id, text, now);
    if admission != Admission::Accepted {
        debug!("command {} from {} dropped: {}", command.name(), user_id, admission.as_str());
        log_command(logger, msg.chat.id, user_id, &command, admission, false);
        return None;
    }
    Some(Accepted {
        chat_id: msg.chat.id,
        user_id,
        command,
    })
}

fn log_command(logger: &EventLogger, chat_id: i64, user_id: i64, command: &Command, admission: Admission, ok: bool) {
    let event = CommandEvent {
        ts: now_iso(),
        event: "COMMAND",
        chat_id,
        user_id,
        command: command.name().to_string(),
        admission: admission.as_str(),
        ok,
    };
    if let Err(e) = logger.log(&event) {
        warn!("command log failed: {:#}", e);
    }
}

/// Long-poll Telegram forever. Each accepted command runs in its own task
/// so a slow upstream never stalls intake.
pub async fn run_command_loop<L: LeagueSource + 'static>(
    tg: Arc<TelegramClient>,
    handler: Arc<CommandHandler<L>>,
    mut guard: CommandGuard,
    logger: Arc<EventLogger>,
) {
    let bot_username = match tg.get_me().await {
        Ok(name) => name,
        Err(e) => {
            warn!("getMe failed, accepting any /cmd@mention: {}", e);
            None
        }
    };
    info!("command loop running (bot @{})", bot_username.as_deref().unwrap_or("?"));

    let mut offset: i64 = 0;
    loop {
        let updates = match tg.get_updates(offset, LONG_POLL_SECS).await {
            Ok(u) => u,
            Err(e) => {
                warn!("getUpdates error: {}", e);
                tokio::time::sleep(RETRY_DELAY).await;
                continue;
            }
        };

        for update in &updates {
            offset = offset.max(update.update_id + 1);
            let Some(accepted) = triage(update, bot_username.as_deref(), &mut guard, &logger, Utc::now()) else {
                continue;
            };

            let tg = tg.clone();
            let handler = handler.clone();
            let logger = logger.clone();
            tokio::spawn(async move {
                let (text, ok) = handler.respond(&accepted.command, Utc::now()).await;
                let sent = tg.send_message(accepted.chat_id, &text, false).await;
                if let Err(e) = &sent {
                    warn!("reply to {} failed: {}", accepted.chat_id, e);
                }
                log_command(
                    &logger,
                    accepted.chat_id,
                    accepted.user_id,
                    &accepted.command,
                    Admission::Accepted,
                    ok && sent.is_ok(),
                );
            });
        }
    }
}
