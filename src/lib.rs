//! FutNews: football match and news alerts for a Telegram chat.
//!
//! Two periodic pollers (matches, news) turn upstream snapshots into alerts;
//! a command loop answers on-demand queries; a tiny HTTP server reports
//! liveness.

pub mod commands;
pub mod config;
pub mod health;
pub mod match_poller;
pub mod news_poller;
pub mod notify;
pub mod render;
pub mod scheduler;
pub mod sources;
pub mod telegram;

#[cfg(test)]
pub(crate) mod testing;

pub use config::AppConfig;
pub use notify::{Alert, LogNotifier, Notifier, TelegramNotifier};
pub use scheduler::{run_periodic, PollTask, RuntimeStatus, SharedStatus, TickReport};
