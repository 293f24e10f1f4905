use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

/// Entries older than this may be forgotten.
pub const DEFAULT_ENTRY_TTL_SECS: i64 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommandKey {
    pub chat_id: i64,
    pub user_id: i64,
    pub command: String,
}

/// Lowercase, trimmed, inner whitespace collapsed. Arguments stay part of
/// the key, so `!tabela 10` and `!tabela 5` cool down independently.
pub fn normalize_command(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// (chat, user, command) → last accepted invocation.
#[derive(Debug)]
pub struct CommandRateLimiter {
    last_accepted: HashMap<CommandKey, DateTime<Utc>>,
    ttl: Duration,
    /// Largest interval ever checked; purge never goes below it.
    longest_interval: Duration,
}

impl CommandRateLimiter {
    pub fn new(ttl: Duration) -> Self {
        Self {
            last_accepted: HashMap::new(),
            ttl,
            longest_interval: Duration::zero(),
        }
    }

    /// Accept and record `now` when the key is unknown or its last accepted
    /// call is at least `min_interval` old. Rejections leave the timestamp
    /// alone, so spamming does not extend the cooldown.
    pub fn allow(
        &mut self,
        chat_id: i64,
        user_id: i64,
        command: &str,
        now: DateTime<Utc>,
        min_interval: Duration,
    ) -> bool {
        if min_interval > self.longest_interval {
            self.longest_interval = min_interval;
        }
        self.purge(now);

        let key = CommandKey {
            chat_id,
            user_id,
            command: normalize_command(command),
        };
        if let Some(last) = self.last_accepted.get(&key) {
            if now.signed_duration_since(*last) < min_interval {
                return false;
            }
        }
        self.last_accepted.insert(key, now);
        true
    }

    /// Drop entries older than max(ttl, longest interval checked).
    pub fn purge(&mut self, now: DateTime<Utc>) -> usize {
        let keep_for = self.ttl.max(self.longest_interval);
        let before = self.last_accepted.len();
        self.last_accepted
            .retain(|_, last| now.signed_duration_since(*last) < keep_for);
        before - self.last_accepted.len()
    }

    pub fn len(&self) -> usize {
        self.last_accepted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_accepted.is_empty()
    }
}
