//! FutNews — Command Guard
//!
//! Pre-conditions a command handler checks before doing any work:
//! inbound redelivery dedup (by message id) and a per
//! (chat, user, command) cooldown.

mod rate_limit;
mod seen;

pub use rate_limit::{normalize_command, CommandKey, CommandRateLimiter, DEFAULT_ENTRY_TTL_SECS};
pub use seen::{SeenIds, DEFAULT_SEEN_RETENTION_SECS};

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

/// Default minimum gap between two accepted identical commands.
pub const DEFAULT_COOLDOWN_MS: i64 = 4_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Accepted,
    /// Same inbound message id already handled.
    Duplicate,
    /// Same command from the same user in the same chat too recently.
    CoolingDown,
}

impl Admission {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::Duplicate => "duplicate",
            Self::CoolingDown => "cooling_down",
        }
    }
}

/// Owned by the command loop; never shared with the pollers.
#[derive(Debug)]
pub struct CommandGuard {
    seen: SeenIds<i64>,
    limiter: CommandRateLimiter,
    cooldown: Duration,
}

impl Default for CommandGuard {
    fn default() -> Self {
        Self::new(Duration::milliseconds(DEFAULT_COOLDOWN_MS))
    }
}

impl CommandGuard {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            seen: SeenIds::new(Duration::seconds(DEFAULT_SEEN_RETENTION_SECS)),
            limiter: CommandRateLimiter::new(Duration::seconds(DEFAULT_ENTRY_TTL_SECS)),
            cooldown,
        }
    }

    /// Dedup first, cooldown second: a redelivered message is always
    /// reported as a duplicate and never touches the limiter.
    pub fn admit(
        &mut self,
        message_id: i64,
        chat_id: i64,
        user_id: i64,
        text: &str,
        now: DateTime<Utc>,
    ) -> Admission {
        if self.seen.seen(message_id, now) {
            debug!(message_id, "duplicate inbound message");
            return Admission::Duplicate;
        }
        if !self.limiter.allow(chat_id, user_id, text, now, self.cooldown) {
            debug!(chat_id, user_id, command = text, "command cooling down");
            return Admission::CoolingDown;
        }
        Admission::Accepted
    }
}
