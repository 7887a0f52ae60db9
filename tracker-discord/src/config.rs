//! Discord transport config. Discord is optional: without `DISCORD_BOT_TOKEN` it does not run.

use std::env;
use std::time::Duration;

pub const DEFAULT_REMINDER_PERIOD_SECS: u64 = 24 * 60 * 60;

#[derive(Debug, Clone)]
pub struct DiscordConfig {
    pub bot_token: String,
    pub reminder_period: Duration,
}

impl DiscordConfig {
    /// `None` when `DISCORD_BOT_TOKEN` is unset or blank.
    pub fn from_env() -> Option<Self> {
        Self::load(None)
    }

    /// A given token wins over `DISCORD_BOT_TOKEN`; `None` when neither is set.
    pub fn load(token: Option<String>) -> Option<Self> {
        let bot_token = token
            .or_else(|| env::var("DISCORD_BOT_TOKEN").ok())
            .filter(|s| !s.trim().is_empty())?;
        let mut config = Self::with_token(bot_token);
        config.reminder_period = env::var("DISCORD_REMINDER_PERIOD_SECS")
            .ok()
            .and_then(|s| s.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(config.reminder_period);
        Some(config)
    }

    pub fn with_token(bot_token: String) -> Self {
        Self {
            bot_token,
            reminder_period: Duration::from_secs(DEFAULT_REMINDER_PERIOD_SECS),
        }
    }
}
