//! Telegram transport config: token, optional API URL, reminder period.
//! Loaded from `TELEGRAM_BOT_TOKEN`, `TELEGRAM_API_URL`, `TELEGRAM_REMINDER_PERIOD_SECS`.

use anyhow::Result;
use std::env;
use std::time::Duration;
use teloxide::Bot;
use tracing::error;

pub const DEFAULT_REMINDER_PERIOD_SECS: u64 = 24 * 60 * 60;

#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub telegram_api_url: Option<String>,
    pub reminder_period: Duration,
}

impl TelegramConfig {
    /// Loads from environment: TELEGRAM_BOT_TOKEN is required, the rest optional.
    pub fn from_env() -> Result<Self> {
        Self::load(None)
    }

    /// Like [`Self::from_env`], but a given token wins over TELEGRAM_BOT_TOKEN.
    pub fn load(token: Option<String>) -> Result<Self> {
        let bot_token = token
            .or_else(|| env::var("TELEGRAM_BOT_TOKEN").ok())
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| anyhow::anyhow!("TELEGRAM_BOT_TOKEN not set"))?;
        let mut config = Self::with_token(bot_token);
        config.telegram_api_url = env::var("TELEGRAM_API_URL")
            .or_else(|_| env::var("TELOXIDE_API_URL"))
            .ok()
            .filter(|s| !s.trim().is_empty());
        config.reminder_period = reminder_period_from_env("TELEGRAM_REMINDER_PERIOD_SECS");
        Ok(config)
    }

    /// Builds with the given token; other fields default.
    pub fn with_token(bot_token: String) -> Self {
        Self {
            bot_token,
            telegram_api_url: None,
            reminder_period: Duration::from_secs(DEFAULT_REMINDER_PERIOD_SECS),
        }
    }

    /// teloxide Bot for this config. An invalid API URL is logged and the default endpoint used.
    pub fn build_bot(&self) -> Bot {
        let bot = Bot::new(self.bot_token.clone());
        match self.telegram_api_url {
            Some(ref url_str) => match reqwest::Url::parse(url_str) {
                Ok(url) => bot.set_api_url(url),
                Err(e) => {
                    error!(error = %e, url = %url_str, "Invalid TELEGRAM_API_URL, using default");
                    bot
                }
            },
            None => bot,
        }
    }
}

/// Reads a positive number of seconds; missing, zero or invalid values give the 24 h default.
fn reminder_period_from_env(key: &str) -> Duration {
    let secs = env::var(key)
        .ok()
        .and_then(|s| s.trim().parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .unwrap_or(DEFAULT_REMINDER_PERIOD_SECS);
    Duration::from_secs(secs)
}
