//! Application config: platform transports, agent, and relay settings.
//!
//! Everything comes from the environment (after `.env` is loaded); CLI tokens override the matching variables.

use std::env;
use std::time::Duration;

use agent_client::EnvAgentConfig;
use stream_relay::ReconcilerConfig;
use tracing::warn;
use tracker_core::{Result, TrackerError};
use tracker_discord::DiscordConfig;
use tracker_telegram::TelegramConfig;

pub const DEFAULT_LOG_FILE: &str = "logs/tracker-bot.log";
pub const DEFAULT_THINKING_MESSAGE: &str = "Thinking...";
pub const DEFAULT_EDIT_THROTTLE_MS: u64 = 500;

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub telegram: TelegramConfig,
    /// `None` when no Discord token is configured; Discord then does not run.
    pub discord: Option<DiscordConfig>,
    pub agent: EnvAgentConfig,
    pub thinking_message: String,
    pub edit_throttle: Duration,
    pub show_tool_results: bool,
    pub log_file: String,
}

impl BotConfig {
    /// Loads from env. A missing Telegram token or OpenAI key is a [`TrackerError::Config`].
    pub fn load(telegram_token: Option<String>, discord_token: Option<String>) -> Result<Self> {
        let telegram = TelegramConfig::load(telegram_token)
            .map_err(|e| TrackerError::Config(e.to_string()))?;
        let discord = DiscordConfig::load(discord_token);
        let agent = EnvAgentConfig::from_env().map_err(|e| TrackerError::Config(e.to_string()))?;
        if agent.openai_api_key.trim().is_empty() {
            return Err(TrackerError::Config("OPENAI_API_KEY is empty".to_string()));
        }

        let thinking_message = env::var("THINKING_MESSAGE")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_THINKING_MESSAGE.to_string());
        let edit_throttle = parse_edit_throttle(env::var("EDIT_THROTTLE_MS").ok().as_deref());
        let show_tool_results = env::var("SHOW_TOOL_RESULTS")
            .map(|s| matches!(s.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);
        let log_file = env::var("LOG_FILE")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LOG_FILE.to_string());

        Ok(Self {
            telegram,
            discord,
            agent,
            thinking_message,
            edit_throttle,
            show_tool_results,
            log_file,
        })
    }

    /// Relay settings shared by both platforms.
    pub fn reconciler_config(&self) -> ReconcilerConfig {
        ReconcilerConfig {
            placeholder: self.thinking_message.clone(),
            throttle: self.edit_throttle,
            show_tool_results: self.show_tool_results,
            ..ReconcilerConfig::default()
        }
    }
}

/// Minimum gap between placeholder edits. Unset uses the default; an unparsable value is logged and ignored.
fn parse_edit_throttle(raw: Option<&str>) -> Duration {
    let millis = match raw.map(str::trim) {
        None | Some("") => DEFAULT_EDIT_THROTTLE_MS,
        Some(value) => value.parse().unwrap_or_else(|e| {
            warn!(
                value = %value,
                error = %e,
                default_ms = DEFAULT_EDIT_THROTTLE_MS,
                "EDIT_THROTTLE_MS is not a number of milliseconds, using default"
            );
            DEFAULT_EDIT_THROTTLE_MS
        }),
    };
    Duration::from_millis(millis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const KEYS: &[&str] = &[
        "TELEGRAM_BOT_TOKEN",
        "DISCORD_BOT_TOKEN",
        "OPENAI_API_KEY",
        "THINKING_MESSAGE",
        "EDIT_THROTTLE_MS",
        "SHOW_TOOL_RESULTS",
        "LOG_FILE",
    ];

    fn clear_env() {
        for key in KEYS {
            env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn test_load_defaults() {
        clear_env();
        env::set_var("TELEGRAM_BOT_TOKEN", "123:abc");
        env::set_var("OPENAI_API_KEY", "sk-test");

        let config = BotConfig::load(None, None).unwrap();
        assert_eq!(config.telegram.bot_token, "123:abc");
        assert!(config.discord.is_none());
        assert_eq!(config.thinking_message, "Thinking...");
        assert_eq!(config.edit_throttle, Duration::from_millis(500));
        assert!(!config.show_tool_results);
        assert_eq!(config.log_file, "logs/tracker-bot.log");

        clear_env();
    }

    #[test]
    #[serial]
    fn test_load_missing_telegram_token_is_config_error() {
        clear_env();
        env::set_var("OPENAI_API_KEY", "sk-test");

        let err = BotConfig::load(None, None).unwrap_err();
        assert!(matches!(err, TrackerError::Config(_)));

        clear_env();
    }

    #[test]
    #[serial]
    fn test_load_missing_openai_key_is_config_error() {
        clear_env();
        env::set_var("TELEGRAM_BOT_TOKEN", "123:abc");

        let err = BotConfig::load(None, None).unwrap_err();
        assert!(matches!(err, TrackerError::Config(_)));

        clear_env();
    }

    #[test]
    #[serial]
    fn test_cli_tokens_override_env() {
        clear_env();
        env::set_var("TELEGRAM_BOT_TOKEN", "env-token");
        env::set_var("OPENAI_API_KEY", "sk-test");

        let config = BotConfig::load(
            Some("cli-token".to_string()),
            Some("discord-cli".to_string()),
        )
        .unwrap();
        assert_eq!(config.telegram.bot_token, "cli-token");
        assert_eq!(
            config.discord.map(|d| d.bot_token).as_deref(),
            Some("discord-cli")
        );

        clear_env();
    }

    #[test]
    #[serial]
    fn test_relay_settings_from_env() {
        clear_env();
        env::set_var("TELEGRAM_BOT_TOKEN", "123:abc");
        env::set_var("OPENAI_API_KEY", "sk-test");
        env::set_var("THINKING_MESSAGE", "One moment...");
        env::set_var("EDIT_THROTTLE_MS", "250");
        env::set_var("SHOW_TOOL_RESULTS", "true");

        let config = BotConfig::load(None, None).unwrap();
        let relay = config.reconciler_config();
        assert_eq!(relay.placeholder, "One moment...");
        assert_eq!(relay.throttle, Duration::from_millis(250));
        assert!(relay.show_tool_results);

        clear_env();
    }

    #[test]
    fn test_parse_edit_throttle() {
        assert_eq!(parse_edit_throttle(None), Duration::from_millis(500));
        assert_eq!(parse_edit_throttle(Some(" 750 ")), Duration::from_millis(750));
        assert_eq!(parse_edit_throttle(Some("")), Duration::from_millis(500));
        assert_eq!(parse_edit_throttle(Some("fast")), Duration::from_millis(500));
        assert_eq!(parse_edit_throttle(Some("-5")), Duration::from_millis(500));
    }

    #[test]
    #[serial]
    fn test_invalid_edit_throttle_falls_back_to_default() {
        clear_env();
        env::set_var("TELEGRAM_BOT_TOKEN", "123:abc");
        env::set_var("OPENAI_API_KEY", "sk-test");
        env::set_var("EDIT_THROTTLE_MS", "half a second");

        let config = BotConfig::load(None, None).unwrap();
        assert_eq!(config.edit_throttle, Duration::from_millis(500));

        clear_env();
    }
}
