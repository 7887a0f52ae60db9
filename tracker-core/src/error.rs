//! Error type for the bot core.

use thiserror::Error;

/// Top-level error: platform transport, agent stream, display formatting, startup config.
#[derive(Error, Debug)]
pub enum TrackerError {
    /// A platform call (send / edit / fetch) failed.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The agent reported a failure mid-turn.
    #[error("Stream error: {0}")]
    Stream(String),

    /// A value could not be serialized for display.
    #[error("Format error: {0}")]
    Format(String),

    /// A required setting is missing or invalid at startup.
    #[error("Config error: {0}")]
    Config(String),
}

/// Result type for core operations; uses [`TrackerError`].
pub type Result<T> = std::result::Result<T, TrackerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            TrackerError::Transport("timeout".into()).to_string(),
            "Transport error: timeout"
        );
        assert_eq!(
            TrackerError::Config("TELEGRAM_BOT_TOKEN not set".into()).to_string(),
            "Config error: TELEGRAM_BOT_TOKEN not set"
        );
    }
}
