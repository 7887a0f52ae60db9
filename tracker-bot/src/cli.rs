//! Command-line interface. Tokens given here take precedence over the environment.

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "tracker-bot")]
#[command(about = "Symptom tracker assistant for Telegram and Discord", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the bot (Telegram always; Discord when a token is configured)
    Run {
        /// Telegram bot token (overrides TELEGRAM_BOT_TOKEN)
        #[arg(long)]
        telegram_token: Option<String>,

        /// Discord bot token (overrides DISCORD_BOT_TOKEN)
        #[arg(long)]
        discord_token: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_with_tokens() {
        let cli = Cli::parse_from([
            "tracker-bot",
            "run",
            "--telegram-token",
            "123:abc",
            "--discord-token",
            "xyz",
        ]);
        match cli.command {
            Commands::Run {
                telegram_token,
                discord_token,
            } => {
                assert_eq!(telegram_token.as_deref(), Some("123:abc"));
                assert_eq!(discord_token.as_deref(), Some("xyz"));
            }
        }
    }

    #[test]
    fn test_parse_run_without_tokens() {
        let cli = Cli::parse_from(["tracker-bot", "run"]);
        let Commands::Run {
            telegram_token,
            discord_token,
        } = cli.command;
        assert!(telegram_token.is_none());
        assert!(discord_token.is_none());
    }
}
