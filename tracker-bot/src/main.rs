//! Binary for the symptom tracker bot.

use anyhow::{Context, Result};
use clap::Parser;
use tracker_bot::{run_bot, BotConfig, Cli, Commands};
use tracker_core::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            telegram_token,
            discord_token,
        } => {
            let config = BotConfig::load(telegram_token, discord_token)?;
            init_tracing(&config.log_file).context("Failed to initialize logging")?;
            run_bot(config).await
        }
    }
}
