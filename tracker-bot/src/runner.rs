//! Wires the agent, the platform transports and the per-platform handler chains, then runs until Telegram
//! stops.

use std::future::Future;
use std::sync::Arc;

use agent_client::{
    mask_token, Agent, InMemoryMemoryStore, MemoryStore, OpenAiAgent, OpenAiEmbedding,
};
use anyhow::Result;
use handler_chain::HandlerChain;
use reminder::ReminderScheduler;
use stream_relay::{DiscordMarkdown, ReconcilerConfig, Renderer, TelegramHtml};
use tracing::{error, info, instrument, warn};
use tracker_core::{Bot, Platform};
use tracker_discord::{run_gateway, DiscordBotAdapter};
use tracker_telegram::{register_commands, run_repl, TelegramBotAdapter};

use crate::agent_handler::AgentHandler;
use crate::commands::CommandHandler;
use crate::config::BotConfig;
use crate::replies::{check_in_template, COMMANDS};

/// Command handler first, agent handler last.
pub fn build_chain(
    bot: Arc<dyn Bot>,
    agent: Arc<dyn Agent>,
    renderer: Arc<dyn Renderer>,
    scheduler: Arc<ReminderScheduler>,
    relay: ReconcilerConfig,
) -> HandlerChain {
    HandlerChain::new()
        .add_handler(Arc::new(CommandHandler::new(bot.clone(), scheduler)))
        .add_handler(Arc::new(AgentHandler::new(bot, agent, renderer, relay)))
}

/// Scheduler sending `platform`'s check-in through `bot`.
pub fn build_scheduler(
    bot: Arc<dyn Bot>,
    platform: Platform,
    period: std::time::Duration,
) -> Arc<ReminderScheduler> {
    Arc::new(ReminderScheduler::new(bot, period, check_in_template(platform)))
}

/// Runs `secondary` in its own task and awaits `primary`. A secondary failure is logged and leaves the
/// primary running; the primary's result is returned.
pub async fn run_alongside<P, S>(primary: P, name: &'static str, secondary: S) -> Result<()>
where
    P: Future<Output = Result<()>>,
    S: Future<Output = Result<()>> + Send + 'static,
{
    let handle = tokio::spawn(async move {
        match secondary.await {
            Ok(()) => warn!(transport = name, "Transport stopped"),
            Err(e) => error!(transport = name, error = %e, "Transport failed, others keep running"),
        }
    });
    let result = primary.await;
    handle.abort();
    result
}

/// Runs Telegram, and Discord when configured. Returns when Telegram stops; Discord failures are logged only.
#[instrument(skip(config))]
pub async fn run_bot(config: BotConfig) -> Result<()> {
    info!(
        model = %config.agent.agent_model,
        base_url = %config.agent.openai_base_url,
        api_key = %mask_token(&config.agent.openai_api_key),
        embedding_model = %config.agent.embedding_model,
        recall_top_k = config.agent.recall_top_k,
        discord = config.discord.is_some(),
        "Initializing bot"
    );

    let memory: Arc<dyn MemoryStore> = Arc::new(InMemoryMemoryStore::new());
    let embedding = Arc::new(OpenAiEmbedding::new(&config.agent));
    let agent: Arc<dyn Agent> =
        Arc::new(OpenAiAgent::new(&config.agent, memory).with_embedding(embedding));
    let relay = config.reconciler_config();

    let teloxide_bot = config.telegram.build_bot();
    let telegram_bot: Arc<dyn Bot> = Arc::new(TelegramBotAdapter::new(teloxide_bot.clone()));
    let telegram_chain = build_chain(
        telegram_bot.clone(),
        agent.clone(),
        Arc::new(TelegramHtml),
        build_scheduler(telegram_bot, Platform::Telegram, config.telegram.reminder_period),
        relay.clone(),
    );
    register_commands(&teloxide_bot, COMMANDS).await;

    match config.discord {
        Some(discord) => {
            let discord_bot: Arc<dyn Bot> = Arc::new(DiscordBotAdapter::from_token(&discord.bot_token));
            let discord_chain = build_chain(
                discord_bot.clone(),
                agent,
                Arc::new(DiscordMarkdown),
                build_scheduler(discord_bot, Platform::Discord, discord.reminder_period),
                relay,
            );
            info!("Bot started successfully (telegram + discord)");
            let token = discord.bot_token;
            run_alongside(
                run_repl(teloxide_bot, telegram_chain),
                "discord",
                async move { run_gateway(&token, discord_chain).await },
            )
            .await
        }
        None => {
            info!("Bot started successfully (telegram)");
            run_repl(teloxide_bot, telegram_chain).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tokio::sync::oneshot;

    /// **Test: a failing secondary transport does not end the primary one.**
    #[tokio::test]
    async fn test_secondary_failure_keeps_primary_running() {
        let (failed_tx, failed_rx) = oneshot::channel::<()>();
        let primary_done = Arc::new(AtomicBool::new(false));
        let done = primary_done.clone();

        let primary = async move {
            // Still running after the secondary has failed.
            failed_rx.await.ok();
            tokio::task::yield_now().await;
            done.store(true, Ordering::SeqCst);
            Ok(())
        };
        let secondary = async move {
            let _ = failed_tx.send(());
            Err(anyhow::anyhow!("gateway rejected token"))
        };

        run_alongside(primary, "discord", secondary).await.unwrap();
        assert!(primary_done.load(Ordering::SeqCst));
    }

    /// **Test: the primary's error is what the caller sees.**
    #[tokio::test]
    async fn test_primary_error_is_returned() {
        let err = run_alongside(
            async { Err(anyhow::anyhow!("polling stopped")) },
            "discord",
            std::future::pending::<Result<()>>(),
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("polling stopped"));
    }
}
