//! REPL runner: each teloxide message becomes a core [`tracker_core::Message`] handled by the [`HandlerChain`]
//! in its own task.

use anyhow::Result;
use handler_chain::HandlerChain;
use teloxide::prelude::*;
use teloxide::types::BotCommand;
use tracing::{error, info, instrument, warn};
use tracker_core::ToCoreMessage;

use super::adapters::TelegramMessageWrapper;

/// Registers the bot's command menu (`/command` → description). Failure is logged; the bot still runs.
#[instrument(skip(bot, commands), fields(count = commands.len()))]
pub async fn register_commands(bot: &teloxide::Bot, commands: &[(&str, &str)]) {
    let commands: Vec<BotCommand> = commands
        .iter()
        .map(|(command, description)| BotCommand::new(*command, *description))
        .collect();
    match bot.set_my_commands(commands).await {
        Ok(_) => info!("step: telegram commands registered"),
        Err(e) => warn!(error = %e, "Failed to register telegram commands"),
    }
}

/// Starts the REPL with the given teloxide Bot and HandlerChain. Returns when the dispatcher stops.
#[instrument(skip(bot, handler_chain))]
pub async fn run_repl(bot: teloxide::Bot, handler_chain: HandlerChain) -> Result<()> {
    if let Ok(me) = bot.get_me().await {
        if let Some(username) = &me.user.username {
            info!(username = %username, "step: telegram bot connected");
        }
    }

    let chain = handler_chain;
    teloxide::repl(bot, move |_bot: Bot, msg: teloxide::types::Message| {
        let chain = chain.clone();

        async move {
            let core_msg = TelegramMessageWrapper(&msg).to_core();

            match msg.text() {
                Some(text) => {
                    info!(
                        user_id = core_msg.user.id,
                        chat_id = core_msg.chat.id,
                        message_content = %text,
                        "Received message"
                    );
                }
                None => {
                    info!(
                        user_id = core_msg.user.id,
                        chat_id = core_msg.chat.id,
                        "Received non-text message"
                    );
                }
            }

            tokio::spawn(async move {
                info!(
                    user_id = core_msg.user.id,
                    chat_id = core_msg.chat.id,
                    message_id = %core_msg.id,
                    "step: processing message (handler chain started)"
                );
                if let Err(e) = chain.handle(&core_msg).await {
                    error!(error = %e, user_id = core_msg.user.id, "Handler chain failed");
                }
            });

            Ok(())
        }
    })
    .await;

    Ok(())
}
