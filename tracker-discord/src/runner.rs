//! Gateway runner: each user message becomes a core [`tracker_core::Message`] handled by the [`HandlerChain`]
//! in its own task. Messages from bots (including this one) are ignored.

use anyhow::{Context as _, Result};
use handler_chain::HandlerChain;
use serenity::all::GatewayIntents;
use serenity::async_trait;
use serenity::client::{Client, Context, EventHandler};
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use tracing::{error, info, instrument};
use tracker_core::ToCoreMessage;

use super::adapters::DiscordMessageWrapper;

struct GatewayHandler {
    chain: HandlerChain,
}

#[async_trait]
impl EventHandler for GatewayHandler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!(username = %ready.user.name, "step: discord bot connected");
    }

    async fn message(&self, _ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }
        let core_msg = DiscordMessageWrapper(&msg).to_core();
        info!(
            user_id = core_msg.user.id,
            chat_id = core_msg.chat.id,
            content_len = core_msg.content.len(),
            "Received message"
        );

        let chain = self.chain.clone();
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
    }
}

/// Guild and DM message events with their content, plus guild/channel state for the cache.
pub fn gateway_intents() -> GatewayIntents {
    GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT
}

/// Connects to the gateway and runs until the connection ends.
#[instrument(skip(token, handler_chain))]
pub async fn run_gateway(token: &str, handler_chain: HandlerChain) -> Result<()> {
    let mut client = Client::builder(token, gateway_intents())
        .event_handler(GatewayHandler {
            chain: handler_chain,
        })
        .await
        .context("Failed to build Discord client")?;

    client
        .start()
        .await
        .context("Discord gateway connection failed")?;
    Ok(())
}
