//! Agent handler: every non-command text message becomes one agent turn relayed into the chat.
//!
//! Placeholder first, then the turn is opened and its stream adapted and reconciled. Stream errors are shown
//! inline by the reconciler; a platform failure ends the turn with the generic failure notice.

use std::sync::Arc;

use agent_client::{Agent, TurnContext, TurnOptions};
use async_trait::async_trait;
use chrono::{DateTime, Local};
use stream_relay::{adapt, open_failed, Reconciler, ReconcilerConfig, Renderer, TurnReport};
use tracing::{error, info, instrument};
use tracker_core::{Bot, Handler, HandlerResponse, Message, Result};

use crate::replies::replies;

/// Options for the turn triggered by `message`, stamped with `now`.
pub fn turn_options(message: &Message, now: DateTime<Local>) -> TurnOptions {
    let context = TurnContext {
        display_name: message.user.display_name().to_string(),
        username: message.user.username.clone(),
        date: now.format("%Y-%m-%d").to_string(),
        time: now.format("%H:%M:%S").to_string(),
    };
    TurnOptions::new(
        message.chat.platform.as_str(),
        message.chat.id,
        Some(message.user.id),
        context,
    )
}

/// Last handler in the chain.
pub struct AgentHandler {
    bot: Arc<dyn Bot>,
    agent: Arc<dyn Agent>,
    renderer: Arc<dyn Renderer>,
    config: ReconcilerConfig,
}

impl AgentHandler {
    pub fn new(
        bot: Arc<dyn Bot>,
        agent: Arc<dyn Agent>,
        renderer: Arc<dyn Renderer>,
        config: ReconcilerConfig,
    ) -> Self {
        Self {
            bot,
            agent,
            renderer,
            config,
        }
    }

    async fn relay_turn(&self, message: &Message) -> Result<TurnReport> {
        let reconciler = Reconciler::begin(
            self.bot.clone(),
            self.renderer.clone(),
            message.chat.clone(),
            self.config.clone(),
        )
        .await?;

        let options = turn_options(message, Local::now());
        info!(
            thread_id = %options.thread_id,
            resource_id = %options.resource_id,
            "step: opening agent turn"
        );
        let events = match self.agent.open_turn(&message.content, options).await {
            Ok(chunks) => adapt(chunks),
            Err(e) => open_failed(&e),
        };
        reconciler.run(events).await
    }
}

#[async_trait]
impl Handler for AgentHandler {
    #[instrument(skip(self, message), fields(chat = %message.chat.key(), user_id = message.user.id))]
    async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        match self.relay_turn(message).await {
            Ok(report) => {
                info!(
                    messages = report.messages.len(),
                    sends = report.sends,
                    edits = report.edits,
                    "step: agent turn done"
                );
            }
            Err(e) => {
                error!(error = %e, "Agent turn failed, sending failure notice");
                let notice = replies(message.chat.platform).failure;
                if let Err(e) = self.bot.send_message(&message.chat, notice).await {
                    error!(error = %e, "Failed to send failure notice");
                }
            }
        }
        Ok(HandlerResponse::Stop)
    }
}
