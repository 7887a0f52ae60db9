//! Command handler: answers the four fixed commands directly and stops the chain; free text passes through.

use std::sync::Arc;

use async_trait::async_trait;
use reminder::{ArmOutcome, DisarmOutcome, ReminderScheduler};
use tracing::{info, instrument};
use tracker_core::{Bot, Handler, HandlerResponse, Message, Result};

use crate::replies::replies;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    ReminderOn,
    ReminderOff,
    Help,
}

impl Command {
    /// Parses `/name` or `/name@botname`, ignoring case and surrounding whitespace.
    /// Anything else (including unknown commands and commands with arguments) is `None`.
    pub fn parse(text: &str) -> Option<Self> {
        let name = text.trim().strip_prefix('/')?;
        let name = match name.split_once('@') {
            Some((name, _bot)) => name,
            None => name,
        };
        match name.to_ascii_lowercase().as_str() {
            "start" => Some(Command::Start),
            "reminder_on" => Some(Command::ReminderOn),
            "reminder_off" => Some(Command::ReminderOff),
            "help" => Some(Command::Help),
            _ => None,
        }
    }
}

/// First handler in the chain. Owns the platform's reminder scheduler.
pub struct CommandHandler {
    bot: Arc<dyn Bot>,
    scheduler: Arc<ReminderScheduler>,
}

impl CommandHandler {
    pub fn new(bot: Arc<dyn Bot>, scheduler: Arc<ReminderScheduler>) -> Self {
        Self { bot, scheduler }
    }

    /// Runs the command's scheduler action (if any) and returns the reply text.
    fn execute(&self, command: Command, message: &Message) -> &'static str {
        let texts = replies(message.chat.platform);
        match command {
            Command::Start => texts.welcome,
            Command::Help => texts.help,
            Command::ReminderOn => {
                let outcome = self.scheduler.arm(&message.chat);
                info!(rearmed = outcome == ArmOutcome::Rearmed, "step: reminder_on");
                texts.reminder_on
            }
            Command::ReminderOff => match self.scheduler.disarm(&message.chat.key()) {
                DisarmOutcome::Disarmed => texts.reminder_off,
                DisarmOutcome::NothingToDisarm => texts.no_active_reminders,
            },
        }
    }
}

#[async_trait]
impl Handler for CommandHandler {
    #[instrument(skip(self, message), fields(chat = %message.chat.key()))]
    async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        if message.content.trim().is_empty() {
            info!("step: non-text message, sending text-only notice");
            self.bot
                .send_message(&message.chat, replies(message.chat.platform).text_only)
                .await?;
            return Ok(HandlerResponse::Stop);
        }

        let Some(command) = Command::parse(&message.content) else {
            return Ok(HandlerResponse::Continue);
        };

        info!(command = ?command, user_id = message.user.id, "step: command received");
        let text = self.execute(command, message);
        self.bot.reply_to(message, text).await?;
        Ok(HandlerResponse::Reply(text.to_string()))
    }
}
