//! Implements [`tracker_core::Bot`] over the Discord HTTP API. Text is Discord Markdown; no escaping.

use std::sync::Arc;

use async_trait::async_trait;
use serenity::builder::{CreateMessage, EditMessage};
use serenity::http::Http;
use serenity::model::id::{ChannelId, MessageId};
use tracker_core::{parse_message_id, Bot as CoreBot, Chat, Message, Result, TrackerError};

fn transport(e: serenity::Error) -> TrackerError {
    TrackerError::Transport(e.to_string())
}

fn channel_id(chat: &Chat) -> Result<ChannelId> {
    u64::try_from(chat.id)
        .ok()
        .filter(|id| *id != 0)
        .map(ChannelId::new)
        .ok_or_else(|| TrackerError::Transport(format!("Invalid Discord channel id: {}", chat.id)))
}

fn message_id(id: &str) -> Result<MessageId> {
    let raw: u64 = parse_message_id(id)?;
    if raw == 0 {
        return Err(TrackerError::Transport(format!("Invalid Discord message id: {}", id)));
    }
    Ok(MessageId::new(raw))
}

pub struct DiscordBotAdapter {
    http: Arc<Http>,
}

impl DiscordBotAdapter {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }

    pub fn from_token(token: &str) -> Self {
        Self::new(Arc::new(Http::new(token)))
    }

    async fn send(&self, chat: &Chat, builder: CreateMessage) -> Result<serenity::model::channel::Message> {
        channel_id(chat)?
            .send_message(&self.http, builder)
            .await
            .map_err(transport)
    }
}

#[async_trait]
impl CoreBot for DiscordBotAdapter {
    async fn send_message(&self, chat: &Chat, text: &str) -> Result<()> {
        self.send(chat, CreateMessage::new().content(text)).await?;
        Ok(())
    }

    async fn send_message_and_return_id(&self, chat: &Chat, text: &str) -> Result<String> {
        let sent = self.send(chat, CreateMessage::new().content(text)).await?;
        Ok(sent.id.get().to_string())
    }

    /// Replies with a message reference to the triggering message.
    async fn reply_to(&self, message: &Message, text: &str) -> Result<()> {
        let channel = channel_id(&message.chat)?;
        let builder = match message_id(&message.id) {
            Ok(id) => CreateMessage::new()
                .content(text)
                .reference_message((channel, id)),
            Err(_) => CreateMessage::new().content(text),
        };
        self.send(&message.chat, builder).await?;
        Ok(())
    }

    async fn edit_message(&self, chat: &Chat, message_id_str: &str, text: &str) -> Result<()> {
        let id = message_id(message_id_str)?;
        channel_id(chat)?
            .edit_message(&self.http, id, EditMessage::new().content(text))
            .await
            .map_err(transport)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracker_core::Platform;

    fn chat(id: i64) -> Chat {
        Chat {
            id,
            platform: Platform::Discord,
            chat_type: "guild".to_string(),
        }
    }

    #[test]
    fn test_channel_id_rejects_zero_and_negative() {
        assert!(channel_id(&chat(0)).is_err());
        assert!(channel_id(&chat(-5)).is_err());
        assert_eq!(channel_id(&chat(42)).unwrap().get(), 42);
    }

    #[test]
    fn test_message_id_parsing() {
        assert_eq!(message_id("1234").unwrap().get(), 1234);
        assert!(message_id("abc").is_err());
        assert!(message_id("0").is_err());
    }
}
