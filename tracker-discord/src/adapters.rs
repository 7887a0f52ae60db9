//! Adapters from Discord (serenity) types to tracker_core types.

use chrono::{DateTime, Utc};
use tracker_core::{Chat, Message, Platform, ToCoreMessage, ToCoreUser, User};

/// Wraps a serenity User. The global display name, when set, is used as first name.
pub struct DiscordUserWrapper<'a>(pub &'a serenity::model::user::User);

impl<'a> ToCoreUser for DiscordUserWrapper<'a> {
    fn to_core(&self) -> User {
        User {
            id: self.0.id.get() as i64,
            username: Some(self.0.name.clone()),
            first_name: self.0.global_name.clone(),
            last_name: None,
        }
    }
}

/// Wraps a serenity Message. The chat is the channel; `chat_type` is `guild` or `dm`.
pub struct DiscordMessageWrapper<'a>(pub &'a serenity::model::channel::Message);

impl<'a> ToCoreMessage for DiscordMessageWrapper<'a> {
    fn to_core(&self) -> Message {
        let msg = self.0;
        Message {
            id: msg.id.get().to_string(),
            user: DiscordUserWrapper(&msg.author).to_core(),
            chat: Chat {
                id: msg.channel_id.get() as i64,
                platform: Platform::Discord,
                chat_type: if msg.guild_id.is_some() { "guild" } else { "dm" }.to_string(),
            },
            content: msg.content.clone(),
            created_at: DateTime::<Utc>::from_timestamp(msg.timestamp.unix_timestamp(), 0)
                .unwrap_or_else(Utc::now),
        }
    }
}
