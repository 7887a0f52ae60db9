//! Bot abstraction for sending and editing messages.
//!
//! [`Bot`] is platform-agnostic; tracker-telegram and tracker-discord implement it over teloxide and serenity.

use crate::error::{Result, TrackerError};
use crate::types::{Chat, Message};
use async_trait::async_trait;

/// Abstraction for sending and editing messages. Implementations map to a transport (Telegram, Discord).
///
/// Text is passed through in the platform's own markup (Telegram HTML, Discord Markdown); the caller renders it.
#[async_trait]
pub trait Bot: Send + Sync {
    /// Sends a text message to the given chat.
    async fn send_message(&self, chat: &Chat, text: &str) -> Result<()>;
    /// Sends a reply to the given message (same chat).
    async fn reply_to(&self, message: &Message, text: &str) -> Result<()>;
    /// Edits an already-sent message. Fails when the message is too old, deleted, or the text is rejected.
    async fn edit_message(&self, chat: &Chat, message_id: &str, text: &str) -> Result<()>;
    /// Sends a message and returns its platform id (for later `edit_message`).
    async fn send_message_and_return_id(&self, chat: &Chat, text: &str) -> Result<String>;
}

/// Parses a platform message id string into an integer. Used by adapters in edit_message.
pub fn parse_message_id<T: std::str::FromStr>(s: &str) -> Result<T> {
    s.parse()
        .map_err(|_| TrackerError::Transport(format!("Invalid message_id for edit: {}", s)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_message_id_valid() {
        assert_eq!(parse_message_id::<i32>("123").unwrap(), 123);
        assert_eq!(parse_message_id::<u64>("1184215432117940224").unwrap(), 1184215432117940224);
    }

    #[test]
    fn test_parse_message_id_invalid() {
        assert!(parse_message_id::<i32>("").is_err());
        assert!(parse_message_id::<i32>("abc").is_err());
        assert!(parse_message_id::<u64>("12.3").is_err());
    }
}
