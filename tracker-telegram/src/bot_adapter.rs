//! Wraps teloxide::Bot and implements [`tracker_core::Bot`]. Production code sends HTML messages via Telegram;
//! tests substitute another Bot impl.
//!
//! Text is sent in HTML parse mode. When Telegram rejects the markup (e.g. a tag cut in half by message
//! splitting) the same text is resent once as plain text. "message is not modified" counts as success.

use async_trait::async_trait;
use teloxide::payloads::{EditMessageTextSetters, SendMessageSetters};
use teloxide::prelude::*;
use teloxide::types::{ChatId, MessageId, ParseMode, ReplyParameters};
use teloxide::RequestError;
use tracing::warn;
use tracker_core::{parse_message_id, Bot as CoreBot, Chat, Message, Result, TrackerError};

/// True when Telegram returns "message is not modified" (content unchanged); treat as success.
pub fn is_message_not_modified_error(error: &str) -> bool {
    error.contains("message is not modified") || error.contains("exactly the same")
}

/// True when Telegram could not parse the HTML entities of a message.
pub fn is_parse_entities_error(error: &str) -> bool {
    error.contains("can't parse entities") || error.contains("Can't parse entities")
}

/// Strips tags and unescapes the entities produced by HTML rendering, for the plain-text retry.
pub fn html_to_plain_text(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&amp;", "&")
}

fn transport(e: RequestError) -> TrackerError {
    TrackerError::Transport(e.to_string())
}

/// Thin wrapper around teloxide::Bot that implements tracker-core's Bot trait.
pub struct TelegramBotAdapter {
    bot: teloxide::Bot,
}

impl TelegramBotAdapter {
    /// Creates an adapter from an existing teloxide Bot.
    pub fn new(bot: teloxide::Bot) -> Self {
        Self { bot }
    }

    async fn send_html(
        &self,
        chat_id: ChatId,
        text: &str,
        reply_to: Option<MessageId>,
    ) -> Result<teloxide::types::Message> {
        let mut request = self
            .bot
            .send_message(chat_id, text.to_string())
            .parse_mode(ParseMode::Html);
        if let Some(id) = reply_to {
            request = request.reply_parameters(ReplyParameters::new(id));
        }
        match request.await {
            Ok(sent) => Ok(sent),
            Err(e) if is_parse_entities_error(&e.to_string()) => {
                warn!(error = %e, chat_id = chat_id.0, "HTML rejected, resending as plain text");
                let mut plain = self.bot.send_message(chat_id, html_to_plain_text(text));
                if let Some(id) = reply_to {
                    plain = plain.reply_parameters(ReplyParameters::new(id));
                }
                plain.await.map_err(transport)
            }
            Err(e) => Err(transport(e)),
        }
    }

    async fn edit_plain(&self, chat_id: ChatId, message_id: MessageId, text: &str) -> Result<()> {
        match self
            .bot
            .edit_message_text(chat_id, message_id, html_to_plain_text(text))
            .await
        {
            Ok(_) => Ok(()),
            Err(e) if is_message_not_modified_error(&e.to_string()) => Ok(()),
            Err(e) => Err(transport(e)),
        }
    }
}

#[async_trait]
impl CoreBot for TelegramBotAdapter {
    async fn send_message(&self, chat: &Chat, text: &str) -> Result<()> {
        self.send_html(ChatId(chat.id), text, None).await?;
        Ok(())
    }

    async fn send_message_and_return_id(&self, chat: &Chat, text: &str) -> Result<String> {
        let sent = self.send_html(ChatId(chat.id), text, None).await?;
        Ok(sent.id.to_string())
    }

    async fn reply_to(&self, message: &Message, text: &str) -> Result<()> {
        let reply_to = parse_message_id::<i32>(&message.id).ok().map(MessageId);
        self.send_html(ChatId(message.chat.id), text, reply_to)
            .await?;
        Ok(())
    }

    async fn edit_message(&self, chat: &Chat, message_id: &str, text: &str) -> Result<()> {
        let id = MessageId(parse_message_id::<i32>(message_id)?);
        let chat_id = ChatId(chat.id);

        let mut retried_after_wait = false;
        loop {
            let result = self
                .bot
                .edit_message_text(chat_id, id, text.to_string())
                .parse_mode(ParseMode::Html)
                .await;
            match result {
                Ok(_) => return Ok(()),
                Err(e) => {
                    let error_str = e.to_string();
                    if is_message_not_modified_error(&error_str) {
                        return Ok(());
                    }
                    if is_parse_entities_error(&error_str) {
                        warn!(error = %e, chat_id = chat.id, "HTML rejected on edit, retrying as plain text");
                        return self.edit_plain(chat_id, id, text).await;
                    }
                    if let RequestError::RetryAfter(wait) = &e {
                        if !retried_after_wait {
                            warn!(error = %e, "Edit rate limited, retrying once");
                            tokio::time::sleep(wait.duration()).await;
                            retried_after_wait = true;
                            continue;
                        }
                    }
                    return Err(transport(e));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_modified_detection() {
        assert!(is_message_not_modified_error(
            "Bad Request: message is not modified: specified new message content and reply markup are exactly the same"
        ));
        assert!(!is_message_not_modified_error("Bad Request: chat not found"));
    }

    #[test]
    fn test_parse_entities_detection() {
        assert!(is_parse_entities_error(
            "Bad Request: can't parse entities: Unclosed start tag at byte offset 12"
        ));
        assert!(!is_parse_entities_error("Forbidden: bot was blocked by the user"));
    }

    #[test]
    fn test_html_to_plain_text() {
        assert_eq!(
            html_to_plain_text("✨ <b>Result:</b>\n<pre>{&quot;a&quot;: 1 &lt; 2}</pre>"),
            "✨ Result:\n{\"a\": 1 < 2}"
        );
        assert_eq!(html_to_plain_text("AT&amp;T"), "AT&T");
    }

    #[test]
    fn test_html_to_plain_text_cut_tag() {
        assert_eq!(html_to_plain_text("Hello <b>wor"), "Hello wor");
        assert_eq!(html_to_plain_text("partial <pr"), "partial ");
    }
}
