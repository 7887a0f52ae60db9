//! Mock implementation of [`tracker_core::Bot`] for dispatcher tests: records every call per chat.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use tracker_core::{Bot, Chat, Message, Result, TrackerError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotCall {
    Send { chat_id: i64, text: String },
    Edit { chat_id: i64, message_id: String, text: String },
    Reply { chat_id: i64, reply_to: String, text: String },
}

impl BotCall {
    pub fn text(&self) -> &str {
        match self {
            BotCall::Send { text, .. } | BotCall::Edit { text, .. } | BotCall::Reply { text, .. } => {
                text
            }
        }
    }

    pub fn chat_id(&self) -> i64 {
        match self {
            BotCall::Send { chat_id, .. }
            | BotCall::Edit { chat_id, .. }
            | BotCall::Reply { chat_id, .. } => *chat_id,
        }
    }
}

#[derive(Default)]
pub struct MockBot {
    calls: Mutex<Vec<BotCall>>,
    next_id: AtomicUsize,
    fail_sends: AtomicBool,
}

impl MockBot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every send (not replies or edits) returns a transport error until turned off.
    pub fn set_fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<BotCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn sends_containing(&self, needle: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, BotCall::Send { .. }) && c.text().contains(needle))
            .count()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn send(&self, chat: &Chat, text: &str) -> Result<String> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(TrackerError::Transport("Too Many Requests".to_string()));
        }
        let id = (self.next_id.fetch_add(1, Ordering::SeqCst) + 1).to_string();
        self.calls.lock().unwrap().push(BotCall::Send {
            chat_id: chat.id,
            text: text.to_string(),
        });
        Ok(id)
    }
}

#[async_trait]
impl Bot for MockBot {
    async fn send_message(&self, chat: &Chat, text: &str) -> Result<()> {
        self.send(chat, text).map(|_| ())
    }

    async fn reply_to(&self, message: &Message, text: &str) -> Result<()> {
        self.calls.lock().unwrap().push(BotCall::Reply {
            chat_id: message.chat.id,
            reply_to: message.id.clone(),
            text: text.to_string(),
        });
        Ok(())
    }

    async fn edit_message(&self, chat: &Chat, message_id: &str, text: &str) -> Result<()> {
        self.calls.lock().unwrap().push(BotCall::Edit {
            chat_id: chat.id,
            message_id: message_id.to_string(),
            text: text.to_string(),
        });
        Ok(())
    }

    async fn send_message_and_return_id(&self, chat: &Chat, text: &str) -> Result<String> {
        self.send(chat, text)
    }
}
