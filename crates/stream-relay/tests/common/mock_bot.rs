//! Mock implementation of [`tracker_core::Bot`] for reconciler tests.
//!
//! Records every send and edit with the (paused) tokio clock time so tests can assert on order,
//! content and spacing without hitting a platform. Edits and sends can be made to fail.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::time::Instant;
use tracker_core::{Bot, Chat, Message, Result, TrackerError};

/// One recorded call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotCall {
    Send { message_id: String, text: String },
    Edit { message_id: String, text: String },
    Reply { text: String },
}

impl BotCall {
    pub fn text(&self) -> &str {
        match self {
            BotCall::Send { text, .. } | BotCall::Edit { text, .. } | BotCall::Reply { text } => {
                text
            }
        }
    }
}

#[derive(Default)]
pub struct MockBot {
    calls: Mutex<Vec<(BotCall, Instant)>>,
    next_id: AtomicUsize,
    fail_edits: AtomicBool,
    /// Sends beyond this many fail.
    max_sends: Mutex<Option<usize>>,
}

impl MockBot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every edit returns a transport error.
    pub fn failing_edits() -> Self {
        let bot = Self::new();
        bot.fail_edits.store(true, Ordering::SeqCst);
        bot
    }

    /// Only the first `n` sends succeed.
    pub fn with_max_sends(self, n: usize) -> Self {
        *self.max_sends.lock().unwrap() = Some(n);
        self
    }

    pub fn calls(&self) -> Vec<BotCall> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(call, _)| call.clone())
            .collect()
    }

    pub fn timed_calls(&self) -> Vec<(BotCall, Instant)> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: BotCall) {
        self.calls.lock().unwrap().push((call, Instant::now()));
    }

    fn send(&self, text: &str) -> Result<String> {
        let sent = self.next_id.load(Ordering::SeqCst);
        if let Some(max) = *self.max_sends.lock().unwrap() {
            if sent >= max {
                return Err(TrackerError::Transport("send refused".to_string()));
            }
        }
        let message_id = (self.next_id.fetch_add(1, Ordering::SeqCst) + 1).to_string();
        self.record(BotCall::Send {
            message_id: message_id.clone(),
            text: text.to_string(),
        });
        Ok(message_id)
    }
}

#[async_trait]
impl Bot for MockBot {
    async fn send_message(&self, _chat: &Chat, text: &str) -> Result<()> {
        self.send(text).map(|_| ())
    }

    async fn reply_to(&self, _message: &Message, text: &str) -> Result<()> {
        self.record(BotCall::Reply {
            text: text.to_string(),
        });
        Ok(())
    }

    async fn edit_message(&self, _chat: &Chat, message_id: &str, text: &str) -> Result<()> {
        if self.fail_edits.load(Ordering::SeqCst) {
            return Err(TrackerError::Transport("Bad Request: message can't be edited".to_string()));
        }
        self.record(BotCall::Edit {
            message_id: message_id.to_string(),
            text: text.to_string(),
        });
        Ok(())
    }

    async fn send_message_and_return_id(&self, _chat: &Chat, text: &str) -> Result<String> {
        self.send(text)
    }
}
